//! Top-level entry points: summarise a paper, write the copy, render slides.
//!
//! Each stage can run on its own (the CLI exposes them as subcommands) or
//! chained through [`run`]. The LLM-driven stages come in two flavours: the
//! plain function resolves a provider from the config, the `_with` variant
//! takes any [`Completer`].

use crate::background::BackgroundSource;
use crate::carousel::{parse_carousel, Slide};
use crate::compose::SlideComposer;
use crate::config::PipelineConfig;
use crate::error::{SlideError, SocialError};
use crate::output::{
    CarouselReport, ContentStats, GeneratedContent, RenderedSlide, RunOutput, SummaryOutput,
    TokenUsage,
};
use crate::pipeline::copy::{generate_copy, ContentKind};
use crate::pipeline::input::{self, PdfSource};
use crate::pipeline::llm::{resolve_provider, Completer};
use crate::pipeline::summary::{save_summary, summarize, StructuredSummary};
use crate::pipeline::extract;
use crate::progress::{NoopProgressCallback, SlideProgressCallback};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// File name of the summary written by [`run`].
pub const SUMMARY_FILE: &str = "summary.json";

/// Sub-directory of the output directory that [`run`] renders slides into.
pub const SLIDES_DIR: &str = "instagram_slides";

/// File name of the PNG for 1-based slide `index`.
pub fn slide_file_name(index: usize) -> String {
    format!("slide_{index}.png")
}

// ── Summary ──────────────────────────────────────────────────────────────

/// Summarise a PDF file or URL.
///
/// A reply the model botched is not an error here: the returned summary
/// carries `error` and `raw_response` instead (see
/// [`StructuredSummary::is_error`]).
pub async fn summarize_pdf(
    input_str: impl AsRef<str>,
    config: &PipelineConfig,
) -> Result<SummaryOutput, SocialError> {
    let source = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let provider = resolve_provider(config)?;
    summarize_source(&provider, &source, config).await
}

/// Summarise in-memory PDF bytes.
pub async fn summarize_bytes(
    bytes: &[u8],
    config: &PipelineConfig,
) -> Result<SummaryOutput, SocialError> {
    let source = input::resolve_bytes(bytes)?;
    let provider = resolve_provider(config)?;
    summarize_source(&provider, &source, config).await
}

/// Summarise an already-resolved PDF with an explicit completer.
pub async fn summarize_source<C: Completer>(
    completer: &C,
    source: &PdfSource,
    config: &PipelineConfig,
) -> Result<SummaryOutput, SocialError> {
    let start = Instant::now();
    info!("Extracting text from {}", source.path().display());

    let extracted = extract::extract_text(source.path(), config.password.as_deref()).await?;
    let input_chars = extracted.text.chars().count();
    info!(
        "Extracted {} chars from {} pages",
        input_chars, extracted.page_count
    );

    let (summary, usage) = summarize(completer, &extracted.text, config).await?;
    if summary.is_error() {
        warn!(
            "Summary could not be parsed: {}",
            summary.error.as_deref().unwrap_or_default()
        );
    }

    Ok(SummaryOutput {
        summary,
        page_count: extracted.page_count,
        input_chars,
        usage,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

// ── Copy ─────────────────────────────────────────────────────────────────

/// Generate all four pieces of copy from a summary.
pub async fn generate_content(
    summary: &StructuredSummary,
    config: &PipelineConfig,
) -> Result<GeneratedContent, SocialError> {
    let provider = resolve_provider(config)?;
    generate_content_with(&provider, summary, config).await
}

/// [`generate_content`] with an explicit completer.
///
/// Pieces are generated one after another in [`ContentKind::ALL`] order;
/// the first failure aborts the batch.
pub async fn generate_content_with<C: Completer>(
    completer: &C,
    summary: &StructuredSummary,
    config: &PipelineConfig,
) -> Result<GeneratedContent, SocialError> {
    if let Some(ref reason) = summary.error {
        return Err(SocialError::UnusableSummary {
            reason: reason.clone(),
        });
    }

    let start = Instant::now();
    let mut content = GeneratedContent::default();
    let mut usage = TokenUsage::default();

    for kind in ContentKind::ALL {
        let (text, used) = generate_copy(completer, kind, summary, config).await?;
        debug!("{}: {} chars", kind, text.len());
        usage += used;
        content.set(kind, text);
    }

    content.stats = ContentStats {
        usage,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    Ok(content)
}

// ── Carousel ─────────────────────────────────────────────────────────────

/// Render `slides` as `slide_{n}.png` files in `out_dir`.
///
/// Only setup failures are fatal (bad composer config, unwritable
/// directory). A slide that fails to render or write is recorded in
/// [`CarouselReport::errors`] and the rest continue.
pub async fn render_carousel(
    slides: &[Slide],
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<CarouselReport, SocialError> {
    let composer = SlideComposer::new(config.composer.clone())?;
    let backgrounds = BackgroundSource::new(config.background.clone(), config.download_timeout_secs);
    render_carousel_with(&composer, &backgrounds, slides, out_dir, config).await
}

/// [`render_carousel`] with an explicit composer and background source.
pub async fn render_carousel_with(
    composer: &SlideComposer,
    backgrounds: &BackgroundSource,
    slides: &[Slide],
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<CarouselReport, SocialError> {
    let start = Instant::now();
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| SocialError::OutputWriteFailed {
            path: out_dir.to_path_buf(),
            source: e,
        })?;

    let noop = NoopProgressCallback;
    let progress: &dyn SlideProgressCallback = match config.progress_callback {
        Some(ref cb) => cb.as_ref(),
        None => &noop,
    };

    let total = slides.len();
    if total == 0 {
        warn!("Carousel has no slides; nothing to render");
    }
    progress.on_carousel_start(total);

    let mut report = CarouselReport::default();
    for (i, slide) in slides.iter().enumerate() {
        let index = i + 1;
        progress.on_slide_start(index, total);

        match render_one(composer, backgrounds, slide, index, out_dir, config).await {
            Ok((rendered, png_len)) => {
                info!(
                    "Slide {}/{} → {} (headline {}px, body {}px)",
                    index,
                    total,
                    rendered.path.display(),
                    rendered.headline_font_size,
                    rendered.body_font_size
                );
                progress.on_slide_complete(index, total, png_len);
                report.slides.push(rendered);
            }
            Err(e) => {
                warn!("{}", e);
                progress.on_slide_error(index, total, &e.to_string());
                report.errors.push(e);
            }
        }
    }

    progress.on_carousel_complete(total, report.slides.len());
    report.duration_ms = start.elapsed().as_millis() as u64;
    Ok(report)
}

async fn render_one(
    composer: &SlideComposer,
    backgrounds: &BackgroundSource,
    slide: &Slide,
    index: usize,
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<(RenderedSlide, usize), SlideError> {
    let background = match backgrounds.fetch(index, slide).await {
        Some(img) => img,
        None => composer.solid_background(config.composer.fallback_background),
    };

    let render_failed = |detail: String| SlideError::RenderFailed {
        slide: index,
        detail,
    };

    let job_composer = composer.clone();
    let job_slide = slide.clone();
    let (png, layout) = tokio::task::spawn_blocking(move || {
        job_composer.render_with_layout(&job_slide, &background)
    })
    .await
    .map_err(|e| render_failed(format!("render task panicked: {e}")))?
    .map_err(|e| render_failed(e.to_string()))?;

    let path: PathBuf = out_dir.join(slide_file_name(index));
    tokio::fs::write(&path, &png)
        .await
        .map_err(|e| SlideError::WriteFailed {
            slide: index,
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

    Ok((
        RenderedSlide {
            index,
            path,
            headline_font_size: layout.headline_font_size(),
            body_font_size: layout.body_font_size(),
        },
        png.len(),
    ))
}

// ── Full run ─────────────────────────────────────────────────────────────

/// Summarise, write all copy, then render the carousel, all under `out_dir`:
///
/// ```text
/// out_dir/
///   summary.json
///   podcast_script.txt  instagram_carousel.txt  twitter_thread.txt  blog_post.txt
///   instagram_slides/slide_1.png …
/// ```
///
/// The summary is saved even when it could not be parsed, then the run
/// stops with [`SocialError::UnusableSummary`].
pub async fn run(
    input_str: impl AsRef<str>,
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<RunOutput, SocialError> {
    let source = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let provider = resolve_provider(config)?;

    let summary = summarize_source(&provider, &source, config).await?;
    save_summary(&summary.summary, &out_dir.join(SUMMARY_FILE))?;

    let content = generate_content_with(&provider, &summary.summary, config).await?;
    content.write_to_dir(out_dir)?;

    let slides = parse_carousel(&content.instagram_carousel);
    info!("Carousel copy parsed into {} slides", slides.len());
    let carousel = render_carousel(&slides, &out_dir.join(SLIDES_DIR), config).await?;

    Ok(RunOutput {
        summary,
        content,
        carousel,
    })
}
