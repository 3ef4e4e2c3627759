//! CLI binary for edgequake-paper2social.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_paper2social::generate::{slide_file_name, SLIDES_DIR, SUMMARY_FILE};
use edgequake_paper2social::pipeline::copy::generate_copy;
use edgequake_paper2social::pipeline::llm::resolve_provider;
use edgequake_paper2social::{
    load_summary, parse_carousel, render_carousel, run, save_summary, summarize_pdf,
    BackgroundChoice, CarouselReport, ComposerConfig, ContentKind, GeneratedContent,
    PipelineConfig, ProgressCallback, SlideProgressCallback, TokenUsage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per slide.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|started| *started)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl SlideProgressCallback for CliProgressCallback {
    fn on_carousel_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total} slides…"))
        ));
    }

    fn on_slide_start(&self, index: usize, _total: usize) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("slide {index}"));
    }

    fn on_slide_complete(&self, index: usize, total: usize, png_len: usize) {
        self.bar.println(format!(
            "  {} Slide {:>2}/{:<2}  {:<10}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{:>6} KiB", png_len / 1024)),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_slide_error(&self, index: usize, total: usize, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Slide {:>2}/{:<2}  {}",
            red("✗"),
            index,
            total,
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_carousel_complete(&self, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} slides rendered",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} slides rendered  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

/// Spinner shown while a single long LLM stage runs.
fn stage_spinner(enabled: bool, message: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a paper to JSON (or .csv)
  paper2social summarize paper.pdf -o summary.json

  # Podcast script, carousel copy, thread and blog post from a summary
  paper2social generate summary.json --out-dir content/

  # Only the carousel copy
  paper2social generate summary.json --only instagram

  # Render carousel slides from the carousel copy
  paper2social slides content/instagram_carousel.txt --out-dir instagram_slides/

  # Slides over Unsplash photos, compact layout
  paper2social slides instagram_carousel.txt --background unsplash --layout joint

  # Slides over pre-generated dalle_slide_{n}.png images
  paper2social slides instagram_carousel.txt --background-dir dalle_images/

  # Everything, from a URL
  paper2social run https://arxiv.org/pdf/1706.03762 --out-dir attention/

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (LLM calls and generated backgrounds)
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  UNSPLASH_ACCESS_KEY     Unsplash API key for --background unsplash
  PDFIUM_LIB_PATH         Path to an existing libpdfium
"#;

/// Turn research papers into social-media content.
#[derive(Parser, Debug)]
#[command(
    name = "paper2social",
    version,
    about = "Turn research papers into summaries, marketing copy and Instagram carousels",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    llm: LlmArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PAPER2SOCIAL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PAPER2SOCIAL_QUIET")]
    quiet: bool,

    /// Disable progress bars and spinners.
    #[arg(long, global = true, env = "PAPER2SOCIAL_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a PDF's text and summarise it.
    Summarize {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,

        /// Summary file; must end in .json or .csv.
        #[arg(short, long, default_value = SUMMARY_FILE)]
        output: PathBuf,

        #[command(flatten)]
        pdf: PdfArgs,
    },

    /// Generate podcast, carousel, thread and blog copy from a summary JSON.
    Generate {
        /// Summary written by `summarize`.
        summary: PathBuf,

        /// Directory the copy files are written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Generate only these kinds (podcast, instagram, twitter, blog).
        #[arg(long, value_delimiter = ',', value_parser = parse_kind)]
        only: Vec<ContentKind>,
    },

    /// Render carousel slides from carousel copy.
    Slides {
        /// Carousel copy, e.g. instagram_carousel.txt.
        carousel: PathBuf,

        /// Directory the slide PNGs are written to.
        #[arg(long, default_value = SLIDES_DIR)]
        out_dir: PathBuf,

        #[command(flatten)]
        slides: SlideArgs,
    },

    /// Summarise, generate all copy and render the carousel.
    Run {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,

        /// Directory for every output.
        #[arg(long, default_value = "paper2social-out")]
        out_dir: PathBuf,

        #[command(flatten)]
        pdf: PdfArgs,

        #[command(flatten)]
        slides: SlideArgs,
    },
}

#[derive(Args, Debug)]
struct LlmArgs {
    /// LLM model ID (default: gpt-4o).
    #[arg(long, global = true, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, global = true, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Retries per LLM call.
    #[arg(long, global = true, env = "PAPER2SOCIAL_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-LLM-call timeout in seconds.
    #[arg(long, global = true, env = "PAPER2SOCIAL_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// HTTP timeout for PDF and background downloads, in seconds.
    #[arg(long, global = true, env = "PAPER2SOCIAL_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Args, Debug)]
struct PdfArgs {
    /// PDF user password for encrypted documents.
    #[arg(long, env = "PAPER2SOCIAL_PASSWORD")]
    password: Option<String>,

    /// Article characters sent to the summariser.
    #[arg(long, env = "PAPER2SOCIAL_MAX_INPUT_CHARS", default_value_t = 12_000)]
    max_input_chars: usize,
}

#[derive(Args, Debug)]
struct SlideArgs {
    /// Background source.
    #[arg(long, value_enum, env = "PAPER2SOCIAL_BACKGROUND", default_value = "solid")]
    background: BackgroundArg,

    /// Directory of pre-generated dalle_slide_{n}.png backgrounds (overrides --background).
    #[arg(long, env = "PAPER2SOCIAL_BACKGROUND_DIR")]
    background_dir: Option<PathBuf>,

    /// Text layout: split (headline above body) or joint (one fitted block).
    #[arg(long, value_enum, env = "PAPER2SOCIAL_LAYOUT", default_value = "split")]
    layout: LayoutArg,

    /// TrueType font tried before the system defaults.
    #[arg(long, env = "PAPER2SOCIAL_FONT")]
    font: Option<PathBuf>,

    /// Brand mark drawn in the bottom-right corner.
    #[arg(long, env = "PAPER2SOCIAL_BRAND")]
    brand: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BackgroundArg {
    Solid,
    Unsplash,
    Generated,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum LayoutArg {
    Split,
    Joint,
}

fn parse_kind(s: &str) -> Result<ContentKind, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let started = Instant::now();
    match &cli.command {
        Command::Summarize { input, output, pdf } => {
            let config = build_config(&cli, Some(pdf), None, None)?;
            let spinner = stage_spinner(show_progress, "Summarising…");
            let result = summarize_pdf(input, &config).await;
            if let Some(bar) = spinner {
                bar.finish_and_clear();
            }
            let out = result.context("Summarisation failed")?;
            save_summary(&out.summary, output).context("Failed to save summary")?;

            if !cli.quiet {
                let mark = if out.summary.is_error() { cyan("⚠") } else { green("✔") };
                eprintln!(
                    "{}  {} pages  {} chars  {}ms  →  {}",
                    mark,
                    out.page_count,
                    out.input_chars,
                    out.duration_ms,
                    bold(&output.display().to_string()),
                );
                print_usage(&out.usage);
                if let Some(ref e) = out.summary.error {
                    eprintln!("   {}", red(e));
                }
            }
        }

        Command::Generate {
            summary,
            out_dir,
            only,
        } => {
            let config = build_config(&cli, None, None, None)?;
            let summary = load_summary(summary)
                .with_context(|| format!("Failed to load summary from {:?}", summary))?;
            if let Some(ref e) = summary.error {
                anyhow::bail!("Summary carries an error ({e}); re-run `summarize` first");
            }
            let provider = resolve_provider(&config).context("No LLM provider")?;

            let kinds: Vec<ContentKind> = if only.is_empty() {
                ContentKind::ALL.to_vec()
            } else {
                only.clone()
            };

            std::fs::create_dir_all(out_dir)
                .with_context(|| format!("Failed to create {:?}", out_dir))?;
            let mut usage = TokenUsage::default();
            for kind in kinds {
                let spinner = stage_spinner(show_progress, &format!("Writing {}…", kind.label()));
                let result = generate_copy(&provider, kind, &summary, &config).await;
                if let Some(bar) = spinner {
                    bar.finish_and_clear();
                }
                let (text, used) =
                    result.with_context(|| format!("Failed to generate {}", kind.label()))?;
                usage += used;

                let path = out_dir.join(kind.file_name());
                std::fs::write(&path, &text)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                if !cli.quiet {
                    eprintln!(
                        "  {} {:<24} {}",
                        green("✓"),
                        kind.label(),
                        dim(&path.display().to_string())
                    );
                }
            }
            if !cli.quiet {
                print_usage(&usage);
            }
        }

        Command::Slides {
            carousel,
            out_dir,
            slides,
        } => {
            let progress = progress_callback(show_progress);
            let config = build_config(&cli, None, Some(slides), progress)?;
            let text = std::fs::read_to_string(carousel)
                .with_context(|| format!("Failed to read carousel copy from {:?}", carousel))?;
            let parsed = parse_carousel(&text);
            if parsed.is_empty() {
                anyhow::bail!("No slides found in {:?} (expected blocks separated by ---)", carousel);
            }
            let report = render_carousel(&parsed, out_dir, &config)
                .await
                .context("Rendering failed")?;
            if !cli.quiet {
                print_report(&report, out_dir, show_progress);
            }
        }

        Command::Run {
            input,
            out_dir,
            pdf,
            slides,
        } => {
            let progress = progress_callback(show_progress);
            let config = build_config(&cli, Some(pdf), Some(slides), progress)?;
            if show_progress {
                eprintln!("{} {}", cyan("◆"), bold("Summarising and writing copy…"));
            }
            let out = run(input, out_dir, &config).await.context("Run failed")?;

            if !cli.quiet {
                eprintln!(
                    "{}  {}  {}",
                    green("✔"),
                    bold(&out.summary.summary.title),
                    dim(&out_dir.join(SUMMARY_FILE).display().to_string()),
                );
                print_content(&out.content, out_dir);
                print_report(&out.carousel, &out_dir.join(SLIDES_DIR), show_progress);
                let mut usage = out.summary.usage;
                usage += out.content.stats.usage;
                print_usage(&usage);
            }
        }
    }

    if !cli.quiet {
        eprintln!("   {}", dim(&format!("{}ms total", started.elapsed().as_millis())));
    }
    Ok(())
}

fn progress_callback(show_progress: bool) -> Option<ProgressCallback> {
    show_progress.then(|| CliProgressCallback::new() as Arc<dyn SlideProgressCallback>)
}

/// Map CLI args to `PipelineConfig`.
fn build_config(
    cli: &Cli,
    pdf: Option<&PdfArgs>,
    slides: Option<&SlideArgs>,
    progress: Option<ProgressCallback>,
) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .max_retries(cli.llm.max_retries)
        .api_timeout_secs(cli.llm.api_timeout)
        .download_timeout_secs(cli.llm.download_timeout);

    if let Some(ref model) = cli.llm.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.llm.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(pdf) = pdf {
        builder = builder.max_input_chars(pdf.max_input_chars);
        if let Some(ref pwd) = pdf.password {
            builder = builder.password(pwd);
        }
    }
    if let Some(slides) = slides {
        builder = builder
            .composer(build_composer(slides)?)
            .background(match (&slides.background_dir, &slides.background) {
                (Some(dir), _) => BackgroundChoice::Directory(dir.clone()),
                (None, BackgroundArg::Solid) => BackgroundChoice::Solid,
                (None, BackgroundArg::Unsplash) => BackgroundChoice::Unsplash,
                (None, BackgroundArg::Generated) => BackgroundChoice::Generated,
            });
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn build_composer(slides: &SlideArgs) -> Result<ComposerConfig> {
    let mut config = match slides.layout {
        LayoutArg::Split => ComposerConfig::default(),
        LayoutArg::Joint => ComposerConfig::joint(),
    };
    if let Some(ref font) = slides.font {
        if !font.exists() {
            anyhow::bail!("Font file not found: {:?}", font);
        }
        config.font_paths.insert(0, font.clone());
    }
    if let Some(ref brand) = slides.brand {
        config.brand_text = brand.clone();
    }
    config.validate().context("Invalid slide layout")?;
    Ok(config)
}

fn print_usage(usage: &TokenUsage) {
    eprintln!(
        "   {} tokens in  /  {} tokens out",
        dim(&usage.input_tokens.to_string()),
        dim(&usage.output_tokens.to_string()),
    );
}

fn print_content(content: &GeneratedContent, out_dir: &Path) {
    for kind in ContentKind::ALL {
        eprintln!(
            "  {} {:<24} {:>6} chars  {}",
            green("✓"),
            kind.label(),
            content.get(kind).chars().count(),
            dim(&out_dir.join(kind.file_name()).display().to_string()),
        );
    }
}

fn print_report(report: &CarouselReport, out_dir: &Path, progress_shown: bool) {
    // The progress callback already logged each slide.
    if !progress_shown {
        for slide in &report.slides {
            eprintln!(
                "  {} {}  {}",
                green("✓"),
                slide_file_name(slide.index),
                dim(&format!(
                    "headline {}px, body {}px",
                    slide.headline_font_size, slide.body_font_size
                )),
            );
        }
        for error in &report.errors {
            eprintln!("  {} {}", red("✗"), red(&error.to_string()));
        }
    }
    eprintln!(
        "{}  {}/{} slides  {}ms  →  {}",
        if report.is_complete() { green("✔") } else { cyan("⚠") },
        report.slides.len(),
        report.total(),
        report.duration_ms,
        bold(&out_dir.display().to_string()),
    );
}
