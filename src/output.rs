//! Result types returned by the top-level functions in [`crate::generate`].

use crate::error::{SlideError, SocialError};
use crate::pipeline::copy::ContentKind;
use crate::pipeline::llm::Completion;
use crate::pipeline::summary::StructuredSummary;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use tracing::info;

/// Token accounting for one or more LLM calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl From<&Completion> for TokenUsage {
    fn from(c: &Completion) -> Self {
        Self {
            input_tokens: c.input_tokens,
            output_tokens: c.output_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// Outcome of [`crate::generate::summarize_pdf`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: StructuredSummary,
    /// Pages in the source PDF.
    pub page_count: usize,
    /// Characters of cleaned text extracted (before truncation).
    pub input_chars: usize,
    pub usage: TokenUsage,
    pub duration_ms: u64,
}

/// The four pieces of copy for one summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub podcast_script: String,
    pub instagram_carousel: String,
    pub twitter_thread: String,
    pub blog_post: String,
    pub stats: ContentStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentStats {
    pub usage: TokenUsage,
    pub duration_ms: u64,
}

impl GeneratedContent {
    pub fn get(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Podcast => &self.podcast_script,
            ContentKind::Instagram => &self.instagram_carousel,
            ContentKind::Twitter => &self.twitter_thread,
            ContentKind::Blog => &self.blog_post,
        }
    }

    pub fn set(&mut self, kind: ContentKind, text: String) {
        match kind {
            ContentKind::Podcast => self.podcast_script = text,
            ContentKind::Instagram => self.instagram_carousel = text,
            ContentKind::Twitter => self.twitter_thread = text,
            ContentKind::Blog => self.blog_post = text,
        }
    }

    /// Write each piece to its fixed file name under `dir`, creating `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, SocialError> {
        std::fs::create_dir_all(dir).map_err(|e| SocialError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let mut written = Vec::with_capacity(ContentKind::ALL.len());
        for kind in ContentKind::ALL {
            let path = dir.join(kind.file_name());
            std::fs::write(&path, self.get(kind)).map_err(|e| SocialError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
            info!("Wrote {} → {}", kind.label(), path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// One slide written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedSlide {
    /// 1-based position in the carousel.
    pub index: usize,
    pub path: PathBuf,
    pub headline_font_size: u32,
    pub body_font_size: u32,
}

/// Outcome of [`crate::generate::render_carousel`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarouselReport {
    pub slides: Vec<RenderedSlide>,
    pub errors: Vec<SlideError>,
    pub duration_ms: u64,
}

impl CarouselReport {
    pub fn total(&self) -> usize {
        self.slides.len() + self.errors.len()
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Everything a full run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub summary: SummaryOutput,
    pub content: GeneratedContent,
    pub carousel: CarouselReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut total = TokenUsage::default();
        total += TokenUsage::from(&Completion {
            content: String::new(),
            input_tokens: 10,
            output_tokens: 3,
        });
        total += TokenUsage {
            input_tokens: 5,
            output_tokens: 2,
        };
        assert_eq!(total.input_tokens, 15);
        assert_eq!(total.output_tokens, 5);
    }

    #[test]
    fn content_round_trips_by_kind() {
        let mut content = GeneratedContent::default();
        for kind in ContentKind::ALL {
            content.set(kind, format!("{kind} text\n"));
        }
        assert_eq!(content.get(ContentKind::Blog), "blog text\n");
        assert_eq!(content.get(ContentKind::Instagram), "instagram text\n");
    }

    #[test]
    fn content_is_written_to_fixed_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = GeneratedContent::default();
        content.set(ContentKind::Twitter, "1/ hello\n".into());
        let paths = content.write_to_dir(&dir.path().join("out")).unwrap();
        assert_eq!(paths.len(), 4);
        let thread = std::fs::read_to_string(dir.path().join("out/twitter_thread.txt")).unwrap();
        assert_eq!(thread, "1/ hello\n");
        assert!(dir.path().join("out/blog_post.txt").exists());
    }

    #[test]
    fn report_counts_errors() {
        let report = CarouselReport {
            slides: vec![RenderedSlide {
                index: 1,
                path: PathBuf::from("slide_1.png"),
                headline_font_size: 120,
                body_font_size: 60,
            }],
            errors: vec![SlideError::RenderFailed {
                slide: 2,
                detail: "bad".into(),
            }],
            duration_ms: 5,
        };
        assert_eq!(report.total(), 2);
        assert!(!report.is_complete());
    }
}
