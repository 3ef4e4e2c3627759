//! # edgequake-paper2social
//!
//! Turn a research paper into social-media content: a structured summary,
//! four pieces of marketing copy, and a rendered Instagram carousel.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file, URL or bytes
//!  ├─ 2. Extract  page text via pdfium (spawn_blocking)
//!  ├─ 3. Summary  one LLM call → StructuredSummary (JSON)
//!  ├─ 4. Copy     podcast · carousel · thread · blog (one call each)
//!  ├─ 5. Parse    carousel copy → Slide records
//!  └─ 6. Compose  background + overlay + fitted text → 1080×1080 PNG
//! ```
//!
//! The [`SlideComposer`] is usable on its own: give it a [`Slide`] and a
//! background image and it returns PNG bytes, shrinking the headline and
//! body until they fit the overlay band.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_paper2social::{run, PipelineConfig};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = PipelineConfig::default();
//!     let out = run("paper.pdf", Path::new("out"), &config).await?;
//!     println!("{}", out.summary.summary.title);
//!     eprintln!("{} slides rendered", out.carousel.slides.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Composing a single slide
//!
//! ```rust
//! use edgequake_paper2social::{ComposerConfig, Slide, SlideComposer};
//!
//! let composer = SlideComposer::new(ComposerConfig::default()).unwrap();
//! let background = composer.solid_background([30, 30, 30]);
//! let png = composer
//!     .render(&Slide::new("Key Finding", "Important research finding"), &background)
//!     .unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paper2social` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod background;
pub mod carousel;
pub mod compose;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use background::{BackgroundChoice, BackgroundSource};
pub use carousel::{parse_carousel, Slide};
pub use compose::SlideComposer;
pub use config::{
    ComposerConfig, ComposerConfigBuilder, LayoutPolicy, PipelineConfig, PipelineConfigBuilder,
};
pub use error::{BackgroundError, SlideError, SocialError};
pub use generate::{
    generate_content, generate_content_with, render_carousel, render_carousel_with, run,
    summarize_bytes, summarize_pdf, summarize_source,
};
pub use output::{
    CarouselReport, ContentStats, GeneratedContent, RenderedSlide, RunOutput, SummaryOutput,
    TokenUsage,
};
pub use pipeline::copy::ContentKind;
pub use pipeline::llm::{Completer, Completion, CompletionRequest};
pub use pipeline::summary::{load_summary, save_summary, StructuredSummary};
pub use progress::{NoopProgressCallback, ProgressCallback, SlideProgressCallback};
