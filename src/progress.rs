//! Progress-callback trait for per-slide carousel events.
//!
//! Inject an [`Arc<dyn SlideProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events while [`crate::generate::render_carousel`] works through the slides.
//! Callers forward them wherever they like: a terminal progress bar, a log,
//! a channel.
//!
//! # Example
//!
//! ```rust
//! use edgequake_paper2social::{SlideProgressCallback, PipelineConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl SlideProgressCallback for CountingCallback {
//!     fn on_slide_complete(&self, index: usize, total: usize, png_len: usize) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Slide {}/{} done ({} bytes)", index, total, png_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { rendered: AtomicUsize::new(0) });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn SlideProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the carousel renderer as it processes each slide.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Slides are rendered one after another, so events
/// for a run never overlap.
pub trait SlideProgressCallback: Send + Sync {
    /// Called once before the first slide.
    fn on_carousel_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before the background of a slide is fetched.
    ///
    /// # Arguments
    /// * `index` — 1-indexed slide number
    /// * `total` — slides in the carousel
    fn on_slide_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called once a slide has been written.
    ///
    /// # Arguments
    /// * `png_len` — size of the encoded PNG in bytes
    fn on_slide_complete(&self, index: usize, total: usize, png_len: usize) {
        let _ = (index, total, png_len);
    }

    /// Called when a slide could not be rendered or written.
    fn on_slide_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every slide has been attempted.
    fn on_carousel_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl SlideProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn SlideProgressCallback>;
