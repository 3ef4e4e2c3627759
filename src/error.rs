//! Error types for the edgequake-paper2social library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SocialError`] — **Fatal**: the stage cannot proceed at all (bad input
//!   file, provider not configured, degenerate slide layout). Returned as
//!   `Err(SocialError)` from the top-level functions in [`crate::generate`].
//!
//! * [`SlideError`] — **Non-fatal**: a single carousel slide failed to render
//!   or could not be written, but the other slides are fine. Stored inside
//!   [`crate::output::CarouselReport`] so one bad slide does not lose the
//!   whole carousel.
//!
//! * [`BackgroundError`] — why a background could not be fetched. Never
//!   surfaces to callers: the slide falls back to a solid fill.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-paper2social library.
#[derive(Debug, Error)]
pub enum SocialError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// The PDF opened but no page carried any extractable text.
    #[error("No extractable text in '{path}' (scanned document?)")]
    EmptyDocument { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction needs a pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
  • Place libpdfium next to the binary or in the working directory.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM call failed on every attempt.
    #[error("LLM call for {stage} failed after {retries} retries: {detail}")]
    LlmFailed {
        stage: String,
        retries: u32,
        detail: String,
    },

    /// The summary carries a parse error, so no copy can be derived from it.
    #[error("Summary is unusable: {reason}\nRe-run `summarize` or fix the summary file.")]
    UnusableSummary { reason: String },

    // ── Slide errors ──────────────────────────────────────────────────────
    /// Canvas or text-region dimensions are degenerate.
    #[error("Invalid slide layout: {0}")]
    InvalidLayout(String),

    /// The rendered slide could not be encoded.
    #[error("Failed to encode slide image: {0}")]
    ImageEncode(#[from] image::ImageError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A summary file could not be (de)serialised.
    #[error("Invalid summary JSON: {0}")]
    SummaryFormat(#[from] serde_json::Error),

    /// Summary output path has an unsupported extension.
    #[error("Unsupported summary output '{path}': must end in .json or .csv")]
    UnsupportedOutput { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single carousel slide.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum SlideError {
    /// Composition or encoding failed.
    #[error("Slide {slide}: render failed: {detail}")]
    RenderFailed { slide: usize, detail: String },

    /// The PNG could not be written to disk.
    #[error("Slide {slide}: could not write '{path}': {detail}")]
    WriteFailed {
        slide: usize,
        path: String,
        detail: String,
    },
}

/// Why a slide background could not be obtained.
#[derive(Debug, Error)]
pub enum BackgroundError {
    /// The API key for the chosen source is not set.
    #[error("{var} is not set")]
    MissingKey { var: &'static str },

    /// Request failed, timed out or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The image-generation response carried no image payload.
    #[error("image generation returned no data")]
    NoImageData,

    /// The payload was not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Downloaded or decoded bytes are not a readable image.
    #[error("undecodable image: {0}")]
    Decode(#[from] image::ImageError),

    /// A pre-generated image file could not be opened.
    #[error("'{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_failed_display() {
        let e = SocialError::LlmFailed {
            stage: "summary".into(),
            retries: 3,
            detail: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("summary"), "got: {msg}");
        assert!(msg.contains("3 retries"), "got: {msg}");
    }

    #[test]
    fn invalid_layout_display() {
        let e = SocialError::InvalidLayout("text area height is -40px".into());
        assert!(e.to_string().contains("-40px"));
    }

    #[test]
    fn slide_error_display() {
        let e = SlideError::WriteFailed {
            slide: 2,
            path: "out/slide_2.png".into(),
            detail: "disk full".into(),
        };
        assert!(e.to_string().contains("Slide 2"));
        assert!(e.to_string().contains("disk full"));
    }

    #[test]
    fn unsupported_output_display() {
        let e = SocialError::UnsupportedOutput {
            path: PathBuf::from("summary.txt"),
        };
        assert!(e.to_string().contains(".json or .csv"));
    }

    #[test]
    fn background_error_display() {
        let e = BackgroundError::MissingKey {
            var: "UNSPLASH_ACCESS_KEY",
        };
        assert_eq!(e.to_string(), "UNSPLASH_ACCESS_KEY is not set");
    }
}
