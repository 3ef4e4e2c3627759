//! Pipeline stages from PDF to marketing copy.
//!
//! Each submodule implements one transformation step and is testable on its
//! own; [`crate::generate`] chains them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ summary ──▶ copy ──▶ postprocess
//! (URL/path) (pdfium)    (LLM)      (LLM ×4)  (cleanup)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path, URL or bytes to a
//!    local, magic-checked PDF
//! 2. [`extract`] — pull and clean page text; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`summary`] — one LLM call producing a [`summary::StructuredSummary`]
//! 4. [`copy`]    — one LLM call per [`copy::ContentKind`]
//! 5. [`postprocess`] — deterministic cleanup of every LLM reply
//!
//! [`llm`] holds the completion seam and retry policy shared by 3 and 4;
//! [`encode`] the PNG / base64 image helpers used by slides and backgrounds.

pub mod copy;
pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod summary;
