//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is not safe to drive from async contexts. Extraction therefore
//! runs on tokio's blocking pool.
//!
//! The cleaned text is what the summariser sees: every page's text in page
//! order, each line trimmed, blank lines dropped.

use crate::error::SocialError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Plain text pulled from a PDF.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
    /// Pages that produced no text (1-indexed).
    pub empty_pages: Vec<usize>,
}

/// Extract and clean the text of every page.
pub async fn extract_text(pdf_path: &Path, password: Option<&str>) -> Result<ExtractedText, SocialError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || extract_text_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| SocialError::Internal(format!("Extraction task panicked: {e}")))?
}

fn extract_text_blocking(pdf_path: &Path, password: Option<&str>) -> Result<ExtractedText, SocialError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            SocialError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            SocialError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    let mut raw = String::new();
    let mut empty_pages = Vec::new();
    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(text) => {
                let page_text = text.all();
                if page_text.trim().is_empty() {
                    empty_pages.push(idx + 1);
                } else {
                    raw.push_str(&page_text);
                    raw.push('\n');
                }
            }
            Err(e) => {
                warn!("Page {}: text extraction failed: {:?}", idx + 1, e);
                empty_pages.push(idx + 1);
            }
        }
    }

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(SocialError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }
    debug!("Extracted {} chars from {} pages", text.len(), page_count);

    Ok(ExtractedText {
        text,
        page_count,
        empty_pages,
    })
}

/// Bind pdfium: `PDFIUM_LIB_PATH`, then the working directory, then the system.
fn bind_pdfium() -> Result<Pdfium, SocialError> {
    let explicit = std::env::var("PDFIUM_LIB_PATH")
        .ok()
        .filter(|p| !p.is_empty());

    let bindings = match explicit {
        Some(path) => Pdfium::bind_to_library(&path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| SocialError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// Trim every line and drop blank ones.
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_trims_and_drops_blank_lines() {
        let raw = "  Title  \n\n\n   \nFirst line\t\n  second line\n";
        assert_eq!(clean_text(raw), "Title\nFirst line\nsecond line");
    }

    #[test]
    fn clean_text_of_whitespace_is_empty() {
        assert_eq!(clean_text(" \n\t\n "), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
