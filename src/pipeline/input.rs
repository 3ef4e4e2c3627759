//! Input resolution: turn a path, URL or byte buffer into a local PDF file.
//!
//! pdfium opens documents by path, so every input ends up on disk. Remote
//! and in-memory inputs are written under a [`TempDir`] owned by the
//! returned [`PdfSource`]; the file disappears when the source is dropped.
//! The `%PDF` magic is checked up front so callers get [`SocialError::NotAPdf`]
//! instead of an opaque pdfium failure.

use crate::error::SocialError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF ready for extraction.
pub enum PdfSource {
    /// The caller's own file.
    Local(PathBuf),
    /// Downloaded or spilled bytes; the `TempDir` keeps the file alive.
    Temporary { path: PathBuf, _temp_dir: TempDir },
}

impl PdfSource {
    /// Path of the PDF regardless of where it came from.
    pub fn path(&self) -> &Path {
        match self {
            PdfSource::Local(p) => p,
            PdfSource::Temporary { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a path or HTTP(S) URL to a local PDF.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<PdfSource, SocialError> {
    if input.trim().is_empty() {
        return Err(SocialError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(Path::new(input))
    }
}

/// Write in-memory PDF bytes to a managed temp file.
pub fn resolve_bytes(bytes: &[u8]) -> Result<PdfSource, SocialError> {
    let temp_dir = TempDir::new().map_err(|e| SocialError::Internal(format!("tempdir: {e}")))?;
    let path = temp_dir.path().join("upload.pdf");
    check_magic(&path, bytes)?;
    std::fs::write(&path, bytes).map_err(|e| SocialError::Internal(format!("tempfile write: {e}")))?;
    Ok(PdfSource::Temporary {
        path,
        _temp_dir: temp_dir,
    })
}

fn resolve_local(path: &Path) -> Result<PdfSource, SocialError> {
    let path = path.to_path_buf();
    if !path.exists() {
        return Err(SocialError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() {
                check_magic(&path, &magic)?;
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SocialError::PermissionDenied { path });
        }
        Err(_) => return Err(SocialError::FileNotFound { path }),
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(PdfSource::Local(path))
}

/// Reject content whose first four bytes are not `%PDF`.
fn check_magic(path: &Path, bytes: &[u8]) -> Result<(), SocialError> {
    if bytes.len() >= 4 && &bytes[..4] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(SocialError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<PdfSource, SocialError> {
    info!("Downloading PDF from: {}", url);

    let download_err = |reason: String| SocialError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| download_err(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SocialError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            download_err(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(download_err(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_err(e.to_string()))?;

    let temp_dir = TempDir::new().map_err(|e| SocialError::Internal(e.to_string()))?;
    let path = temp_dir.path().join(filename_from_url(url));
    check_magic(&path, &bytes)?;

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| SocialError::Internal(format!("Failed to write temp file: {e}")))?;

    info!("Downloaded {} bytes to {}", bytes.len(), path.display());
    Ok(PdfSource::Temporary {
        path,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of `url` when it looks like a file name.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty() && last.contains('.'))
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_from_url_path() {
        assert_eq!(filename_from_url("https://arxiv.org/pdf/paper.pdf"), "paper.pdf");
        assert_eq!(filename_from_url("https://arxiv.org/pdf/1706.03762"), "1706.03762");
        assert_eq!(filename_from_url("https://example.com/"), "downloaded.pdf");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = resolve_local(Path::new("/definitely/not/here.pdf")).err().unwrap();
        assert!(matches!(err, SocialError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_file_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"PK\x03\x04zip").unwrap();
        let err = resolve_local(f.path()).err().unwrap();
        match err {
            SocialError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn pdf_file_is_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        let source = resolve_local(f.path()).unwrap();
        assert_eq!(source.path(), f.path());
    }

    #[test]
    fn bytes_are_spilled_to_temp_file() {
        let source = resolve_bytes(b"%PDF-1.4 fake").unwrap();
        let path = source.path().to_path_buf();
        assert!(path.exists());
        drop(source);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn blank_input_is_invalid() {
        let err = resolve_input("  ", 5).await.err().unwrap();
        assert!(matches!(err, SocialError::InvalidInput { .. }));
    }
}
