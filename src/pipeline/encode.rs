//! Image encoding: composed slides → PNG bytes, generated images ← base64.
//!
//! PNG is lossless, so thin glyph edges in the overlay text survive intact;
//! JPEG would smear them against the darkened band.

use crate::error::BackgroundError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Encode an opaque slide as PNG.
pub fn encode_png(img: RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!("Encoded slide → {} bytes PNG", buf.len());
    Ok(buf)
}

/// Decode a base64 image payload (as returned by image-generation APIs).
pub fn decode_base64_image(b64: &str) -> Result<DynamicImage, BackgroundError> {
    let bytes = STANDARD.decode(b64.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}
