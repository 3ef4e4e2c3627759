//! Glyph sources: text measurement and drawing.
//!
//! Layout only needs [`GlyphMetrics::measure`], so the fitting code in
//! [`super::text`] can run against any metric source, including fixed-width
//! fakes in tests. Drawing goes through [`Typeface`].
//!
//! Two faces exist:
//!
//! * [`TrueTypeFace`] — a TTF/OTF file rasterised with `rusttype`.
//! * [`BuiltinFace`] — a 5×7 bitmap glyph set scaled to the requested size.
//!   Always available, so a missing font file never fails a render.

use super::builtin_font::{self, CELL_ADVANCE, CELL_HEIGHT, GLYPH_COLUMNS, GLYPH_ROWS};
use image::RgbaImage;
use rusttype::{point, Font, Scale};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pixel extent of a run of text at a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// Measures text in pixels.
pub trait GlyphMetrics {
    /// Width and line height of `text` set at `size` px.
    ///
    /// `height` is the line height of the face at that size and does not
    /// depend on which glyphs `text` contains.
    fn measure(&self, text: &str, size: u32) -> TextExtent;
}

/// A face that can also paint glyphs onto a canvas.
pub trait Typeface: GlyphMetrics + Send + Sync {
    /// Human-readable face name for logs.
    fn name(&self) -> &str;

    /// Draw `text` with its line box's top-left corner at `(x, y)`.
    ///
    /// Pixels outside the canvas are clipped.
    fn draw(&self, canvas: &mut RgbaImage, text: &str, size: u32, x: i64, y: i64, color: [u8; 3]);
}

// ── TrueType ─────────────────────────────────────────────────────────────

/// A TrueType/OpenType face loaded from disk.
pub struct TrueTypeFace {
    font: Font<'static>,
    name: String,
}

impl TrueTypeFace {
    /// Parse font bytes. Returns `None` when the data is not a usable font.
    pub fn from_bytes(bytes: Vec<u8>, name: impl Into<String>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self {
            font,
            name: name.into(),
        })
    }

    /// Read and parse a font file.
    pub fn from_file(path: &Path) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        Self::from_bytes(bytes, path.display().to_string())
    }
}

impl GlyphMetrics for TrueTypeFace {
    fn measure(&self, text: &str, size: u32) -> TextExtent {
        let scale = Scale::uniform(size as f32);
        let v_metrics = self.font.v_metrics(scale);
        let height = (v_metrics.ascent - v_metrics.descent).ceil().max(0.0) as u32;

        let width = self
            .font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);

        TextExtent {
            width: width.ceil().max(0.0) as u32,
            height,
        }
    }
}

impl Typeface for TrueTypeFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, size: u32, x: i64, y: i64, color: [u8; 3]) {
        let scale = Scale::uniform(size as f32);
        let ascent = self.font.v_metrics(scale).ascent;
        let origin = point(x as f32, y as f32 + ascent);

        for glyph in self.font.layout(text, scale, origin) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    let px = bb.min.x as i64 + gx as i64;
                    let py = bb.min.y as i64 + gy as i64;
                    blend_pixel(canvas, px, py, color, coverage);
                });
            }
        }
    }
}

// ── Built-in bitmap ──────────────────────────────────────────────────────

/// The built-in bitmap face.
///
/// A glyph cell is 6×8 units (5×7 glyph plus one unit of spacing and
/// descent); one unit is `size / 8` pixels, so the line height equals the
/// requested size.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFace;

impl BuiltinFace {
    fn unit(size: u32) -> f32 {
        size as f32 / CELL_HEIGHT as f32
    }
}

impl GlyphMetrics for BuiltinFace {
    fn measure(&self, text: &str, size: u32) -> TextExtent {
        let cells = text.chars().count() * CELL_ADVANCE;
        TextExtent {
            width: (cells as f32 * Self::unit(size)).ceil() as u32,
            height: size,
        }
    }
}

impl Typeface for BuiltinFace {
    fn name(&self) -> &str {
        "builtin-5x7"
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, size: u32, x: i64, y: i64, color: [u8; 3]) {
        let unit = Self::unit(size);
        let edge = |origin: i64, cells: usize| origin + (cells as f32 * unit).round() as i64;

        for (i, c) in text.chars().enumerate() {
            let columns = builtin_font::glyph(c);
            for (col, bits) in columns.iter().enumerate().take(GLYPH_COLUMNS) {
                for row in 0..GLYPH_ROWS {
                    if bits & (1 << row) == 0 {
                        continue;
                    }
                    let cell_x = i * CELL_ADVANCE + col;
                    let (x0, x1) = (edge(x, cell_x), edge(x, cell_x + 1));
                    let (y0, y1) = (edge(y, row), edge(y, row + 1));
                    for py in y0..y1.max(y0 + 1) {
                        for px in x0..x1.max(x0 + 1) {
                            blend_pixel(canvas, px, py, color, 1.0);
                        }
                    }
                }
            }
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────

/// Load the first usable font in `paths`, or fall back to [`BuiltinFace`].
///
/// Never fails: a missing or corrupt file only costs visual fidelity.
pub fn load_typeface(paths: &[PathBuf]) -> Arc<dyn Typeface> {
    for path in paths {
        match TrueTypeFace::from_file(path) {
            Some(face) => {
                info!("Using font {}", path.display());
                return Arc::new(face);
            }
            None => debug!("Font {} not usable, trying next", path.display()),
        }
    }
    warn!(
        "None of {} font file(s) could be loaded; using built-in glyphs",
        paths.len()
    );
    Arc::new(BuiltinFace)
}

/// Alpha-blend `color` into the canvas at `(x, y)` with the given coverage.
fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: [u8; 3], coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, &c) in pixel.0.iter_mut().take(3).zip(color.iter()) {
        *channel = (c as f32 * coverage + *channel as f32 * (1.0 - coverage)).round() as u8;
    }
    pixel.0[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn builtin_measure_scales_with_size() {
        let face = BuiltinFace;
        assert_eq!(face.measure("abcd", 8), TextExtent { width: 24, height: 8 });
        assert_eq!(face.measure("abcd", 16), TextExtent { width: 48, height: 16 });
        assert_eq!(face.measure("", 24).width, 0);
    }

    #[test]
    fn builtin_counts_chars_not_bytes() {
        let face = BuiltinFace;
        assert_eq!(face.measure("é", 8).width, face.measure("e", 8).width);
    }

    #[test]
    fn builtin_draw_marks_pixels() {
        let mut canvas = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]));
        BuiltinFace.draw(&mut canvas, "H", 16, 2, 2, [255, 255, 255]);
        let lit = canvas.pixels().filter(|p| p.0[0] == 255).count();
        assert!(lit > 0);
    }

    #[test]
    fn builtin_draw_clips_outside_canvas() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        BuiltinFace.draw(&mut canvas, "WWWW", 40, -20, -20, [255, 0, 0]);
        BuiltinFace.draw(&mut canvas, "WWWW", 40, 500, 500, [255, 0, 0]);
    }

    #[test]
    fn missing_fonts_fall_back_to_builtin() {
        let face = load_typeface(&[PathBuf::from("/definitely/not/here.ttf")]);
        assert_eq!(face.name(), "builtin-5x7");
    }

    #[test]
    fn garbage_font_bytes_rejected() {
        assert!(TrueTypeFace::from_bytes(b"not a font".to_vec(), "junk").is_none());
    }

    #[test]
    fn blend_half_coverage() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        blend_pixel(&mut canvas, 0, 0, [200, 100, 50], 0.5);
        assert_eq!(canvas.get_pixel(0, 0).0, [100, 50, 25, 255]);
    }
}
