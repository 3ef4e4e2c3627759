//! Slide composition: background + overlay band + fitted text + brand mark.
//!
//! ## Render steps
//!
//! ```text
//! background ──▶ cover-resize ──▶ overlay band ──▶ fit text ──▶ draw ──▶ brand ──▶ PNG
//!                (canvas size)    (alpha blend)    (per region)  (centred)
//! ```
//!
//! [`SlideComposer`] is a pure function of its configuration, its typeface
//! and the slide inputs: no network, no disk. Backgrounds are fetched by
//! [`crate::background`] and handed in already decoded.

pub mod builtin_font;
pub mod glyphs;
pub mod text;

use crate::carousel::Slide;
use crate::config::{ComposerConfig, LayoutPolicy};
use crate::error::SocialError;
use crate::pipeline::encode;
use glyphs::{load_typeface, Typeface};
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use std::fmt;
use std::sync::Arc;
use text::{fit_text_block, FitBounds, TextBlock};
use tracing::debug;

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }
}

/// A fitted text block and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub region: Region,
    pub block: TextBlock,
    /// Fill colour per part of `block.lines`.
    pub colors: Vec<[u8; 3]>,
}

/// The full geometry of one slide, computed before any pixel is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    pub overlay: Region,
    pub text_area: Region,
    /// One block per region: headline then body (split), or a single joint block.
    pub blocks: Vec<PlacedBlock>,
}

impl SlideLayout {
    /// Font size of the block holding the headline.
    pub fn headline_font_size(&self) -> u32 {
        self.blocks.first().map(|b| b.block.font_size).unwrap_or(0)
    }

    /// Font size of the block holding the body copy.
    pub fn body_font_size(&self) -> u32 {
        self.blocks.last().map(|b| b.block.font_size).unwrap_or(0)
    }
}

/// Renders carousel slides.
#[derive(Clone)]
pub struct SlideComposer {
    config: ComposerConfig,
    face: Arc<dyn Typeface>,
}

impl fmt::Debug for SlideComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlideComposer")
            .field("config", &self.config)
            .field("face", &self.face.name())
            .finish()
    }
}

impl SlideComposer {
    /// Validate `config` and load the first usable font from `config.font_paths`.
    pub fn new(config: ComposerConfig) -> Result<Self, SocialError> {
        config.validate()?;
        let face = load_typeface(&config.font_paths);
        Ok(Self { config, face })
    }

    /// Use an already-loaded typeface instead of probing font files.
    pub fn with_typeface(config: ComposerConfig, face: Arc<dyn Typeface>) -> Result<Self, SocialError> {
        config.validate()?;
        Ok(Self { config, face })
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn typeface(&self) -> &dyn Typeface {
        self.face.as_ref()
    }

    /// Solid placeholder background at canvas size.
    pub fn solid_background(&self, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(
            self.config.canvas_width,
            self.config.canvas_height,
            Rgb(rgb),
        ))
    }

    /// Compute overlay, text area and fitted blocks for a headline/body pair.
    pub fn layout(&self, headline: &str, body: &str) -> Result<SlideLayout, SocialError> {
        let c = &self.config;
        let (w, h, pad) = (c.canvas_width as i64, c.canvas_height as i64, c.padding as i64);

        let overlay_height = (h as f64 * c.overlay_fraction as f64) as i64;
        let overlay_top = h - overlay_height;
        let text_width = w - 2 * pad;
        let text_height = overlay_height - 2 * pad;
        if overlay_height <= 0 || text_width <= 0 || text_height <= 0 {
            return Err(SocialError::InvalidLayout(format!(
                "text area is {text_width}x{text_height}px \
                 (canvas {w}x{h}, overlay {overlay_height}px, padding {pad}px)"
            )));
        }

        let overlay = Region {
            left: 0,
            top: overlay_top as u32,
            width: w as u32,
            height: overlay_height as u32,
        };
        let text_area = Region {
            left: pad as u32,
            top: (overlay_top + pad) as u32,
            width: text_width as u32,
            height: text_height as u32,
        };

        let bounds = |max_height: u32, max_font: u32| FitBounds {
            max_width: text_area.width,
            max_height,
            max_font,
            min_font: c.min_font,
            step: c.font_step,
            line_spacing: c.line_spacing,
        };
        let metrics = self.face.as_ref();

        let blocks = match c.layout {
            LayoutPolicy::Split { headline_fraction } => {
                let headline_height = (text_area.height as f64 * headline_fraction as f64) as u32;
                let body_height = text_area.height - headline_height;
                if headline_height == 0 || body_height == 0 {
                    return Err(SocialError::InvalidLayout(format!(
                        "text area of {}px cannot be split {headline_fraction}/{}",
                        text_area.height,
                        1.0 - headline_fraction
                    )));
                }
                let headline_region = Region {
                    height: headline_height,
                    ..text_area
                };
                let body_region = Region {
                    top: text_area.top + headline_height,
                    height: body_height,
                    ..text_area
                };
                vec![
                    PlacedBlock {
                        region: headline_region,
                        block: fit_text_block(
                            &[headline],
                            metrics,
                            &bounds(headline_height, c.headline_max_font),
                        ),
                        colors: vec![c.headline_color],
                    },
                    PlacedBlock {
                        region: body_region,
                        block: fit_text_block(&[body], metrics, &bounds(body_height, c.body_max_font)),
                        colors: vec![c.body_color],
                    },
                ]
            }
            LayoutPolicy::Joint => vec![PlacedBlock {
                region: text_area,
                block: fit_text_block(
                    &[headline, body],
                    metrics,
                    &bounds(text_area.height, c.headline_max_font),
                ),
                colors: vec![c.headline_color, c.body_color],
            }],
        };

        for placed in &blocks {
            debug!(
                "Block of {} lines at {}px ({}px of {}px{})",
                placed.block.line_count(),
                placed.block.font_size,
                placed.block.pixel_height,
                placed.region.height,
                if placed.block.overflow { ", overflowing" } else { "" }
            );
        }

        Ok(SlideLayout {
            overlay,
            text_area,
            blocks,
        })
    }

    /// Compose a slide into an opaque RGB image of exact canvas size.
    pub fn compose(&self, slide: &Slide, background: &DynamicImage) -> Result<RgbImage, SocialError> {
        self.compose_with_layout(slide, background).map(|(image, _)| image)
    }

    fn compose_with_layout(
        &self,
        slide: &Slide,
        background: &DynamicImage,
    ) -> Result<(RgbImage, SlideLayout), SocialError> {
        let layout = self.layout(&slide.headline, &slide.copy)?;
        let c = &self.config;

        let mut canvas = fit_background(background, c.canvas_width, c.canvas_height);
        shade_region(&mut canvas, &layout.overlay, c.overlay_color);

        for placed in &layout.blocks {
            self.draw_block(&mut canvas, placed);
        }
        self.draw_brand(&mut canvas);

        Ok((DynamicImage::ImageRgba8(canvas).into_rgb8(), layout))
    }

    /// Compose a slide and encode it as PNG bytes.
    pub fn render(&self, slide: &Slide, background: &DynamicImage) -> Result<Vec<u8>, SocialError> {
        self.render_with_layout(slide, background).map(|(png, _)| png)
    }

    /// Like [`render`](Self::render), also returning the layout the pixels
    /// were drawn from.
    pub fn render_with_layout(
        &self,
        slide: &Slide,
        background: &DynamicImage,
    ) -> Result<(Vec<u8>, SlideLayout), SocialError> {
        let (image, layout) = self.compose_with_layout(slide, background)?;
        Ok((encode::encode_png(image)?, layout))
    }

    /// Draw lines centred horizontally in the text area, the block centred
    /// vertically in its region.
    fn draw_block(&self, canvas: &mut RgbaImage, placed: &PlacedBlock) {
        let face = self.face.as_ref();
        let size = placed.block.font_size;
        let region = &placed.region;

        let mut y = region.top as i64
            + (region.height as i64 - placed.block.pixel_height as i64).div_euclid(2);
        for (part, color) in placed.block.lines.iter().zip(&placed.colors) {
            for line in part {
                let extent = face.measure(line, size);
                let x = region.left as i64 + (region.width as i64 - extent.width as i64).div_euclid(2);
                face.draw(canvas, line, size, x, y, *color);
                y += extent.height as i64 + self.config.line_spacing as i64;
            }
        }
    }

    /// Stamp the brand text at the bottom-right corner, inset by the padding.
    fn draw_brand(&self, canvas: &mut RgbaImage) {
        let c = &self.config;
        if c.brand_text.is_empty() {
            return;
        }
        let extent = self.face.measure(&c.brand_text, c.brand_font_size);
        let x = c.canvas_width as i64 - extent.width as i64 - c.padding as i64;
        let y = c.canvas_height as i64 - c.padding as i64 - c.brand_font_size as i64;
        self.face
            .draw(canvas, &c.brand_text, c.brand_font_size, x, y, c.brand_color);
    }
}

/// Scale and centre-crop `background` to exactly `width`×`height`.
fn fit_background(background: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if background.width() == width && background.height() == height {
        return background.to_rgba8();
    }
    background
        .resize_to_fill(width, height, FilterType::Triangle)
        .to_rgba8()
}

/// Alpha-composite a flat RGBA colour over `region`.
fn shade_region(canvas: &mut RgbaImage, region: &Region, rgba: [u8; 4]) {
    let alpha = rgba[3] as u32;
    let bottom = region.bottom().min(canvas.height());
    let right = region.right().min(canvas.width());
    for y in region.top..bottom {
        for x in region.left..right {
            let pixel = canvas.get_pixel_mut(x, y);
            for i in 0..3 {
                let blended = (rgba[i] as u32 * alpha + pixel.0[i] as u32 * (255 - alpha) + 127) / 255;
                pixel.0[i] = blended as u8;
            }
            pixel.0[3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphs::BuiltinFace;

    fn composer(config: ComposerConfig) -> SlideComposer {
        SlideComposer::with_typeface(config, Arc::new(BuiltinFace)).unwrap()
    }

    #[test]
    fn default_geometry() {
        let c = composer(ComposerConfig::default());
        let layout = c.layout("Key Finding", "Important research finding").unwrap();
        assert_eq!(layout.overlay.top, 540);
        assert_eq!(layout.overlay.height, 540);
        assert_eq!(layout.text_area.left, 60);
        assert_eq!(layout.text_area.top, 600);
        assert_eq!(layout.text_area.width, 960);
        assert_eq!(layout.text_area.height, 420);
        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.blocks[0].region.height, 252);
        assert_eq!(layout.blocks[1].region.height, 168);
        assert_eq!(layout.blocks[1].region.top, 852);
    }

    #[test]
    fn joint_layout_has_one_block() {
        let c = composer(ComposerConfig::joint());
        let layout = c.layout("Headline", "Body copy").unwrap();
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.blocks[0].block.lines.len(), 2);
        assert_eq!(layout.overlay.height, 360);
        assert_eq!(layout.headline_font_size(), layout.body_font_size());
    }

    #[test]
    fn fitted_blocks_stay_inside_regions() {
        let c = composer(ComposerConfig::default());
        let layout = c
            .layout(
                "Sleep sharpens memory",
                "A night of deep sleep consolidates what you learned during the day.",
            )
            .unwrap();
        for placed in &layout.blocks {
            assert!(!placed.block.overflow);
            assert!(placed.block.pixel_height <= placed.region.height);
        }
    }

    #[test]
    fn padding_larger_than_band_is_rejected() {
        let config = ComposerConfig {
            canvas_width: 200,
            canvas_height: 200,
            padding: 60,
            ..ComposerConfig::default()
        };
        let err = composer(config).layout("a", "b").unwrap_err();
        assert!(matches!(err, SocialError::InvalidLayout(_)));
    }

    #[test]
    fn shade_blends_toward_overlay() {
        let mut canvas = RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255]));
        let region = Region {
            left: 0,
            top: 2,
            width: 4,
            height: 2,
        };
        shade_region(&mut canvas, &region, [0, 0, 0, 180]);
        assert_eq!(canvas.get_pixel(0, 0).0[0], 255);
        assert_eq!(canvas.get_pixel(0, 3).0[0], 75);
    }

    #[test]
    fn background_is_cover_resized() {
        let wide = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 100, Rgb([10, 20, 30])));
        let fitted = fit_background(&wide, 64, 64);
        assert_eq!(fitted.dimensions(), (64, 64));
    }

    #[test]
    fn render_reports_the_layout_it_drew() {
        let c = composer(ComposerConfig::default());
        let slide = Slide::new("Key Finding", "Important research finding");
        let background = c.solid_background([30, 30, 30]);

        let (png, layout) = c.render_with_layout(&slide, &background).unwrap();
        assert_eq!(png, c.render(&slide, &background).unwrap());
        assert_eq!(layout, c.layout(&slide.headline, &slide.copy).unwrap());
    }

    #[test]
    fn empty_slide_renders() {
        let c = composer(ComposerConfig::default());
        let slide = Slide::default();
        let image = c.compose(&slide, &c.solid_background([30, 30, 30])).unwrap();
        assert_eq!(image.dimensions(), (1080, 1080));
    }
}
