//! Offline integration tests for slide composition and carousel rendering.
//!
//! No network, no LLM, no pdfium: slides are drawn with the built-in bitmap
//! face so pixel assertions are stable on every machine.

use edgequake_paper2social::compose::glyphs::BuiltinFace;
use edgequake_paper2social::{
    parse_carousel, render_carousel_with, BackgroundChoice, BackgroundSource, ComposerConfig,
    PipelineConfig, Slide, SlideComposer,
};
use image::{GenericImageView, RgbImage};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn composer(config: ComposerConfig) -> SlideComposer {
    SlideComposer::with_typeface(config, Arc::new(BuiltinFace)).expect("valid config")
}

fn decode(png: &[u8]) -> RgbImage {
    image::load_from_memory(png).expect("valid PNG").to_rgb8()
}

fn white_pixels_in_rows(img: &RgbImage, top: u32, bottom: u32) -> usize {
    (top..bottom)
        .flat_map(|y| (0..img.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0 == [255, 255, 255])
        .count()
}

const CAROUSEL: &str = r#"**Slide 1**
Headline: "Sleep Sharpens Memory"
*Copy:* Deep sleep consolidates what you learned.
*Image Description:* A person asleep under glowing notes.

---

**Slide 2**
Headline: "The Study"
*Copy:* 120 adults were tracked for six weeks.

---

**Slide 3**
Headline: "Takeaway"
*Copy:* Protect your eight hours.
"#;

// ── Composition ──────────────────────────────────────────────────────────────

#[test]
fn key_finding_renders_on_solid_background() {
    let c = composer(ComposerConfig::default());
    let slide = Slide::new("Key Finding", "Important research finding");
    let png = c
        .render(&slide, &c.solid_background([30, 30, 30]))
        .expect("render succeeds");

    let img = decode(&png);
    assert_eq!(img.dimensions(), (1080, 1080));

    // Above the band the background is untouched.
    assert_eq!(img.get_pixel(10, 10).0, [30, 30, 30]);
    assert_eq!(img.get_pixel(1070, 530).0, [30, 30, 30]);

    // Inside the band, away from text, the overlay darkens it.
    assert_eq!(img.get_pixel(5, 545).0, [9, 9, 9]);

    // Headline pixels land in the headline region of the band.
    let layout = c.layout(&slide.headline, &slide.copy).unwrap();
    let headline = &layout.blocks[0].region;
    assert!(white_pixels_in_rows(&img, headline.top, headline.bottom()) > 0);
    assert_eq!(white_pixels_in_rows(&img, 0, layout.overlay.top), 0);
}

#[test]
fn rendering_is_deterministic() {
    let c = composer(ComposerConfig::default());
    let slide = Slide::new("Key Finding", "Important research finding");
    let background = c.solid_background([30, 30, 30]);

    let first = c.render(&slide, &background).unwrap();
    let second = c.render(&slide, &background).unwrap();
    assert_eq!(first, second);
}

#[test]
fn long_body_falls_back_to_min_font_on_small_canvas() {
    let config = ComposerConfig::builder()
        .canvas(320, 320)
        .padding(20)
        .build()
        .unwrap();
    let c = composer(config);
    let body = "word ".repeat(100);
    assert_eq!(body.len(), 500);

    let layout = c.layout("Headline", &body).unwrap();
    assert_eq!(layout.body_font_size(), c.config().min_font);
    assert!(layout.blocks[1].block.overflow);

    let png = c
        .render(&Slide::new("Headline", body), &c.solid_background([30, 30, 30]))
        .unwrap();
    assert_eq!(decode(&png).dimensions(), (320, 320));
}

#[test]
fn photo_background_is_cropped_to_canvas() {
    let c = composer(ComposerConfig::default());
    let photo = image::DynamicImage::ImageRgb8(RgbImage::from_pixel(1600, 900, image::Rgb([200, 40, 40])));
    let png = c.render(&Slide::new("Wide", "photo"), &photo).unwrap();
    let img = decode(&png);
    assert_eq!(img.dimensions(), (1080, 1080));
    assert_eq!(img.get_pixel(10, 10).0, [200, 40, 40]);
}

#[test]
fn joint_layout_uses_bottom_third() {
    let c = composer(ComposerConfig::joint());
    let slide = Slide::new("Key Finding", "Important research finding");
    let img = decode(&c.render(&slide, &c.solid_background([30, 30, 30])).unwrap());

    assert_eq!(img.get_pixel(5, 715).0, [30, 30, 30]);
    assert_eq!(img.get_pixel(5, 725).0, [9, 9, 9]);
    assert!(white_pixels_in_rows(&img, 720, 1080) > 0);
}

// ── Carousel ─────────────────────────────────────────────────────────────────

#[test]
fn three_blocks_parse_into_three_slides() {
    let slides = parse_carousel(CAROUSEL);
    assert_eq!(slides.len(), 3);
    assert_eq!(slides[0].headline, "Sleep Sharpens Memory");
    assert_eq!(slides[1].copy, "120 adults were tracked for six weeks.");
    assert_eq!(slides[2].image_desc, "");
}

#[tokio::test]
async fn carousel_renders_every_slide() {
    let dir = tempfile::tempdir().unwrap();
    let slides = parse_carousel(CAROUSEL);
    let backgrounds = BackgroundSource::new(BackgroundChoice::Solid, 5);

    let report = render_carousel_with(
        &composer(ComposerConfig::default()),
        &backgrounds,
        &slides,
        dir.path(),
        &PipelineConfig::default(),
    )
    .await
    .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.slides.len(), 3);
    for (i, rendered) in report.slides.iter().enumerate() {
        assert_eq!(rendered.index, i + 1);
        assert_eq!(rendered.path, dir.path().join(format!("slide_{}.png", i + 1)));
        let img = image::open(&rendered.path).unwrap();
        assert_eq!(img.dimensions(), (1080, 1080));
    }
}
