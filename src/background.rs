//! Slide backgrounds: where the photo behind each slide comes from.
//!
//! A source never fails a slide. Any problem (missing key, HTTP error,
//! undecodable image) is logged and `None` is returned, and the caller
//! paints the configured solid fallback instead.

use crate::carousel::Slide;
use crate::error::BackgroundError;
use crate::pipeline::encode::decode_base64_image;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Query used when a slide carries no image description.
pub const DEFAULT_QUERY: &str = "science";

const UNSPLASH_API: &str = "https://api.unsplash.com";
const OPENAI_API: &str = "https://api.openai.com/v1";
const IMAGE_MODEL: &str = "dall-e-3";
const IMAGE_SIZE: &str = "1024x1024";

/// Which background source a carousel uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundChoice {
    /// Plain fallback colour on every slide.
    #[default]
    Solid,
    /// Pre-generated images named `dalle_slide_{n}.png` in a directory.
    Directory(PathBuf),
    /// Random squarish Unsplash photo matching the image description.
    Unsplash,
    /// Image generated from the description by the OpenAI images API.
    Generated,
}

/// File name of the pre-generated image for 1-based slide `index`.
pub fn generated_file_name(index: usize) -> String {
    format!("dalle_slide_{index}.png")
}

/// Search query or generation prompt for a slide.
pub fn query_for(slide: &Slide) -> &str {
    let desc = slide.image_desc.trim();
    if desc.is_empty() {
        DEFAULT_QUERY
    } else {
        desc
    }
}

#[derive(Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Deserialize)]
struct UnsplashUrls {
    regular: String,
}

#[derive(Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    b64_json: Option<String>,
}

/// Fetches backgrounds for one [`BackgroundChoice`].
pub struct BackgroundSource {
    choice: BackgroundChoice,
    client: reqwest::Client,
    unsplash_key: Option<String>,
    openai_key: Option<String>,
}

impl BackgroundSource {
    /// Build a source, reading `UNSPLASH_ACCESS_KEY` / `OPENAI_API_KEY`
    /// from the environment.
    pub fn new(choice: BackgroundChoice, timeout_secs: u64) -> Self {
        let non_empty = |var: &str| std::env::var(var).ok().filter(|k| !k.trim().is_empty());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .unwrap_or_default();
        Self {
            choice,
            client,
            unsplash_key: non_empty("UNSPLASH_ACCESS_KEY"),
            openai_key: non_empty("OPENAI_API_KEY"),
        }
    }

    pub fn with_unsplash_key(mut self, key: impl Into<String>) -> Self {
        self.unsplash_key = Some(key.into());
        self
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_key = Some(key.into());
        self
    }

    pub fn choice(&self) -> &BackgroundChoice {
        &self.choice
    }

    /// Background for 1-based slide `index`, or `None` to use the fallback.
    pub async fn fetch(&self, index: usize, slide: &Slide) -> Option<DynamicImage> {
        let result = match &self.choice {
            BackgroundChoice::Solid => return None,
            BackgroundChoice::Directory(dir) => load_from_dir(dir, index),
            BackgroundChoice::Unsplash => self.fetch_unsplash(query_for(slide)).await,
            BackgroundChoice::Generated => self.generate(query_for(slide)).await,
        };
        match result {
            Ok(img) => {
                debug!("Slide {}: background {}x{}", index, img.width(), img.height());
                Some(img)
            }
            Err(e) => {
                warn!("Slide {}: no background ({}), using solid fill", index, e);
                None
            }
        }
    }

    async fn fetch_unsplash(&self, query: &str) -> Result<DynamicImage, BackgroundError> {
        let key = self
            .unsplash_key
            .as_deref()
            .ok_or(BackgroundError::MissingKey {
                var: "UNSPLASH_ACCESS_KEY",
            })?;
        info!("Fetching Unsplash photo for '{}'", query);

        let photo: UnsplashPhoto = self
            .client
            .get(format!("{UNSPLASH_API}/photos/random"))
            .query(&[
                ("query", query),
                ("orientation", "squarish"),
                ("client_id", key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let bytes = self
            .client
            .get(&photo.urls.regular)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(image::load_from_memory(&bytes)?)
    }

    async fn generate(&self, prompt: &str) -> Result<DynamicImage, BackgroundError> {
        let key = self
            .openai_key
            .as_deref()
            .ok_or(BackgroundError::MissingKey {
                var: "OPENAI_API_KEY",
            })?;
        info!("Generating background with {} for '{}'", IMAGE_MODEL, prompt);

        let body = serde_json::json!({
            "model": IMAGE_MODEL,
            "prompt": prompt,
            "size": IMAGE_SIZE,
            "quality": "standard",
            "n": 1,
            "response_format": "b64_json",
        });
        let response: GenerationResponse = self
            .client
            .post(format!("{OPENAI_API}/images/generations"))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let b64 = response
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or(BackgroundError::NoImageData)?;
        decode_base64_image(&b64)
    }
}

fn load_from_dir(dir: &Path, index: usize) -> Result<DynamicImage, BackgroundError> {
    let path = dir.join(generated_file_name(index));
    image::open(&path).map_err(|source| BackgroundError::File { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn slide() -> Slide {
        Slide::new("Headline", "Body")
    }

    #[test]
    fn empty_description_uses_default_query() {
        assert_eq!(query_for(&slide()), "science");
        assert_eq!(query_for(&slide().with_image_desc("  ")), "science");
        assert_eq!(query_for(&slide().with_image_desc("neurons firing")), "neurons firing");
    }

    #[test]
    fn generated_names_are_one_based() {
        assert_eq!(generated_file_name(1), "dalle_slide_1.png");
    }

    #[tokio::test]
    async fn solid_choice_has_no_image() {
        let source = BackgroundSource::new(BackgroundChoice::Solid, 5);
        assert!(source.fetch(1, &slide()).await.is_none());
    }

    #[tokio::test]
    async fn directory_source_loads_numbered_file() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(8, 6, Rgb([10, 200, 30]))
            .save(dir.path().join("dalle_slide_2.png"))
            .unwrap();
        let source = BackgroundSource::new(BackgroundChoice::Directory(dir.path().into()), 5);

        let img = source.fetch(2, &slide()).await.expect("file exists");
        assert_eq!((img.width(), img.height()), (8, 6));
        assert!(source.fetch(3, &slide()).await.is_none());
    }

    #[test]
    fn missing_directory_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_dir(dir.path(), 4).unwrap_err();
        match err {
            BackgroundError::File { path, .. } => {
                assert_eq!(path, dir.path().join("dalle_slide_4.png"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_keys_are_reported() {
        let mut source = BackgroundSource::new(BackgroundChoice::Unsplash, 5);
        source.unsplash_key = None;
        let err = source.fetch_unsplash("science").await.unwrap_err();
        assert!(matches!(
            err,
            BackgroundError::MissingKey {
                var: "UNSPLASH_ACCESS_KEY"
            }
        ));
    }

    #[tokio::test]
    async fn missing_keys_fall_back() {
        let mut source = BackgroundSource::new(BackgroundChoice::Unsplash, 5);
        source.unsplash_key = None;
        assert!(source.fetch(1, &slide()).await.is_none());

        let mut source = BackgroundSource::new(BackgroundChoice::Generated, 5);
        source.openai_key = None;
        assert!(source.fetch(1, &slide()).await.is_none());
    }
}
