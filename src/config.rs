//! Configuration types for the summarise → copy → carousel pipeline.
//!
//! Two structs carry every knob:
//!
//! * [`PipelineConfig`] — LLM provider, sampling, retries, input handling,
//!   background source and the embedded [`ComposerConfig`].
//! * [`ComposerConfig`] — the slide canvas: size, overlay band, padding,
//!   font-size search range, colours, brand mark and font files.
//!
//! Both are built through a builder that validates in `build()`, so a
//! composer is never handed a degenerate configuration.

use crate::background::BackgroundChoice;
use crate::error::SocialError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a full pipeline run.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_paper2social::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .model("gpt-4o")
///     .max_retries(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// LLM model identifier, e.g. "gpt-4o". If None, uses "gpt-4o".
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the summary call. Default: 0.2.
    ///
    /// The summary must be faithful to the article; low temperature keeps the
    /// model close to the text.
    pub summary_temperature: f32,

    /// Maximum tokens for the summary reply. Default: 1024.
    pub summary_max_tokens: usize,

    /// Sampling temperature for marketing copy. Default: 0.7.
    pub copy_temperature: f32,

    /// Maximum tokens per piece of marketing copy. Default: 1500.
    pub copy_max_tokens: usize,

    /// Article characters sent to the summariser. Default: 12 000.
    ///
    /// Longer articles are cut at a character boundary before prompting.
    pub max_input_chars: usize,

    /// Maximum retry attempts on a failed LLM call. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (doubles per attempt). Default: 500.
    pub retry_backoff_ms: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs and background fetches, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-LLM-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Where slide backgrounds come from. Default: solid colour.
    pub background: BackgroundChoice,

    /// Slide canvas configuration.
    pub composer: ComposerConfig,

    /// Optional per-slide progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            summary_temperature: 0.2,
            summary_max_tokens: 1024,
            copy_temperature: 0.7,
            copy_max_tokens: 1500,
            max_input_chars: 12_000,
            max_retries: 3,
            retry_backoff_ms: 500,
            password: None,
            download_timeout_secs: 120,
            api_timeout_secs: 60,
            background: BackgroundChoice::default(),
            composer: ComposerConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("summary_temperature", &self.summary_temperature)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("copy_temperature", &self.copy_temperature)
            .field("copy_max_tokens", &self.copy_max_tokens)
            .field("max_input_chars", &self.max_input_chars)
            .field("max_retries", &self.max_retries)
            .field("background", &self.background)
            .field("composer", &self.composer)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SlideProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn summary_temperature(mut self, t: f32) -> Self {
        self.config.summary_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn summary_max_tokens(mut self, n: usize) -> Self {
        self.config.summary_max_tokens = n;
        self
    }

    pub fn copy_temperature(mut self, t: f32) -> Self {
        self.config.copy_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn copy_max_tokens(mut self, n: usize) -> Self {
        self.config.copy_max_tokens = n;
        self
    }

    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.config.max_input_chars = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn background(mut self, choice: BackgroundChoice) -> Self {
        self.config.background = choice;
        self
    }

    pub fn composer(mut self, composer: ComposerConfig) -> Self {
        self.config.composer = composer;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, SocialError> {
        let c = &self.config;
        if c.max_input_chars == 0 {
            return Err(SocialError::InvalidConfig(
                "max_input_chars must be ≥ 1".into(),
            ));
        }
        if c.summary_max_tokens == 0 || c.copy_max_tokens == 0 {
            return Err(SocialError::InvalidConfig(
                "max token limits must be ≥ 1".into(),
            ));
        }
        c.composer.validate()?;
        Ok(self.config)
    }
}

// ── Composer configuration ───────────────────────────────────────────────

/// How the overlay text area is divided between headline and body.
///
/// The two policies are not mixed within a run: whichever one the
/// [`ComposerConfig`] carries is applied to every slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayoutPolicy {
    /// Headline and body are fitted independently. The headline gets
    /// `headline_fraction` of the text-area height, the body the rest.
    Split { headline_fraction: f32 },
    /// Headline lines followed by body lines, fitted as one block at a
    /// single font size.
    Joint,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        LayoutPolicy::Split {
            headline_fraction: 0.6,
        }
    }
}

/// Slide canvas configuration.
///
/// Defaults describe the split layout: a 1080×1080 canvas whose bottom half
/// is darkened, headline fitted between 180 px and 24 px in the upper 60 % of
/// the padded text area, body between 90 px and 24 px in the remaining 40 %.
/// [`ComposerConfig::joint()`] gives the compact bottom-third variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposerConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// RGBA colour of the overlay band.
    pub overlay_color: [u8; 4],
    /// Fraction of the canvas height covered by the band, measured from the bottom.
    pub overlay_fraction: f32,
    /// Inset of the text area inside the band, and of the brand mark from the corner.
    pub padding: u32,
    pub layout: LayoutPolicy,
    /// Largest headline size tried (also the joint-block maximum).
    pub headline_max_font: u32,
    /// Largest body size tried under [`LayoutPolicy::Split`].
    pub body_max_font: u32,
    pub min_font: u32,
    pub font_step: u32,
    pub line_spacing: u32,
    pub headline_color: [u8; 3],
    pub body_color: [u8; 3],
    pub brand_text: String,
    pub brand_color: [u8; 3],
    pub brand_font_size: u32,
    /// TrueType files tried in order; the built-in glyph set is used when none loads.
    pub font_paths: Vec<PathBuf>,
    /// Solid background used when no photo is available.
    pub fallback_background: [u8; 3],
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1080,
            canvas_height: 1080,
            overlay_color: [0, 0, 0, 180],
            overlay_fraction: 0.5,
            padding: 60,
            layout: LayoutPolicy::default(),
            headline_max_font: 180,
            body_max_font: 90,
            min_font: 24,
            font_step: 4,
            line_spacing: 10,
            headline_color: [255, 255, 255],
            body_color: [230, 230, 230],
            brand_text: "@yourbrand".to_string(),
            brand_color: [255, 221, 51],
            brand_font_size: 36,
            font_paths: default_font_paths(),
            fallback_background: [30, 30, 30],
        }
    }
}

/// Font files tried when the caller does not name one.
pub fn default_font_paths() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "DejaVuSans-Bold.ttf",
        "arialbd.ttf",
        "arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

impl ComposerConfig {
    /// Create a builder starting from the split-layout defaults.
    pub fn builder() -> ComposerConfigBuilder {
        ComposerConfigBuilder {
            config: Self::default(),
        }
    }

    /// The compact variant: bottom-third band, 20 px padding, headline and
    /// body fitted jointly from 200 px down, both in white.
    pub fn joint() -> Self {
        Self {
            overlay_fraction: 1.0 / 3.0,
            padding: 20,
            layout: LayoutPolicy::Joint,
            headline_max_font: 200,
            body_color: [255, 255, 255],
            ..Self::default()
        }
    }

    /// Check the ranges a composer relies on.
    ///
    /// Region sizes derived from these values are checked again at render
    /// time, since padding can still swallow a small band.
    pub fn validate(&self) -> Result<(), SocialError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(SocialError::InvalidConfig(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.overlay_fraction > 0.0 && self.overlay_fraction <= 1.0) {
            return Err(SocialError::InvalidConfig(format!(
                "overlay fraction must be in (0, 1], got {}",
                self.overlay_fraction
            )));
        }
        if let LayoutPolicy::Split { headline_fraction } = self.layout {
            if !(headline_fraction > 0.0 && headline_fraction < 1.0) {
                return Err(SocialError::InvalidConfig(format!(
                    "headline fraction must be in (0, 1), got {headline_fraction}"
                )));
            }
        }
        if self.min_font == 0 || self.font_step == 0 {
            return Err(SocialError::InvalidConfig(
                "min font size and font step must be ≥ 1".into(),
            ));
        }
        if self.min_font > self.headline_max_font || self.min_font > self.body_max_font {
            return Err(SocialError::InvalidConfig(format!(
                "min font size {} exceeds a maximum ({} / {})",
                self.min_font, self.headline_max_font, self.body_max_font
            )));
        }
        Ok(())
    }
}

/// Builder for [`ComposerConfig`].
#[derive(Debug)]
pub struct ComposerConfigBuilder {
    config: ComposerConfig,
}

impl ComposerConfigBuilder {
    pub fn canvas(mut self, width: u32, height: u32) -> Self {
        self.config.canvas_width = width;
        self.config.canvas_height = height;
        self
    }

    pub fn overlay_color(mut self, rgba: [u8; 4]) -> Self {
        self.config.overlay_color = rgba;
        self
    }

    pub fn overlay_fraction(mut self, fraction: f32) -> Self {
        self.config.overlay_fraction = fraction;
        self
    }

    pub fn padding(mut self, px: u32) -> Self {
        self.config.padding = px;
        self
    }

    pub fn layout(mut self, policy: LayoutPolicy) -> Self {
        self.config.layout = policy;
        self
    }

    pub fn font_range(mut self, headline_max: u32, body_max: u32, min: u32) -> Self {
        self.config.headline_max_font = headline_max;
        self.config.body_max_font = body_max;
        self.config.min_font = min;
        self
    }

    pub fn font_step(mut self, step: u32) -> Self {
        self.config.font_step = step;
        self
    }

    pub fn line_spacing(mut self, px: u32) -> Self {
        self.config.line_spacing = px;
        self
    }

    pub fn brand(mut self, text: impl Into<String>, color: [u8; 3], size: u32) -> Self {
        self.config.brand_text = text.into();
        self.config.brand_color = color;
        self.config.brand_font_size = size;
        self
    }

    /// Put `path` first in the font search list.
    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_paths.insert(0, path.into());
        self
    }

    /// Replace the font search list; an empty list forces the built-in glyphs.
    pub fn font_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.font_paths = paths;
        self
    }

    pub fn fallback_background(mut self, rgb: [u8; 3]) -> Self {
        self.config.fallback_background = rgb;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ComposerConfig, SocialError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
