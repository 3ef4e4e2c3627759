//! Carousel parsing: tokenize LLM carousel copy into [`Slide`] records.
//!
//! The copy generator is asked for blocks like
//!
//! ```text
//! **Slide 1**
//! Headline: "Sleep Sharpens Memory"
//! *Copy:* A night of deep sleep consolidates what you learned.
//! *Image Description:* A person asleep surrounded by glowing notes.
//! ---
//! ```
//!
//! Model output drifts from that shape, so parsing is best-effort: a block
//! missing a marker yields an empty field for that slide instead of failing
//! the batch. This is a known lossy boundary; callers that need the exact
//! text should keep the raw carousel copy alongside the slides.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One carousel slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub headline: String,
    pub copy: String,
    /// Keyword or prompt for the background image; empty when the block had none.
    pub image_desc: String,
}

impl Slide {
    pub fn new(headline: impl Into<String>, copy: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            copy: copy.into(),
            image_desc: String::new(),
        }
    }

    pub fn with_image_desc(mut self, desc: impl Into<String>) -> Self {
        self.image_desc = desc.into();
        self
    }
}

static RE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{3,}").unwrap());
static RE_HEADLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"Headline:\**\s*"([^"]+)""#).unwrap());
// The value may sit on the line after the marker.
static RE_COPY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Copy:\**[ \t]*(?:\r?\n[ \t]*)?(.*)").unwrap());
static RE_IMAGE_DESC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Image Description:\**[ \t]*(?:\r?\n[ \t]*)?(.*)").unwrap());
static RE_MARKER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[*_\s]*(?:Headline|Copy|Image Description)\s*:").unwrap());

/// Split carousel copy on `---` rules and extract one [`Slide`] per
/// non-empty block.
pub fn parse_carousel(content: &str) -> Vec<Slide> {
    RE_SEPARATOR
        .split(content)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Slide {
    let capture = |re: &Regex| {
        re.captures(block)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|value| !RE_MARKER_LINE.is_match(value))
            .map(str::to_string)
            .unwrap_or_default()
    };
    Slide {
        headline: capture(&RE_HEADLINE),
        copy: capture(&RE_COPY),
        image_desc: capture(&RE_IMAGE_DESC),
    }
}
