//! Text fitting: greedy word-wrap and font-size decay.
//!
//! [`fit_text_block`] walks font sizes downward from a maximum in fixed
//! steps, wrapping every text part at each size, and keeps the first size
//! whose stacked line height fits the region. The search is linear, so the
//! result depends only on the metric source and the inputs.

use super::glyphs::GlyphMetrics;

/// Wrap `text` into lines no wider than `max_width` at `size` px.
///
/// Words are appended greedily while `measure(line + " " + word)` fits. A
/// single word wider than `max_width` is kept whole on its own line.
/// Whitespace-only text yields no lines.
pub fn wrap(text: &str, metrics: &dyn GlyphMetrics, size: u32, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if metrics.measure(&candidate, size).width <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Bounds for one fitting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitBounds {
    pub max_width: u32,
    pub max_height: u32,
    pub max_font: u32,
    pub min_font: u32,
    pub step: u32,
    pub line_spacing: u32,
}

/// The outcome of fitting: one font size for every part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub font_size: u32,
    /// Wrapped lines, one vector per input part, in input order.
    pub lines: Vec<Vec<String>>,
    /// Total stacked height including spacing between lines.
    pub pixel_height: u32,
    /// True when even `min_font` did not fit and the block may clip.
    pub overflow: bool,
}

impl TextBlock {
    /// Total number of lines across all parts.
    pub fn line_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}

/// Stacked height of `lines` at `size`: every line plus spacing, minus the
/// trailing spacing. Zero lines have zero height.
pub fn block_height<'a>(
    lines: impl IntoIterator<Item = &'a String>,
    metrics: &dyn GlyphMetrics,
    size: u32,
    line_spacing: u32,
) -> u32 {
    let mut total = 0u32;
    let mut count = 0u32;
    for line in lines {
        total += metrics.measure(line, size).height + line_spacing;
        count += 1;
    }
    if count == 0 {
        0
    } else {
        total - line_spacing
    }
}

/// Choose the largest font size in `max_font, max_font - step, …` (not
/// below `min_font`) at which all `parts` fit in `bounds`.
///
/// When no size fits, the `min_font` layout is returned with `overflow` set.
pub fn fit_text_block(parts: &[&str], metrics: &dyn GlyphMetrics, bounds: &FitBounds) -> TextBlock {
    let attempt = |size: u32| -> (Vec<Vec<String>>, u32) {
        let lines: Vec<Vec<String>> = parts
            .iter()
            .map(|part| wrap(part, metrics, size, bounds.max_width))
            .collect();
        let height = block_height(lines.iter().flatten(), metrics, size, bounds.line_spacing);
        (lines, height)
    };

    let step = bounds.step.max(1);
    let mut size = bounds.max_font;
    while size >= bounds.min_font {
        let (lines, height) = attempt(size);
        if height <= bounds.max_height {
            return TextBlock {
                font_size: size,
                lines,
                pixel_height: height,
                overflow: false,
            };
        }
        match size.checked_sub(step) {
            Some(next) => size = next,
            None => break,
        }
    }

    let (lines, height) = attempt(bounds.min_font);
    TextBlock {
        font_size: bounds.min_font,
        lines,
        pixel_height: height,
        overflow: height > bounds.max_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::glyphs::TextExtent;

    /// Every char is `size / 2` px wide; line height equals `size`.
    struct HalfEm;

    impl GlyphMetrics for HalfEm {
        fn measure(&self, text: &str, size: u32) -> TextExtent {
            TextExtent {
                width: text.chars().count() as u32 * size / 2,
                height: size,
            }
        }
    }

    fn bounds(max_width: u32, max_height: u32) -> FitBounds {
        FitBounds {
            max_width,
            max_height,
            max_font: 40,
            min_font: 8,
            step: 4,
            line_spacing: 2,
        }
    }

    #[test]
    fn wrap_breaks_greedily() {
        // At size 10 each char is 5px; 50px holds 10 chars.
        let lines = wrap("the quick brown fox jumps", &HalfEm, 10, 50);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrap_keeps_long_word_whole() {
        let lines = wrap("a supercalifragilistic b", &HalfEm, 10, 30);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn wrap_empty_text_has_no_lines() {
        assert!(wrap("", &HalfEm, 10, 100).is_empty());
        assert!(wrap("   \n\t ", &HalfEm, 10, 100).is_empty());
    }

    #[test]
    fn wrapped_lines_respect_width() {
        let text = "Large language models can summarise dense scientific prose into short \
                    engaging copy for many social platforms at once";
        for width in [40, 75, 120, 333] {
            for line in wrap(text, &HalfEm, 12, width) {
                let w = HalfEm.measure(&line, 12).width;
                assert!(
                    w <= width || !line.contains(' '),
                    "line {line:?} is {w}px wide, limit {width}"
                );
            }
        }
    }

    #[test]
    fn block_height_drops_trailing_spacing() {
        let lines = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(block_height(&lines, &HalfEm, 10, 4), 3 * 10 + 2 * 4);
        assert_eq!(block_height(&Vec::<String>::new(), &HalfEm, 10, 4), 0);
    }

    #[test]
    fn fit_picks_max_when_it_fits() {
        let block = fit_text_block(&["hi"], &HalfEm, &bounds(1000, 1000));
        assert_eq!(block.font_size, 40);
        assert!(!block.overflow);
        assert_eq!(block.pixel_height, 40);
    }

    #[test]
    fn fit_steps_down_by_four() {
        // One line only fits when size <= 30; candidates are 40, 36, 32, 28.
        let block = fit_text_block(&["hi"], &HalfEm, &bounds(1000, 30));
        assert_eq!(block.font_size, 28);
        assert!(block.pixel_height <= 30);
    }

    #[test]
    fn fit_falls_back_to_min_with_overflow() {
        let text = "word ".repeat(200);
        let block = fit_text_block(&[text.as_str()], &HalfEm, &bounds(100, 20));
        assert_eq!(block.font_size, 8);
        assert!(block.overflow);
        assert!(block.pixel_height > 20);
    }

    #[test]
    fn fit_sums_all_parts() {
        let single = fit_text_block(&["alpha beta"], &HalfEm, &bounds(200, 60));
        let joint = fit_text_block(&["alpha beta", "gamma delta"], &HalfEm, &bounds(200, 60));
        assert!(joint.font_size <= single.font_size);
        assert_eq!(joint.lines.len(), 2);
        assert_eq!(joint.line_count(), joint.lines[0].len() + joint.lines[1].len());
    }

    #[test]
    fn fit_is_monotonic_in_height() {
        let text = "Researchers found that sleep improves memory consolidation in adults";
        let mut previous = 0;
        for h in (0..400).step_by(7) {
            let block = fit_text_block(&[text], &HalfEm, &bounds(180, h));
            assert!(
                block.font_size >= previous,
                "height {h}: size {} < {previous}",
                block.font_size
            );
            previous = block.font_size;
        }
    }

    #[test]
    fn empty_parts_fit_at_max() {
        let block = fit_text_block(&["", ""], &HalfEm, &bounds(100, 0));
        assert_eq!(block.font_size, 40);
        assert_eq!(block.line_count(), 0);
        assert_eq!(block.pixel_height, 0);
    }
}
