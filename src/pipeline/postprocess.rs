//! Post-processing: deterministic cleanup of LLM-generated copy.
//!
//! Even well-prompted models wrap replies in ` ``` ` fences, emit `\r\n`
//! line endings, pad paragraphs with runs of blank lines or sprinkle
//! zero-width characters through the text. These rules fix that without
//! touching the wording. Each rule is a pure `&str → String` pass.
//!
//! ## Rule Order
//!
//! Line endings are normalised before fence stripping (the fence regex
//! expects `\n`). Invisible characters go before whitespace trimming, since a
//! zero-width space is not whitespace and would shield the padding before it.
//! The final-newline pass always runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a raw LLM reply.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip outer code fences (any info string)
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 4. Trim trailing whitespace per line
/// 5. Collapse 2+ consecutive blank lines down to one
/// 6. Ensure the text ends with exactly one newline
pub fn clean_copy(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_code_fences(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\n(.*)\n```\s*$").unwrap());

pub(crate) fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 6: Ensure text ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}
