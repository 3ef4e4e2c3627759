//! Structured summary: one LLM call, JSON scraped out of the reply.
//!
//! Models are asked to answer with bare JSON but routinely wrap it in prose
//! or code fences, so the first `{` … last `}` span is taken and parsed.
//! Field shapes drift too (`"authors": "A. Smith"` vs a list), which the
//! string-or-list deserialisers absorb. Replies written as a Python dict
//! literal (single quotes, `None`) get a second, lenient pass. When nothing
//! parseable comes back the
//! summary is still returned, carrying `error` and the `raw_response`, so the
//! caller can save it and inspect what the model said.

use crate::config::PipelineConfig;
use crate::error::SocialError;
use crate::output::TokenUsage;
use crate::pipeline::extract::truncate_chars;
use crate::pipeline::llm::{complete_with_retry, Completer, CompletionRequest};
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Summary of one article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    #[serde(default, deserialize_with = "string_or_joined")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub main_findings: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub conclusions: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub notable_quotes: Vec<String>,
    /// Set when the reply could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The unparsed reply, kept alongside `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl StructuredSummary {
    fn failed(error: &str, raw: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            raw_response: Some(raw.to_string()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Pretty JSON, as embedded in the copy prompts and written to `.json`.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Column names and values for a single CSV row.
    fn csv_columns(&self) -> Vec<(&'static str, String)> {
        let mut cols = vec![
            ("title", self.title.clone()),
            ("authors", self.authors.join("; ")),
            ("main_findings", self.main_findings.join("; ")),
            ("key_points", self.key_points.join("; ")),
            ("conclusions", self.conclusions.join("; ")),
            ("notable_quotes", self.notable_quotes.join("; ")),
        ];
        if let Some(ref e) = self.error {
            cols.push(("error", e.clone()));
            cols.push(("raw_response", self.raw_response.clone().unwrap_or_default()));
        }
        cols
    }

    /// Header line plus one data row, CRLF-terminated.
    pub fn to_csv(&self) -> String {
        let cols = self.csv_columns();
        let header: Vec<String> = cols.iter().map(|(name, _)| csv_field(name)).collect();
        let row: Vec<String> = cols.iter().map(|(_, value)| csv_field(value)).collect();
        format!("{}\r\n{}\r\n", header.join(","), row.join(","))
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn value_to_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn string_or_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|v| !v.is_null())
            .map(value_to_text)
            .collect(),
        other => vec![value_to_text(other)],
    })
}

fn string_or_joined<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => value_to_text(other),
    })
}

static RE_JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Scrape the JSON object out of a model reply.
pub fn parse_summary_reply(reply: &str) -> StructuredSummary {
    let Some(m) = RE_JSON_OBJECT.find(reply) else {
        warn!("summary reply contains no JSON object");
        return StructuredSummary::failed("No JSON found in response.", reply);
    };
    let candidate = m.as_str();
    match serde_json::from_str::<StructuredSummary>(candidate) {
        Ok(summary) => summary,
        Err(e) => match serde_json::from_str(&python_literal_to_json(candidate)) {
            Ok(summary) => {
                debug!("summary parsed as a Python literal ({})", e);
                summary
            }
            Err(_) => {
                warn!("summary JSON did not parse: {}", e);
                StructuredSummary::failed("Could not parse JSON from response.", reply)
            }
        },
    }
}

/// Rewrite a Python dict literal as JSON.
///
/// Single- or double-quoted strings become JSON strings, `True`/`False`/
/// `None` become `true`/`false`/`null`, and trailing commas are dropped.
/// Everything else passes through for `serde_json` to judge.
fn python_literal_to_json(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let quote = c;
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => out.push_str("\\\\"),
                        },
                        _ if c == quote => break,
                        '"' => out.push_str("\\\""),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            ',' => {
                let next = chars.clone().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(',');
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&n) = chars.peek() {
                    if !(n.is_ascii_alphanumeric() || n == '_') {
                        break;
                    }
                    word.push(n);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
            }
            _ => out.push(c),
        }
    }
    out
}

/// Summarise cleaned article text.
///
/// Only the first `config.max_input_chars` characters are sent.
pub async fn summarize<C: Completer>(
    completer: &C,
    article: &str,
    config: &PipelineConfig,
) -> Result<(StructuredSummary, TokenUsage), SocialError> {
    let excerpt = truncate_chars(article, config.max_input_chars);
    if excerpt.len() < article.len() {
        info!(
            "Article truncated to {} of {} chars",
            config.max_input_chars,
            article.chars().count()
        );
    }

    let user = prompts::summary_user_prompt(excerpt);
    let request = CompletionRequest {
        system: prompts::SUMMARY_SYSTEM_PROMPT,
        user: &user,
        temperature: config.summary_temperature,
        max_tokens: config.summary_max_tokens,
    };
    let completion = complete_with_retry(completer, "summary", &request, config).await?;
    let summary = parse_summary_reply(&completion.content);
    Ok((summary, TokenUsage::from(&completion)))
}

/// Save a summary as `.json` (pretty) or `.csv` (header + one row).
pub fn save_summary(summary: &StructuredSummary, path: &Path) -> Result<(), SocialError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let body = match extension.as_deref() {
        Some("json") => serde_json::to_string_pretty(summary)?,
        Some("csv") => summary.to_csv(),
        _ => {
            return Err(SocialError::UnsupportedOutput {
                path: path.to_path_buf(),
            })
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SocialError::OutputWriteFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, body).map_err(|e| SocialError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Summary written to {}", path.display());
    Ok(())
}

/// Load a summary previously saved as JSON.
pub fn load_summary(path: &Path) -> Result<StructuredSummary, SocialError> {
    let text = std::fs::read_to_string(path).map_err(|e| SocialError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}
