//! Marketing copy: one LLM call per platform, all fed the same summary.

use crate::config::PipelineConfig;
use crate::error::SocialError;
use crate::output::TokenUsage;
use crate::pipeline::llm::{complete_with_retry, Completer, CompletionRequest};
use crate::pipeline::postprocess::clean_copy;
use crate::pipeline::summary::StructuredSummary;
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// The four pieces of copy derived from a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Podcast,
    Instagram,
    Twitter,
    Blog,
}

impl ContentKind {
    /// Generation order.
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Podcast,
        ContentKind::Instagram,
        ContentKind::Twitter,
        ContentKind::Blog,
    ];

    /// File the copy is written to inside the output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ContentKind::Podcast => "podcast_script.txt",
            ContentKind::Instagram => "instagram_carousel.txt",
            ContentKind::Twitter => "twitter_thread.txt",
            ContentKind::Blog => "blog_post.txt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Podcast => "podcast script",
            ContentKind::Instagram => "Instagram carousel copy",
            ContentKind::Twitter => "Twitter thread",
            ContentKind::Blog => "blog post",
        }
    }

    pub fn prompt(self, summary: &StructuredSummary) -> String {
        match self {
            ContentKind::Podcast => prompts::podcast_prompt(summary),
            ContentKind::Instagram => prompts::carousel_prompt(summary),
            ContentKind::Twitter => prompts::twitter_prompt(summary),
            ContentKind::Blog => prompts::blog_prompt(summary),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Podcast => "podcast",
            ContentKind::Instagram => "instagram",
            ContentKind::Twitter => "twitter",
            ContentKind::Blog => "blog",
        };
        f.write_str(name)
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "podcast" => Ok(ContentKind::Podcast),
            "instagram" | "carousel" => Ok(ContentKind::Instagram),
            "twitter" | "thread" => Ok(ContentKind::Twitter),
            "blog" => Ok(ContentKind::Blog),
            other => Err(format!(
                "unknown content kind '{other}' (expected podcast, instagram, twitter or blog)"
            )),
        }
    }
}

/// Generate and clean one piece of copy.
pub async fn generate_copy<C: Completer>(
    completer: &C,
    kind: ContentKind,
    summary: &StructuredSummary,
    config: &PipelineConfig,
) -> Result<(String, TokenUsage), SocialError> {
    info!("Generating {}...", kind.label());
    let user = kind.prompt(summary);
    let request = CompletionRequest {
        system: prompts::COPY_SYSTEM_PROMPT,
        user: &user,
        temperature: config.copy_temperature,
        max_tokens: config.copy_max_tokens,
    };
    let completion = complete_with_retry(completer, &kind.to_string(), &request, config).await?;
    Ok((clean_copy(&completion.content), TokenUsage::from(&completion)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::testing::ScriptedCompleter;

    #[test]
    fn file_names_are_fixed() {
        let names: Vec<_> = ContentKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            [
                "podcast_script.txt",
                "instagram_carousel.txt",
                "twitter_thread.txt",
                "blog_post.txt"
            ]
        );
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("Podcast".parse::<ContentKind>(), Ok(ContentKind::Podcast));
        assert_eq!("carousel".parse::<ContentKind>(), Ok(ContentKind::Instagram));
        assert_eq!(" thread ".parse::<ContentKind>(), Ok(ContentKind::Twitter));
        assert!("tiktok".parse::<ContentKind>().is_err());
        for kind in ContentKind::ALL {
            assert_eq!(kind.to_string().parse::<ContentKind>(), Ok(kind));
        }
    }

    #[tokio::test]
    async fn copy_is_cleaned_and_uses_copy_prompt() {
        let completer = ScriptedCompleter::new(vec![Ok("```\n1/ Sleep matters.  \n```")]);
        let summary = StructuredSummary {
            title: "Sleep".into(),
            ..Default::default()
        };
        let config = PipelineConfig::default();
        let (text, usage) = generate_copy(&completer, ContentKind::Twitter, &summary, &config)
            .await
            .unwrap();
        assert_eq!(text, "1/ Sleep matters.\n");
        assert!(usage.input_tokens > 0);

        let seen = completer.seen.lock().unwrap();
        assert_eq!(seen[0].0, "You are a helpful assistant.");
        assert!(seen[0].1.contains("8 tweets"));
    }
}
