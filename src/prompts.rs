//! Prompts for the summary and marketing-copy LLM calls.
//!
//! Every prompt lives here so a wording change touches exactly one place and
//! tests can inspect the text without a live model.

use crate::pipeline::summary::StructuredSummary;

/// System prompt for the structured-summary call.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert scientific summarizer. \
Given the following scientific article text, produce a structured summary in JSON format \
with the following fields: 'title', 'authors', 'main_findings', 'key_points', 'conclusions', \
and 'notable_quotes'. Be concise and accurate. Respond only with the JSON.";

/// System message shared by every marketing-copy call.
pub const COPY_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// User message for the summary call; `article` is already truncated.
pub fn summary_user_prompt(article: &str) -> String {
    format!("Article Text:\n{article}\n\n")
}

fn with_summary(brief: &str, summary: &StructuredSummary, trailer: &str) -> String {
    format!(
        "{brief}\n\nSUMMARY:\n{}\n\n{trailer}:",
        summary.to_pretty_json()
    )
}

pub fn podcast_prompt(summary: &StructuredSummary) -> String {
    with_summary(
        "You are a creative podcast scriptwriter. Using the following scientific article \
summary, write a compelling podcast script for a 10-minute episode. Make it engaging, \
conversational, and informative. Include an intro, main discussion, and outro.",
        summary,
        "SCRIPT",
    )
}

/// Carousel prompt. The requested block shape is what
/// [`crate::carousel::parse_carousel`] tokenizes.
pub fn carousel_prompt(summary: &StructuredSummary) -> String {
    with_summary(
        "You are a social media strategist. Using the following scientific article summary, \
create copy for a 5-slide Instagram carousel. For each slide, provide a headline, 1-2 \
sentences of copy, and a description of an image that would accompany the slide.\n\
Format every slide exactly like this and separate slides with a line containing only ---:\n\
**Slide N**\n\
Headline: \"<headline>\"\n\
*Copy:* <copy>\n\
*Image Description:* <image description>",
        summary,
        "CAROUSEL",
    )
}

pub fn twitter_prompt(summary: &StructuredSummary) -> String {
    with_summary(
        "You are a science communicator on Twitter. Using the following scientific article \
summary, write a Twitter thread of 8 tweets. Make each tweet concise, engaging, and informative.",
        summary,
        "THREAD",
    )
}

pub fn blog_prompt(summary: &StructuredSummary) -> String {
    with_summary(
        "You are a science blogger. Using the following scientific article summary, write a \
1000-word blog post. Make it accessible, engaging, and well-structured, with an introduction, \
main body, and conclusion.",
        summary,
        "BLOG POST",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> StructuredSummary {
        StructuredSummary {
            title: "Sleep and Memory".into(),
            authors: vec!["A. Author".into()],
            ..Default::default()
        }
    }

    #[test]
    fn summary_prompt_names_all_fields() {
        for field in [
            "title",
            "authors",
            "main_findings",
            "key_points",
            "conclusions",
            "notable_quotes",
        ] {
            assert!(SUMMARY_SYSTEM_PROMPT.contains(field), "missing {field}");
        }
        assert!(SUMMARY_SYSTEM_PROMPT.contains("only with the JSON"));
    }

    #[test]
    fn user_prompt_wraps_article() {
        assert_eq!(summary_user_prompt("body"), "Article Text:\nbody\n\n");
    }

    #[test]
    fn copy_prompts_embed_summary_json() {
        let s = summary();
        for prompt in [podcast_prompt(&s), carousel_prompt(&s), twitter_prompt(&s), blog_prompt(&s)] {
            assert!(prompt.contains("SUMMARY:\n{"));
            assert!(prompt.contains("\"title\": \"Sleep and Memory\""));
        }
    }

    #[test]
    fn copy_prompts_carry_their_briefs() {
        let s = summary();
        assert!(podcast_prompt(&s).contains("10-minute episode"));
        assert!(podcast_prompt(&s).ends_with("SCRIPT:"));
        assert!(carousel_prompt(&s).contains("5-slide Instagram carousel"));
        assert!(carousel_prompt(&s).contains("Headline: \""));
        assert!(twitter_prompt(&s).contains("8 tweets"));
        assert!(blog_prompt(&s).contains("1000-word blog post"));
        assert!(blog_prompt(&s).ends_with("BLOG POST:"));
    }
}
