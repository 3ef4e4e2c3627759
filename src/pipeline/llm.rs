//! LLM interaction: a narrow completion seam plus retry/backoff.
//!
//! Every LLM call in the pipeline is "system prompt + one user message →
//! text". [`Completer`] captures exactly that, so the summariser and copy
//! generator can be driven by a scripted fake in tests and by any
//! `edgequake_llm` provider in production.
//!
//! ## Retry Strategy
//!
//! Transient 429/5xx failures are retried with exponential backoff
//! (`retry_backoff_ms * 2^(attempt-1)`): 500 ms → 1 s → 2 s by default.

use crate::config::PipelineConfig;
use crate::error::SocialError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// One prompt/response exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// The text a model returned, with token accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Completion {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Anything that can answer a [`CompletionRequest`].
pub trait Completer: Send + Sync {
    fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> impl Future<Output = Result<Completion, String>> + Send;
}

impl Completer for Arc<dyn LLMProvider> {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<Completion, String> {
        let messages = vec![
            ChatMessage::system(request.system),
            ChatMessage::user(request.user),
        ];
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            ..Default::default()
        };
        let response = self
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| format!("{e}"))?;
        Ok(Completion {
            content: response.content,
            input_tokens: response.prompt_tokens as usize,
            output_tokens: response.completion_tokens as usize,
        })
    }
}

/// Delay before retry `attempt` (1-based): `base_ms * 2^(attempt-1)`,
/// saturating at `u64::MAX`.
fn backoff_ms(base_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}

/// Run `request` with per-call timeout and exponential-backoff retries.
///
/// `stage` only labels logs and the final error.
pub async fn complete_with_retry<C: Completer>(
    completer: &C,
    stage: &str,
    request: &CompletionRequest<'_>,
    config: &PipelineConfig,
) -> Result<Completion, SocialError> {
    let start = Instant::now();
    let call_timeout = Duration::from_secs(config.api_timeout_secs.max(1));
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "{}: retry {}/{} after {}ms",
                stage, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(call_timeout, completer.complete(request)).await {
            Ok(Ok(completion)) => {
                debug!(
                    "{}: {} input tokens, {} output tokens, {:?}",
                    stage,
                    completion.input_tokens,
                    completion.output_tokens,
                    start.elapsed()
                );
                return Ok(completion);
            }
            Ok(Err(e)) => {
                warn!("{}: attempt {} failed — {}", stage, attempt + 1, e);
                last_err = Some(e);
            }
            Err(_) => {
                let e = format!("timed out after {}s", call_timeout.as_secs());
                warn!("{}: attempt {} {}", stage, attempt + 1, e);
                last_err = Some(e);
            }
        }
    }

    Err(SocialError::LlmFailed {
        stage: stage.to_string(),
        retries: config.max_retries,
        detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SocialError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SocialError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. `config.provider` — used as-is.
/// 2. `config.provider_name` (+ `config.model`).
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set.
/// 4. OpenAI when `OPENAI_API_KEY` is present.
/// 5. `ProviderFactory::from_env()` auto-detection.
pub fn resolve_provider(config: &PipelineConfig) -> Result<Arc<dyn LLMProvider>, SocialError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| SocialError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted replies in order and records every request.
    #[derive(Default)]
    pub struct ScriptedCompleter {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedCompleter {
        pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Completer for ScriptedCompleter {
        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<Completion, String> {
            self.seen
                .lock()
                .unwrap()
                .push((request.system.to_string(), request.user.to_string()));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("script exhausted".to_string()))?;
            Ok(Completion {
                output_tokens: reply.split_whitespace().count(),
                input_tokens: request.user.split_whitespace().count(),
                content: reply,
            })
        }
    }
}
