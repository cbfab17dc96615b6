use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Per-call knobs. Unset fields fall back to the pipeline-wide defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

// Some models only support the default temperature 1
const DEFAULT_TEMPERATURE: f32 = 1.0;
const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 4096;

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
}

impl LLM {
    pub fn new(config: &LLMConfig) -> AppResult<Self> {
        if config.openai_api_key.trim().is_empty() {
            return Err(AppError::Config(
                "OPENAI_API_KEY is not set; pack pipeline requires OpenAI.".to_string(),
            ));
        }
        let adapter = crate::llm::openai::OpenAIAdapter::with_base_url(
            &config.openai_api_key,
            &config.api_base,
        )?;
        Ok(Self {
            adapter: Box::new(adapter),
        })
    }

    /// Wrap a custom adapter (tests, alternative backends).
    pub fn with_adapter(adapter: Box<dyn LLMAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }

    /// Issue a system+user completion in JSON mode and parse the reply.
    ///
    /// A completion with no message text fails with `EmptyCompletion`
    /// (carrying the finish reason and any refusal text) rather than a parse
    /// error, so callers can tell refusals apart from malformed JSON.
    pub async fn chat_json<T: DeserializeOwned>(
        &self,
        model: &str,
        system_prompt: &str,
        user_message: &str,
        options: CompletionOptions,
    ) -> AppResult<T> {
        let request = LLMRequest {
            model: model.to_string(),
            messages: vec![
                crate::types::LLMMessage::system(system_prompt),
                crate::types::LLMMessage::user(user_message),
            ],
            max_tokens: Some(options.max_tokens.unwrap_or(DEFAULT_MAX_COMPLETION_TOKENS)),
            temperature: Some(options.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
        };

        let response = self.adapter.create_chat_completion(&request).await?;
        let content = response
            .content
            .as_deref()
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::EmptyCompletion {
                finish_reason: response.finish_reason.clone(),
                refusal: response.refusal.clone(),
            })?;

        Ok(serde_json::from_str(content)?)
    }
}
