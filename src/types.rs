// Completion-call value types and the crate error taxonomy

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

/// Raw completion result. `content` is `None` when the model produced no
/// message text (length cut-off, refusal); callers decide how to surface it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: Option<String>,
    pub finish_reason: String,
    pub refusal: Option<String>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("completion returned no content ({})", empty_completion_detail(.finish_reason, .refusal))]
    EmptyCompletion {
        finish_reason: String,
        refusal: Option<String>,
    },

    #[error("failed to parse completion JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{stage}: {source}")]
    Stage {
        stage: crate::models::PipelineStage,
        #[source]
        source: Box<AppError>,
    },
}

fn empty_completion_detail(finish_reason: &str, refusal: &Option<String>) -> String {
    match refusal.as_deref() {
        Some(r) if !r.is_empty() => {
            let truncated: String = r.chars().take(200).collect();
            format!("finish_reason={finish_reason} refusal={truncated}")
        }
        _ => format!("finish_reason={finish_reason}"),
    }
}

impl AppError {
    /// Tag an error with the pipeline stage it originated from.
    pub fn at_stage(self, stage: crate::models::PipelineStage) -> Self {
        AppError::Stage {
            stage,
            source: Box::new(self),
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
