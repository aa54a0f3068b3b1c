//! Text generation port.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A single generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    /// Free-form hint describing the JSON shape expected back, for providers
    /// that support structured output.
    pub schema_hint: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: None,
            schema_hint: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_schema_hint(mut self, schema_hint: impl Into<String>) -> Self {
        self.schema_hint = Some(schema_hint.into());
        self
    }
}

/// Generated text plus whatever usage accounting the provider reported.
#[derive(Debug, Clone)]
pub struct GeneratedText {
    pub content: String,
    pub tokens_input: Option<u32>,
    pub tokens_output: Option<u32>,
}

impl GeneratedText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tokens_input: None,
            tokens_output: None,
        }
    }

    pub fn with_usage(mut self, tokens_input: u32, tokens_output: u32) -> Self {
        self.tokens_input = Some(tokens_input);
        self.tokens_output = Some(tokens_output);
        self
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("provider rate limited{}", retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("invalid provider response: {message}")]
    InvalidResponse { message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("authentication with provider failed")]
    AuthenticationFailed,
}

impl GenerationError {
    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Unavailable { .. } | Self::Network(_)
        )
    }
}

/// Abstraction over the conversational model backing the interviews.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates free-form text.
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedText, GenerationError>;

    /// Generates a response expected to parse as a single JSON value.
    async fn generate_json(&self, request: GenerationRequest) -> Result<Value, GenerationError>;
}
