//! Text generation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::generation::AnthropicConfig;

/// Text generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds, applied on top of the HTTP client timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retry attempts for transient provider failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl GenerationConfig {
    /// Get the call timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the provider configuration from these settings
    pub fn to_anthropic_config(&self) -> AnthropicConfig {
        AnthropicConfig::new(self.api_key.clone())
            .with_model(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries)
    }

    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("GENERATION__API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidGenerationTimeout);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidGenerationBaseUrl);
        }
        Ok(())
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}
