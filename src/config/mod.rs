//! Application configuration
//!
//! Configuration is loaded from environment variables with the `CANDOR`
//! prefix and `__` as the section separator, for example:
//!
//! ```text
//! CANDOR__DATABASE__URL=postgres://localhost/candor
//! CANDOR__DATABASE__MAX_CONNECTIONS=10
//! CANDOR__GENERATION__API_KEY=sk-ant-...
//! CANDOR__GENERATION__TIMEOUT_SECS=30
//! ```
//!
//! A `.env` file in the working directory is read first when present.

mod database;
mod error;
mod generation;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;

use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CANDOR")
                    .separator("__"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.generation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_covers_all_sections() {
        let config = AppConfig {
            database: DatabaseConfig {
                url: "postgres://localhost/candor".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 5,
                run_migrations: false,
            },
            generation: GenerationConfig {
                api_key: "test-key".to_string(),
                model: "claude-sonnet-4-20250514".to_string(),
                base_url: "https://api.anthropic.com".to_string(),
                timeout_secs: 30,
                max_retries: 2,
            },
        };
        assert!(config.validate().is_ok());

        let mut broken = config.clone();
        broken.database.url = String::new();
        assert!(broken.validate().is_err());

        let mut broken = config;
        broken.generation.timeout_secs = 0;
        assert!(broken.validate().is_err());
    }
}
