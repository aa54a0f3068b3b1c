//! Timeout wrapper around the text generation port.
//!
//! Every generator call the handlers make goes through this wrapper, so a
//! hung provider turns into a `Timeout` error the caller can absorb with
//! fallback content instead of stalling the participant indefinitely.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::ports::{GeneratedText, GenerationError, GenerationRequest, TextGenerator};

/// A [`TextGenerator`] bounded by a wall-clock deadline per call.
#[derive(Clone)]
pub struct BoundedGenerator {
    inner: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl BoundedGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedText, GenerationError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::timeout(self.timeout.as_secs())),
        }
    }

    pub async fn generate_json(
        &self,
        request: GenerationRequest,
    ) -> Result<Value, GenerationError> {
        match tokio::time::timeout(self.timeout, self.inner.generate_json(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GeneratedText, GenerationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(GeneratedText::new("too late"))
        }

        async fn generate_json(
            &self,
            _request: GenerationRequest,
        ) -> Result<Value, GenerationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Value::Null)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_becomes_a_timeout_error() {
        let bounded = BoundedGenerator::new(Arc::new(SlowGenerator), Duration::from_secs(30));

        let result = bounded.generate(GenerationRequest::new("hello")).await;
        assert!(matches!(
            result,
            Err(GenerationError::Timeout { timeout_secs: 30 })
        ));

        let result = bounded.generate_json(GenerationRequest::new("hello")).await;
        assert!(matches!(result, Err(GenerationError::Timeout { .. })));
    }
}
