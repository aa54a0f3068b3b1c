//! Mock text generator for tests and local development.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{GeneratedText, GenerationError, GenerationRequest, TextGenerator};

enum QueuedReply {
    Text(String),
    Json(Value),
    Error(GenerationError),
}

/// Scripted [`TextGenerator`].
///
/// Replies are consumed in queue order. When the queue is empty, `generate`
/// returns a fixed placeholder and `generate_json` an empty object, so a test
/// only needs to script the calls it cares about. `always_fail` simulates a
/// full provider outage.
#[derive(Default)]
pub struct MockTextGenerator {
    queue: Mutex<VecDeque<QueuedReply>>,
    requests: Mutex<Vec<GenerationRequest>>,
    fail_all: bool,
    latency: Option<Duration>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose every call fails.
    pub fn always_fail() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(QueuedReply::Text(content.into()));
        self
    }

    pub fn with_json(self, value: Value) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(QueuedReply::Json(value));
        self
    }

    /// Every call sleeps for `latency` before replying. Lets a test observe
    /// what happens to the session while a generator call is in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_error(self, error: GenerationError) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(QueuedReply::Error(error));
        self
    }

    /// Requests seen so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    async fn record(&self, request: &GenerationRequest) -> Result<(), GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_all {
            return Err(GenerationError::unavailable("mock outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedText, GenerationError> {
        self.record(&request).await?;
        match self.queue.lock().unwrap().pop_front() {
            Some(QueuedReply::Text(content)) => Ok(GeneratedText::new(content).with_usage(40, 25)),
            Some(QueuedReply::Json(value)) => {
                Ok(GeneratedText::new(value.to_string()).with_usage(40, 25))
            }
            Some(QueuedReply::Error(error)) => Err(error),
            None => Ok(GeneratedText::new("Mock reply").with_usage(40, 25)),
        }
    }

    async fn generate_json(&self, request: GenerationRequest) -> Result<Value, GenerationError> {
        self.record(&request).await?;
        match self.queue.lock().unwrap().pop_front() {
            Some(QueuedReply::Json(value)) => Ok(value),
            Some(QueuedReply::Text(content)) => serde_json::from_str(&content)
                .map_err(|e| GenerationError::invalid_response(e.to_string())),
            Some(QueuedReply::Error(error)) => Err(error),
            None => Ok(Value::Object(serde_json::Map::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replies_come_back_in_queue_order() {
        let mock = MockTextGenerator::new()
            .with_text("first")
            .with_text("second");

        let a = mock.generate(GenerationRequest::new("q1")).await.unwrap();
        let b = mock.generate(GenerationRequest::new("q2")).await.unwrap();
        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_queue_falls_back_to_defaults() {
        let mock = MockTextGenerator::new();

        let text = mock.generate(GenerationRequest::new("q")).await.unwrap();
        assert_eq!(text.content, "Mock reply");

        let value = mock.generate_json(GenerationRequest::new("q")).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn always_fail_rejects_every_call() {
        let mock = MockTextGenerator::always_fail();
        assert!(mock.generate(GenerationRequest::new("q")).await.is_err());
        assert!(mock.generate_json(GenerationRequest::new("q")).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn scripted_error_is_returned_once() {
        let mock = MockTextGenerator::new()
            .with_error(GenerationError::timeout(30))
            .with_text("recovered");

        assert!(mock.generate(GenerationRequest::new("q")).await.is_err());
        let next = mock.generate(GenerationRequest::new("q")).await.unwrap();
        assert_eq!(next.content, "recovered");
    }
}
