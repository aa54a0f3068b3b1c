//! Metrics sink adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::SessionId;
use crate::domain::interview::ExtractedRating;
use crate::ports::{MetricsError, MetricsSink};

/// Sink that records completions to the log only.
///
/// Stands in until the aggregation pipeline consumes completions directly.
#[derive(Default)]
pub struct LoggingMetricsSink;

impl LoggingMetricsSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsSink for LoggingMetricsSink {
    async fn publish_completion(
        &self,
        session_id: SessionId,
        ratings: &[ExtractedRating],
    ) -> Result<(), MetricsError> {
        for rating in ratings {
            info!(
                session_id = %session_id,
                dimension = %rating.dimension(),
                final_score = rating.final_score(),
                confirmed = rating.is_confirmed(),
                "session rating published"
            );
        }
        Ok(())
    }
}

/// Test sink that captures published payloads, optionally failing every call.
#[derive(Default)]
pub struct RecordingMetricsSink {
    published: Mutex<Vec<(SessionId, Vec<ExtractedRating>)>>,
    fail_publish: bool,
}

impl RecordingMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(SessionId, Vec<ExtractedRating>)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsSink for RecordingMetricsSink {
    async fn publish_completion(
        &self,
        session_id: SessionId,
        ratings: &[ExtractedRating],
    ) -> Result<(), MetricsError> {
        if self.fail_publish {
            return Err(MetricsError::Unavailable(
                "simulated pipeline outage".to_string(),
            ));
        }
        self.published
            .lock()
            .unwrap()
            .push((session_id, ratings.to_vec()));
        Ok(())
    }
}
