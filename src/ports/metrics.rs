//! Downstream metrics hand-off port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::SessionId;
use crate::domain::interview::ExtractedRating;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics pipeline unavailable: {0}")]
    Unavailable(String),

    #[error("metrics pipeline rejected the payload: {0}")]
    Rejected(String),
}

/// Receives confirmed ratings from completed sessions.
///
/// Failures here are logged and swallowed by callers; a broken aggregation
/// pipeline must never block a participant from finishing.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn publish_completion(
        &self,
        session_id: SessionId,
        ratings: &[ExtractedRating],
    ) -> Result<(), MetricsError>;
}
