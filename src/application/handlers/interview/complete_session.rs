//! CompleteSessionHandler - finalizes a session after all confirmations.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::application::generation::BoundedGenerator;
use crate::application::session_locks::SessionLocks;
use crate::domain::foundation::{Dimension, InterviewStatus, SessionId};
use crate::domain::interview::{
    prompts, ExtractedRating, InterviewError, InterviewSession, PainPoint, Sentiment,
    SessionSummary, Severity,
};
use crate::ports::{GenerationRequest, InterviewStore, MetricsSink};

/// Summary generation sees the full interview.
const SUMMARY_TRANSCRIPT_MESSAGES: usize = 100;

/// Command to complete a session.
#[derive(Debug, Clone)]
pub struct CompleteSessionCommand {
    pub session_id: SessionId,
}

/// Result of successful completion.
#[derive(Debug, Clone)]
pub struct CompleteSessionResult {
    pub session: InterviewSession,
    pub summary: SessionSummary,
    pub ratings: Vec<ExtractedRating>,
    /// `false` when the downstream hand-off failed and was absorbed.
    pub metrics_published: bool,
}

/// Handler for completing sessions.
pub struct CompleteSessionHandler {
    store: Arc<dyn InterviewStore>,
    generator: BoundedGenerator,
    metrics: Arc<dyn MetricsSink>,
    locks: Arc<SessionLocks>,
}

impl CompleteSessionHandler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        generator: BoundedGenerator,
        metrics: Arc<dyn MetricsSink>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            store,
            generator,
            metrics,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteSessionCommand,
    ) -> Result<CompleteSessionResult, InterviewError> {
        // Completion shares the turn lock so it cannot interleave with a
        // confirmation against the same session.
        let _turn_guard = self.locks.acquire(cmd.session_id).await;

        // 1. Load and gate on state
        let mut session = self
            .store
            .find_session(&cmd.session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(cmd.session_id))?;
        if session.status() != InterviewStatus::RatingConfirmation {
            return Err(InterviewError::invalid_state(format!(
                "cannot complete session while it is {}",
                session.status()
            )));
        }

        let ratings = self.store.list_ratings(&cmd.session_id).await?;
        let unconfirmed = ratings.iter().filter(|r| !r.is_confirmed()).count();
        if unconfirmed > 0 {
            return Err(InterviewError::RatingsOutstanding { unconfirmed });
        }

        // 2. Generate the summary; a stub stands in when generation fails
        let messages = self.store.list_messages(&cmd.session_id).await?;
        let summary = self.generate_summary(&cmd.session_id, &messages, &ratings).await;

        // Abandonment bypasses the turn lock, so the session may have been
        // closed while the summary was generating. Discard the late
        // completion if so.
        let current = self
            .store
            .find_session(&cmd.session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(cmd.session_id))?;
        if current.status().is_terminal() {
            return Err(InterviewError::SessionClosed(cmd.session_id));
        }

        // 3. Finalize and persist atomically
        session.complete()?;
        self.store.commit_completion(&session, &summary).await?;

        // 4. Hand confirmed scores downstream. A broken pipeline is logged,
        // never surfaced to the participant.
        let metrics_published = match self
            .metrics
            .publish_completion(cmd.session_id, &ratings)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    session_id = %cmd.session_id,
                    error = %err,
                    "metrics hand-off failed after completion"
                );
                false
            }
        };

        info!(
            session_id = %cmd.session_id,
            ratings = ratings.len(),
            metrics_published,
            "interview session completed"
        );

        Ok(CompleteSessionResult {
            session,
            summary,
            ratings,
            metrics_published,
        })
    }

    async fn generate_summary(
        &self,
        session_id: &SessionId,
        messages: &[crate::domain::interview::Message],
        ratings: &[ExtractedRating],
    ) -> SessionSummary {
        let transcript = prompts::format_transcript(messages, SUMMARY_TRANSCRIPT_MESSAGES);
        let rating_lines: Vec<(Dimension, f64, f64)> = ratings
            .iter()
            .map(|r| {
                (
                    r.dimension(),
                    r.effective_score().value(),
                    r.confidence().value(),
                )
            })
            .collect();
        let request = GenerationRequest::new(prompts::summary_prompt(&transcript, &rating_lines))
            .with_system_prompt(prompts::EXTRACTION_SYSTEM_PROMPT)
            .with_temperature(prompts::SUMMARY_TEMPERATURE)
            .with_schema_hint(r#"{"executive_summary": "...", "overall_sentiment": "neutral"}"#);

        match self.generator.generate_json(request).await {
            Ok(value) => Self::summary_from_value(*session_id, &value),
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    error = %err,
                    "summary generation failed, storing stub summary"
                );
                SessionSummary::unavailable_stub(*session_id)
            }
        }
    }

    /// Builds a summary from model output, tolerating missing fields.
    fn summary_from_value(session_id: SessionId, value: &Value) -> SessionSummary {
        let executive_summary = match value.get("executive_summary").and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => return SessionSummary::unavailable_stub(session_id),
        };

        let pain_points = value
            .get("key_pain_points")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let dimension: Dimension =
                            entry.get("dimension")?.as_str()?.parse().ok()?;
                        let description =
                            entry.get("description")?.as_str()?.to_string();
                        let severity = Severity::parse_lenient(
                            entry.get("severity").and_then(Value::as_str).unwrap_or(""),
                        );
                        Some(PainPoint {
                            dimension,
                            description,
                            severity,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let string_list = |key: &str| -> Vec<String> {
            value
                .get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        let overall_sentiment = Sentiment::parse_lenient(
            value
                .get("overall_sentiment")
                .and_then(Value::as_str)
                .unwrap_or(""),
        );

        let dimension_sentiments: BTreeMap<Dimension, Sentiment> = value
            .get("dimension_sentiments")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(key, sentiment)| {
                        let dimension: Dimension = key.parse().ok()?;
                        Some((
                            dimension,
                            Sentiment::parse_lenient(sentiment.as_str().unwrap_or("")),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        SessionSummary::new(
            session_id,
            executive_summary,
            pain_points,
            string_list("positive_aspects"),
            string_list("improvement_suggestions"),
            overall_sentiment,
            dimension_sentiments,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::generation::MockTextGenerator;
    use crate::adapters::metrics::RecordingMetricsSink;
    use crate::adapters::store::InMemoryInterviewStore;
    use crate::domain::foundation::SurveyId;
    use crate::domain::interview::{Message, SUMMARY_UNAVAILABLE};
    use serde_json::json;
    use std::time::Duration;

    async fn confirmed_session(store: &InMemoryInterviewStore) -> InterviewSession {
        let mut session = InterviewSession::new(SurveyId::new());
        let sequence = session.next_sequence();
        let opening = Message::assistant(*session.id(), "Welcome!", None, sequence);
        store.insert_session(&session, &opening).await.unwrap();

        session.begin().unwrap();
        for dimension in Dimension::ALL {
            session.observe_dimension(dimension);
        }
        session.enter_rating_confirmation().unwrap();

        let ratings: Vec<ExtractedRating> = Dimension::ALL
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let mut rating =
                    ExtractedRating::neutral(*session.id(), *d, "discussed", i as u32);
                rating.apply_confirmation(true, None);
                rating
            })
            .collect();
        store.commit_turn(&session, &[], &ratings).await.unwrap();
        session
    }

    fn handler(
        store: Arc<InMemoryInterviewStore>,
        mock: Arc<MockTextGenerator>,
        metrics: Arc<RecordingMetricsSink>,
    ) -> CompleteSessionHandler {
        CompleteSessionHandler::new(
            store,
            BoundedGenerator::new(mock, Duration::from_secs(30)),
            metrics,
            Arc::new(SessionLocks::new()),
        )
    }

    #[tokio::test]
    async fn completes_with_generated_summary_and_publishes_metrics() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let session = confirmed_session(&store).await;
        let mock = Arc::new(MockTextGenerator::new().with_json(json!({
            "executive_summary": "Moderate friction overall.",
            "key_pain_points": [
                {"dimension": "delay", "description": "Approvals crawl", "severity": "high"}
            ],
            "positive_aspects": ["Supportive team"],
            "improvement_suggestions": ["Streamline approvals"],
            "overall_sentiment": "neutral",
            "dimension_sentiments": {"delay": "negative"}
        })));
        let metrics = Arc::new(RecordingMetricsSink::new());

        let result = handler(store.clone(), mock, metrics.clone())
            .handle(CompleteSessionCommand {
                session_id: *session.id(),
            })
            .await
            .unwrap();

        assert_eq!(result.session.status(), InterviewStatus::Completed);
        assert!(result.session.completed_at().is_some());
        assert_eq!(
            result.summary.executive_summary(),
            "Moderate friction overall."
        );
        assert_eq!(result.summary.pain_points().len(), 1);
        assert_eq!(result.summary.pain_points()[0].severity, Severity::High);
        assert!(result.metrics_published);
        assert_eq!(metrics.published().len(), 1);

        let persisted = store.find_summary(session.id()).await.unwrap();
        assert!(persisted.is_some());
    }

    #[tokio::test]
    async fn unconfirmed_ratings_block_completion() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let mut session = InterviewSession::new(SurveyId::new());
        let sequence = session.next_sequence();
        let opening = Message::assistant(*session.id(), "Welcome!", None, sequence);
        store.insert_session(&session, &opening).await.unwrap();
        session.begin().unwrap();
        for dimension in Dimension::ALL {
            session.observe_dimension(dimension);
        }
        session.enter_rating_confirmation().unwrap();
        let ratings: Vec<ExtractedRating> = Dimension::ALL
            .iter()
            .enumerate()
            .map(|(i, d)| ExtractedRating::neutral(*session.id(), *d, "discussed", i as u32))
            .collect();
        store.commit_turn(&session, &[], &ratings).await.unwrap();

        let mock = Arc::new(MockTextGenerator::new());
        let metrics = Arc::new(RecordingMetricsSink::new());

        let result = handler(store, mock, metrics.clone())
            .handle(CompleteSessionCommand {
                session_id: *session.id(),
            })
            .await;

        assert!(matches!(
            result,
            Err(InterviewError::RatingsOutstanding { unconfirmed: 6 })
        ));
        assert!(metrics.published().is_empty());
    }

    #[tokio::test]
    async fn summary_outage_stores_the_stub_and_still_completes() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let session = confirmed_session(&store).await;
        let mock = Arc::new(MockTextGenerator::always_fail());
        let metrics = Arc::new(RecordingMetricsSink::new());

        let result = handler(store, mock, metrics)
            .handle(CompleteSessionCommand {
                session_id: *session.id(),
            })
            .await
            .unwrap();

        assert_eq!(result.session.status(), InterviewStatus::Completed);
        assert_eq!(result.summary.executive_summary(), SUMMARY_UNAVAILABLE);
    }

    #[tokio::test]
    async fn metrics_failure_does_not_fail_completion() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let session = confirmed_session(&store).await;
        let mock = Arc::new(MockTextGenerator::new());
        let metrics = Arc::new(RecordingMetricsSink::failing());

        let result = handler(store, mock, metrics)
            .handle(CompleteSessionCommand {
                session_id: *session.id(),
            })
            .await
            .unwrap();

        assert_eq!(result.session.status(), InterviewStatus::Completed);
        assert!(!result.metrics_published);
    }

    #[tokio::test]
    async fn summaries_are_generated_at_summary_temperature() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let session = confirmed_session(&store).await;
        let mock = Arc::new(MockTextGenerator::new());
        let metrics = Arc::new(RecordingMetricsSink::new());

        handler(store, mock.clone(), metrics)
            .handle(CompleteSessionCommand {
                session_id: *session.id(),
            })
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].temperature, Some(prompts::SUMMARY_TEMPERATURE));
    }

    #[tokio::test(start_paused = true)]
    async fn abandonment_during_the_summary_discards_the_completion() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let session = confirmed_session(&store).await;
        let mock =
            Arc::new(MockTextGenerator::new().with_latency(Duration::from_millis(300)));
        let metrics = Arc::new(RecordingMetricsSink::new());
        let h = Arc::new(handler(store.clone(), mock, metrics.clone()));

        let completion = {
            let h = h.clone();
            let session_id = *session.id();
            tokio::spawn(async move {
                h.handle(CompleteSessionCommand { session_id }).await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut current = store.find_session(session.id()).await.unwrap().unwrap();
        assert!(current.abandon());
        store.update_session(&current).await.unwrap();

        let result = completion.await.unwrap();
        assert!(matches!(result, Err(InterviewError::SessionClosed(_))));

        let found = store.find_session(session.id()).await.unwrap().unwrap();
        assert_eq!(found.status(), InterviewStatus::Abandoned);
        assert!(store.find_summary(session.id()).await.unwrap().is_none());
        assert!(metrics.published().is_empty());
    }

    #[tokio::test]
    async fn completion_outside_rating_stage_is_rejected() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let mut session = InterviewSession::new(SurveyId::new());
        let sequence = session.next_sequence();
        let opening = Message::assistant(*session.id(), "Welcome!", None, sequence);
        store.insert_session(&session, &opening).await.unwrap();
        let mock = Arc::new(MockTextGenerator::new());
        let metrics = Arc::new(RecordingMetricsSink::new());

        let result = handler(store, mock, metrics)
            .handle(CompleteSessionCommand {
                session_id: *session.id(),
            })
            .await;

        assert!(matches!(result, Err(InterviewError::InvalidState(_))));
    }
}
