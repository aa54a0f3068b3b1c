//! The final session summary artifact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Dimension, SessionId, SummaryId, Timestamp};

/// Executive summary text used when summary generation is unavailable.
pub const SUMMARY_UNAVAILABLE: &str = "Summary generation was unavailable for this session.";

/// Severity of a reported pain point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Parses a severity label, defaulting to `Medium` for unknown input.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "high" => Severity::High,
            _ => Severity::Medium,
        }
    }
}

/// Overall or per-dimension sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    /// Parses a sentiment label, defaulting to `Neutral` for unknown input.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

/// A concrete friction issue surfaced by the interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPoint {
    pub dimension: Dimension,
    pub description: String,
    pub severity: Severity,
}

/// Narrative summary of a completed interview session (1:1 with session).
///
/// Created exactly once, at completion, from the confirmed ratings and the
/// full transcript. Never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    id: SummaryId,
    session_id: SessionId,
    executive_summary: String,
    pain_points: Vec<PainPoint>,
    positive_aspects: Vec<String>,
    improvement_suggestions: Vec<String>,
    overall_sentiment: Sentiment,
    dimension_sentiments: BTreeMap<Dimension, Sentiment>,
    created_at: Timestamp,
}

impl SessionSummary {
    /// Creates a summary from generated content.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        executive_summary: impl Into<String>,
        pain_points: Vec<PainPoint>,
        positive_aspects: Vec<String>,
        improvement_suggestions: Vec<String>,
        overall_sentiment: Sentiment,
        dimension_sentiments: BTreeMap<Dimension, Sentiment>,
    ) -> Self {
        Self {
            id: SummaryId::new(),
            session_id,
            executive_summary: executive_summary.into(),
            pain_points,
            positive_aspects,
            improvement_suggestions,
            overall_sentiment,
            dimension_sentiments,
            created_at: Timestamp::now(),
        }
    }

    /// The deterministic stub used when summary generation fails.
    ///
    /// Completion must still succeed in that case.
    pub fn unavailable_stub(session_id: SessionId) -> Self {
        Self::new(
            session_id,
            SUMMARY_UNAVAILABLE,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Sentiment::Neutral,
            BTreeMap::new(),
        )
    }

    /// Reconstitute a summary from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SummaryId,
        session_id: SessionId,
        executive_summary: String,
        pain_points: Vec<PainPoint>,
        positive_aspects: Vec<String>,
        improvement_suggestions: Vec<String>,
        overall_sentiment: Sentiment,
        dimension_sentiments: BTreeMap<Dimension, Sentiment>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            executive_summary,
            pain_points,
            positive_aspects,
            improvement_suggestions,
            overall_sentiment,
            dimension_sentiments,
            created_at,
        }
    }

    pub fn id(&self) -> &SummaryId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn executive_summary(&self) -> &str {
        &self.executive_summary
    }

    pub fn pain_points(&self) -> &[PainPoint] {
        &self.pain_points
    }

    pub fn positive_aspects(&self) -> &[String] {
        &self.positive_aspects
    }

    pub fn improvement_suggestions(&self) -> &[String] {
        &self.improvement_suggestions
    }

    pub fn overall_sentiment(&self) -> Sentiment {
        self.overall_sentiment
    }

    pub fn dimension_sentiments(&self) -> &BTreeMap<Dimension, Sentiment> {
        &self.dimension_sentiments
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
