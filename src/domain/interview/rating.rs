//! Ratings extracted from the interview transcript.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    Confidence, Dimension, RatingId, RawScore, SessionId, Timestamp,
};

/// Reasoning attached to neutral-default ratings for undiscussed dimensions.
pub const NOT_DISCUSSED_REASONING: &str = "Dimension not adequately discussed in conversation.";

/// Reasoning attached when extraction itself was unavailable.
pub const EXTRACTION_FAILED_REASONING: &str = "Unable to extract rating from conversation.";

/// One model-inferred rating for a (session, dimension) pair.
///
/// Created only once coverage is complete; the unique (session, dimension)
/// constraint is enforced by the store. Mutated only by the confirmation
/// step, never re-extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRating {
    id: RatingId,
    session_id: SessionId,
    dimension: Dimension,
    inferred_score: RawScore,
    confidence: Confidence,
    reasoning: String,
    user_confirmed: bool,
    user_adjusted_score: Option<RawScore>,
    /// Normalized 0-100 score derived from the effective raw score.
    final_score: f64,
    key_quotes: Vec<String>,
    summary_comment: Option<String>,
    /// Stable confirmation-ordering key (creation order within the session).
    position: u32,
    created_at: Timestamp,
}

impl ExtractedRating {
    /// Creates a rating from successful model extraction.
    #[allow(clippy::too_many_arguments)]
    pub fn inferred(
        session_id: SessionId,
        dimension: Dimension,
        score: RawScore,
        confidence: Confidence,
        reasoning: impl Into<String>,
        key_quotes: Vec<String>,
        summary_comment: Option<String>,
        position: u32,
    ) -> Self {
        Self {
            id: RatingId::new(),
            session_id,
            dimension,
            inferred_score: score,
            confidence,
            reasoning: reasoning.into(),
            user_confirmed: false,
            user_adjusted_score: None,
            final_score: score.normalize(),
            key_quotes,
            summary_comment,
            position,
            created_at: Timestamp::now(),
        }
    }

    /// Creates the neutral-default rating used when a dimension is missing
    /// from the extraction output or extraction failed entirely.
    pub fn neutral(
        session_id: SessionId,
        dimension: Dimension,
        reasoning: impl Into<String>,
        position: u32,
    ) -> Self {
        Self::inferred(
            session_id,
            dimension,
            RawScore::NEUTRAL,
            Confidence::LOW,
            reasoning,
            Vec::new(),
            None,
            position,
        )
    }

    /// Reconstitute a rating from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RatingId,
        session_id: SessionId,
        dimension: Dimension,
        inferred_score: RawScore,
        confidence: Confidence,
        reasoning: String,
        user_confirmed: bool,
        user_adjusted_score: Option<RawScore>,
        final_score: f64,
        key_quotes: Vec<String>,
        summary_comment: Option<String>,
        position: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            dimension,
            inferred_score,
            confidence,
            reasoning,
            user_confirmed,
            user_adjusted_score,
            final_score,
            key_quotes,
            summary_comment,
            position,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &RatingId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn inferred_score(&self) -> RawScore {
        self.inferred_score
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn is_confirmed(&self) -> bool {
        self.user_confirmed
    }

    pub fn user_adjusted_score(&self) -> Option<RawScore> {
        self.user_adjusted_score
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn key_quotes(&self) -> &[String] {
        &self.key_quotes
    }

    pub fn summary_comment(&self) -> Option<&str> {
        self.summary_comment.as_deref()
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// The raw score the final score is derived from: the user adjustment
    /// when one was recorded, else the inferred score.
    pub fn effective_score(&self) -> RawScore {
        self.user_adjusted_score.unwrap_or(self.inferred_score)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies the user's confirmation decision.
    ///
    /// If `confirmed` is false and an adjusted score was supplied, the
    /// adjustment is recorded and the final score recomputed from it;
    /// otherwise the final score is recomputed from the inferred score.
    /// Score range validation happens at the operation boundary, before
    /// this is called.
    pub fn apply_confirmation(&mut self, confirmed: bool, adjusted_score: Option<RawScore>) {
        self.user_confirmed = true;
        if !confirmed {
            if let Some(adjusted) = adjusted_score {
                self.user_adjusted_score = Some(adjusted);
            }
        }
        self.final_score = self.effective_score().normalize();
    }
}
