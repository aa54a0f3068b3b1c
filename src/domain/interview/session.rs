//! InterviewSession aggregate entity.
//!
//! The session owns the interview lifecycle: status transitions, dimension
//! coverage, message sequence assignment, and token accounting. All mutation
//! goes through aggregate methods so the state machine cannot be bypassed.
//!
//! # Ownership
//!
//! Sessions reference their messages, ratings, and summary by session id but
//! do NOT hold them; the orchestrator resolves those through the store per
//! operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{
    Dimension, DomainError, ErrorCode, InterviewStatus, SessionId, SurveyId, Timestamp,
};
use crate::domain::interview::DimensionCoverage;

/// Interview session aggregate.
///
/// # Invariants
///
/// - `status` only changes along the transitions defined by
///   [`InterviewStatus::can_transition_to`]
/// - `message_count` is the authoritative source of message sequence numbers
///   and never decreases
/// - coverage flags are monotone (false -> true only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    id: SessionId,
    survey_id: SurveyId,
    /// Opaque anonymous access token; the only credential a participant holds.
    anonymous_token: String,
    status: InterviewStatus,
    current_dimension: Option<Dimension>,
    coverage: DimensionCoverage,
    message_count: u32,
    total_tokens_input: u64,
    total_tokens_output: u64,
    started_at: Timestamp,
    last_activity_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl InterviewSession {
    /// Creates a new session in `Started` with a fresh anonymous token.
    pub fn new(survey_id: SurveyId) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            survey_id,
            anonymous_token: Uuid::new_v4().to_string(),
            status: InterviewStatus::Started,
            current_dimension: None,
            coverage: DimensionCoverage::new(),
            message_count: 0,
            total_tokens_input: 0,
            total_tokens_output: 0,
            started_at: now,
            last_activity_at: now,
            completed_at: None,
        }
    }

    /// Reconstitute a session from persistence (no validation, no transitions).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        survey_id: SurveyId,
        anonymous_token: String,
        status: InterviewStatus,
        current_dimension: Option<Dimension>,
        coverage: DimensionCoverage,
        message_count: u32,
        total_tokens_input: u64,
        total_tokens_output: u64,
        started_at: Timestamp,
        last_activity_at: Timestamp,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            survey_id,
            anonymous_token,
            status,
            current_dimension,
            coverage,
            message_count,
            total_tokens_input,
            total_tokens_output,
            started_at,
            last_activity_at,
            completed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn survey_id(&self) -> &SurveyId {
        &self.survey_id
    }

    pub fn anonymous_token(&self) -> &str {
        &self.anonymous_token
    }

    pub fn status(&self) -> InterviewStatus {
        self.status
    }

    pub fn current_dimension(&self) -> Option<Dimension> {
        self.current_dimension
    }

    pub fn coverage(&self) -> &DimensionCoverage {
        &self.coverage
    }

    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    pub fn total_tokens_input(&self) -> u64 {
        self.total_tokens_input
    }

    pub fn total_tokens_output(&self) -> u64 {
        self.total_tokens_output
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn last_activity_at(&self) -> &Timestamp {
        &self.last_activity_at
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates that the session can accept conversation turns.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is in a terminal or confirmation state
    pub fn ensure_accepts_messages(&self) -> Result<(), DomainError> {
        if self.status.accepts_messages() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::SessionClosed,
                format!("Session is {}, cannot send messages", self.status),
            ))
        }
    }

    /// Promotes `Started` to `InProgress` on the first user message.
    ///
    /// No-op when already `InProgress`.
    pub fn begin(&mut self) -> Result<(), DomainError> {
        match self.status {
            InterviewStatus::Started => {
                self.status = InterviewStatus::InProgress;
                Ok(())
            }
            InterviewStatus::InProgress => Ok(()),
            other => Err(DomainError::new(
                ErrorCode::SessionClosed,
                format!("Session is {}, cannot send messages", other),
            )),
        }
    }

    /// Allocates the next message sequence number.
    ///
    /// Sequences are session-local, contiguous, and never reused.
    pub fn next_sequence(&mut self) -> u32 {
        let seq = self.message_count;
        self.message_count += 1;
        seq
    }

    /// Records the dimension the latest turn addressed.
    ///
    /// Returns true if the dimension was newly covered.
    pub fn observe_dimension(&mut self, dimension: Dimension) -> bool {
        self.current_dimension = Some(dimension);
        self.coverage.mark_covered(dimension)
    }

    /// Adds generation token usage to the session totals.
    pub fn add_usage(&mut self, tokens_input: Option<u32>, tokens_output: Option<u32>) {
        self.total_tokens_input += u64::from(tokens_input.unwrap_or(0));
        self.total_tokens_output += u64::from(tokens_output.unwrap_or(0));
    }

    /// Updates the last-activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity_at = Timestamp::now();
    }

    /// Transitions `InProgress` -> `RatingConfirmation`.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless currently `InProgress` with
    ///   complete coverage
    pub fn enter_rating_confirmation(&mut self) -> Result<(), DomainError> {
        if !self
            .status
            .can_transition_to(&InterviewStatus::RatingConfirmation)
        {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot start rating confirmation from {}", self.status),
            ));
        }
        if !self.coverage.is_complete() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Cannot start rating confirmation before all dimensions are covered",
            ));
        }
        self.status = InterviewStatus::RatingConfirmation;
        self.touch();
        Ok(())
    }

    /// Transitions `RatingConfirmation` -> `Completed` and stamps completion.
    ///
    /// The caller is responsible for verifying that no ratings remain
    /// unconfirmed before invoking this.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless currently `RatingConfirmation`
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&InterviewStatus::Completed) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot complete session from {}", self.status),
            ));
        }
        self.status = InterviewStatus::Completed;
        let now = Timestamp::now();
        self.completed_at = Some(now);
        self.last_activity_at = now;
        Ok(())
    }

    /// Marks the session abandoned.
    ///
    /// Idempotent: returns true if the status changed, false if the session
    /// was already terminal.
    pub fn abandon(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = InterviewStatus::Abandoned;
        self.touch();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> InterviewSession {
        InterviewSession::new(SurveyId::new())
    }

    fn covered_session() -> InterviewSession {
        let mut session = test_session();
        session.begin().unwrap();
        for dim in Dimension::ALL {
            session.observe_dimension(dim);
        }
        session
    }

    // Construction tests

    #[test]
    fn new_session_is_started_with_empty_coverage() {
        let session = test_session();
        assert_eq!(session.status(), InterviewStatus::Started);
        assert!(session.current_dimension().is_none());
        assert!(!session.coverage().is_complete());
        assert_eq!(session.message_count(), 0);
        assert!(session.completed_at().is_none());
    }

    #[test]
    fn new_sessions_have_distinct_tokens() {
        let a = test_session();
        let b = test_session();
        assert_ne!(a.anonymous_token(), b.anonymous_token());
        assert!(!a.anonymous_token().is_empty());
    }

    // Sequence tests

    #[test]
    fn sequences_are_contiguous_from_zero() {
        let mut session = test_session();
        assert_eq!(session.next_sequence(), 0);
        assert_eq!(session.next_sequence(), 1);
        assert_eq!(session.next_sequence(), 2);
        assert_eq!(session.message_count(), 3);
    }

    // Transition tests

    #[test]
    fn begin_promotes_started_to_in_progress() {
        let mut session = test_session();
        session.begin().unwrap();
        assert_eq!(session.status(), InterviewStatus::InProgress);
        // Idempotent for in-progress sessions.
        session.begin().unwrap();
        assert_eq!(session.status(), InterviewStatus::InProgress);
    }

    #[test]
    fn begin_fails_on_terminal_session() {
        let mut session = test_session();
        session.abandon();
        assert!(session.begin().is_err());
    }

    #[test]
    fn observe_dimension_tracks_coverage_and_context() {
        let mut session = test_session();
        assert!(session.observe_dimension(Dimension::Tooling));
        assert!(!session.observe_dimension(Dimension::Tooling));
        assert_eq!(session.current_dimension(), Some(Dimension::Tooling));
        assert!(session.coverage().is_covered(Dimension::Tooling));
    }

    #[test]
    fn rating_confirmation_requires_full_coverage() {
        let mut session = test_session();
        session.begin().unwrap();
        assert!(session.enter_rating_confirmation().is_err());

        let mut session = covered_session();
        session.enter_rating_confirmation().unwrap();
        assert_eq!(session.status(), InterviewStatus::RatingConfirmation);
    }

    #[test]
    fn rating_confirmation_unreachable_from_started() {
        let mut session = test_session();
        for dim in Dimension::ALL {
            session.observe_dimension(dim);
        }
        assert!(session.enter_rating_confirmation().is_err());
    }

    #[test]
    fn complete_requires_rating_confirmation() {
        let mut session = covered_session();
        assert!(session.complete().is_err());

        session.enter_rating_confirmation().unwrap();
        session.complete().unwrap();
        assert_eq!(session.status(), InterviewStatus::Completed);
        assert!(session.completed_at().is_some());
    }

    #[test]
    fn abandon_is_idempotent() {
        let mut session = test_session();
        assert!(session.abandon());
        assert!(!session.abandon());
        assert_eq!(session.status(), InterviewStatus::Abandoned);
    }

    #[test]
    fn abandon_after_completion_is_a_noop() {
        let mut session = covered_session();
        session.enter_rating_confirmation().unwrap();
        session.complete().unwrap();
        assert!(!session.abandon());
        assert_eq!(session.status(), InterviewStatus::Completed);
    }

    #[test]
    fn ensure_accepts_messages_rejects_closed_states() {
        let mut session = covered_session();
        assert!(session.ensure_accepts_messages().is_ok());
        session.enter_rating_confirmation().unwrap();
        assert!(session.ensure_accepts_messages().is_err());
    }

    // Accounting tests

    #[test]
    fn usage_accumulates_across_turns() {
        let mut session = test_session();
        session.add_usage(Some(100), Some(40));
        session.add_usage(None, Some(10));
        assert_eq!(session.total_tokens_input(), 100);
        assert_eq!(session.total_tokens_output(), 50);
    }
}
