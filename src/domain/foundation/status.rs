//! InterviewStatus enum for tracking lifecycle of interview sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an interview session.
///
/// Transitions are triggered only by orchestrator actions, never set
/// directly by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    /// Session created, opening message delivered, no user message yet.
    #[default]
    Started,
    /// Conversation in progress, coverage incomplete.
    InProgress,
    /// All dimensions covered, ratings extracted, awaiting confirmation.
    RatingConfirmation,
    /// All ratings confirmed and summary generated. Terminal.
    Completed,
    /// User exited before completion. Terminal.
    Abandoned,
}

impl InterviewStatus {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InterviewStatus::Completed | InterviewStatus::Abandoned)
    }

    /// Returns true if the session can accept conversation turns.
    pub fn accepts_messages(&self) -> bool {
        matches!(self, InterviewStatus::Started | InterviewStatus::InProgress)
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Started -> InProgress
    /// - InProgress -> RatingConfirmation
    /// - RatingConfirmation -> Completed
    /// - any non-terminal -> Abandoned
    pub fn can_transition_to(&self, target: &InterviewStatus) -> bool {
        use InterviewStatus::*;
        matches!(
            (self, target),
            (Started, InProgress)
                | (InProgress, RatingConfirmation)
                | (RatingConfirmation, Completed)
                | (Started, Abandoned)
                | (InProgress, Abandoned)
                | (RatingConfirmation, Abandoned)
        )
    }

    /// Returns the stable wire name (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Started => "started",
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::RatingConfirmation => "rating_confirmation",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_started() {
        assert_eq!(InterviewStatus::default(), InterviewStatus::Started);
    }

    #[test]
    fn terminal_states_are_completed_and_abandoned() {
        assert!(InterviewStatus::Completed.is_terminal());
        assert!(InterviewStatus::Abandoned.is_terminal());
        assert!(!InterviewStatus::Started.is_terminal());
        assert!(!InterviewStatus::InProgress.is_terminal());
        assert!(!InterviewStatus::RatingConfirmation.is_terminal());
    }

    #[test]
    fn only_started_and_in_progress_accept_messages() {
        assert!(InterviewStatus::Started.accepts_messages());
        assert!(InterviewStatus::InProgress.accepts_messages());
        assert!(!InterviewStatus::RatingConfirmation.accepts_messages());
        assert!(!InterviewStatus::Completed.accepts_messages());
        assert!(!InterviewStatus::Abandoned.accepts_messages());
    }

    #[test]
    fn forward_transitions_are_valid() {
        use InterviewStatus::*;
        assert!(Started.can_transition_to(&InProgress));
        assert!(InProgress.can_transition_to(&RatingConfirmation));
        assert!(RatingConfirmation.can_transition_to(&Completed));
    }

    #[test]
    fn any_non_terminal_can_abandon() {
        use InterviewStatus::*;
        assert!(Started.can_transition_to(&Abandoned));
        assert!(InProgress.can_transition_to(&Abandoned));
        assert!(RatingConfirmation.can_transition_to(&Abandoned));
        assert!(!Completed.can_transition_to(&Abandoned));
        assert!(!Abandoned.can_transition_to(&Abandoned));
    }

    #[test]
    fn skipping_states_is_invalid() {
        use InterviewStatus::*;
        assert!(!Started.can_transition_to(&RatingConfirmation));
        assert!(!Started.can_transition_to(&Completed));
        assert!(!InProgress.can_transition_to(&Completed));
        assert!(!Completed.can_transition_to(&Started));
    }
}
