//! Interview-specific errors shared by the session handlers.

use crate::domain::foundation::{
    Dimension, DomainError, ErrorCode, SessionId, SurveyId, ValidationError,
};

/// Errors surfaced by interview operations.
#[derive(Debug, Clone, PartialEq)]
pub enum InterviewError {
    /// Survey was not found.
    SurveyNotFound(SurveyId),
    /// Survey exists but is no longer accepting responses.
    SurveyClosed(SurveyId),
    /// Session was not found.
    SessionNotFound(SessionId),
    /// No session matches the given anonymous token.
    TokenNotFound(String),
    /// Rating for the given dimension was not found on the session.
    RatingNotFound(SessionId, Dimension),
    /// Operation is not valid in the session's current status.
    InvalidState(String),
    /// Session is terminal and no longer accepts messages.
    SessionClosed(SessionId),
    /// Completion requested while ratings remain unconfirmed.
    RatingsOutstanding { unconfirmed: usize },
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl InterviewError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        InterviewError::InvalidState(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        InterviewError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        InterviewError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            InterviewError::SurveyNotFound(_) => ErrorCode::SurveyNotFound,
            InterviewError::SurveyClosed(_) => ErrorCode::SurveyClosed,
            InterviewError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            InterviewError::TokenNotFound(_) => ErrorCode::SessionNotFound,
            InterviewError::RatingNotFound(_, _) => ErrorCode::RatingNotFound,
            InterviewError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            InterviewError::SessionClosed(_) => ErrorCode::SessionClosed,
            InterviewError::RatingsOutstanding { .. } => ErrorCode::RatingsOutstanding,
            InterviewError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            InterviewError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            InterviewError::SurveyNotFound(id) => format!("Survey not found: {}", id),
            InterviewError::SurveyClosed(id) => {
                format!("Survey is not accepting responses: {}", id)
            }
            InterviewError::SessionNotFound(id) => format!("Session not found: {}", id),
            InterviewError::TokenNotFound(token) => {
                format!("No session for token: {}", token)
            }
            InterviewError::RatingNotFound(session_id, dimension) => format!(
                "No rating for dimension '{}' on session {}",
                dimension, session_id
            ),
            InterviewError::InvalidState(msg) => format!("Invalid state: {}", msg),
            InterviewError::SessionClosed(id) => {
                format!("Session no longer accepts messages: {}", id)
            }
            InterviewError::RatingsOutstanding { unconfirmed } => format!(
                "Cannot complete session with {} unconfirmed rating(s)",
                unconfirmed
            ),
            InterviewError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            InterviewError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for InterviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for InterviewError {}

impl From<DomainError> for InterviewError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SessionClosed | ErrorCode::InvalidStateTransition => {
                InterviewError::InvalidState(err.to_string())
            }
            ErrorCode::ValidationFailed | ErrorCode::OutOfRange => {
                InterviewError::ValidationFailed {
                    field: "unknown".to_string(),
                    message: err.to_string(),
                }
            }
            _ => InterviewError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for InterviewError {
    fn from(err: ValidationError) -> Self {
        InterviewError::ValidationFailed {
            field: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_error_codes() {
        let session_id = SessionId::new();
        assert_eq!(
            InterviewError::SessionNotFound(session_id).code(),
            ErrorCode::SessionNotFound
        );
        assert_eq!(
            InterviewError::RatingsOutstanding { unconfirmed: 3 }.code(),
            ErrorCode::RatingsOutstanding
        );
        assert_eq!(
            InterviewError::TokenNotFound("tok".to_string()).code(),
            ErrorCode::SessionNotFound
        );
        assert_eq!(
            InterviewError::infrastructure("db down").code(),
            ErrorCode::DatabaseError
        );
    }

    #[test]
    fn domain_error_conversion_preserves_validation() {
        let err = DomainError::validation("score", "score out of range");
        let converted: InterviewError = err.into();
        assert!(matches!(
            converted,
            InterviewError::ValidationFailed { .. }
        ));
    }

    #[test]
    fn display_includes_the_unconfirmed_count() {
        let err = InterviewError::RatingsOutstanding { unconfirmed: 2 };
        assert!(err.to_string().contains("2 unconfirmed"));
    }
}
