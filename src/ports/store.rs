//! Persistence port for interview sessions and their artifacts.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::interview::{ExtractedRating, InterviewSession, Message, SessionSummary};

/// Storage for sessions, transcripts, ratings and summaries.
///
/// The `commit_*` methods persist a session mutation together with its side
/// artifacts in one atomic unit, so a crash can never leave a transcript
/// without its session update or ratings without their wrap-up message.
#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Persists a freshly created session together with its opening message.
    async fn insert_session(
        &self,
        session: &InterviewSession,
        opening: &Message,
    ) -> Result<(), DomainError>;

    async fn find_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<InterviewSession>, DomainError>;

    async fn find_session_by_token(
        &self,
        anonymous_token: &str,
    ) -> Result<Option<InterviewSession>, DomainError>;

    /// Persists one conversational turn: the updated session, its new
    /// messages, and any ratings produced when the turn crossed into
    /// rating confirmation.
    async fn commit_turn(
        &self,
        session: &InterviewSession,
        messages: &[Message],
        ratings: &[ExtractedRating],
    ) -> Result<(), DomainError>;

    /// Persists a confirmed rating together with the acknowledgement message,
    /// when one was produced.
    async fn commit_confirmation(
        &self,
        session: &InterviewSession,
        rating: &ExtractedRating,
        message: Option<&Message>,
    ) -> Result<(), DomainError>;

    /// Persists the completed session together with its summary.
    async fn commit_completion(
        &self,
        session: &InterviewSession,
        summary: &SessionSummary,
    ) -> Result<(), DomainError>;

    /// Rewrites session state alone. Used for status-only mutations such as
    /// abandonment.
    async fn update_session(&self, session: &InterviewSession) -> Result<(), DomainError>;

    /// Messages for a session in sequence order.
    async fn list_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError>;

    /// Ratings for a session in position order.
    async fn list_ratings(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ExtractedRating>, DomainError>;

    async fn find_summary(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionSummary>, DomainError>;
}
