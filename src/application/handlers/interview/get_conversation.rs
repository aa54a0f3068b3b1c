//! GetConversationHandler - read-only view of a session.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::interview::{
    ExtractedRating, InterviewError, InterviewSession, Message, SessionSummary,
};
use crate::ports::InterviewStore;

/// Query for a session's conversation state.
#[derive(Debug, Clone)]
pub struct GetConversationQuery {
    /// Session id or the participant's anonymous token.
    pub lookup: SessionLookup,
}

#[derive(Debug, Clone)]
pub enum SessionLookup {
    ById(SessionId),
    ByToken(String),
}

/// Everything a client needs to render the conversation.
#[derive(Debug, Clone)]
pub struct GetConversationResult {
    pub session: InterviewSession,
    pub messages: Vec<Message>,
    pub ratings: Vec<ExtractedRating>,
    pub summary: Option<SessionSummary>,
}

/// Handler for conversation reads.
pub struct GetConversationHandler {
    store: Arc<dyn InterviewStore>,
}

impl GetConversationHandler {
    pub fn new(store: Arc<dyn InterviewStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: GetConversationQuery,
    ) -> Result<GetConversationResult, InterviewError> {
        let session = match &query.lookup {
            SessionLookup::ById(session_id) => self
                .store
                .find_session(session_id)
                .await?
                .ok_or(InterviewError::SessionNotFound(*session_id))?,
            SessionLookup::ByToken(token) => self
                .store
                .find_session_by_token(token)
                .await?
                .ok_or_else(|| InterviewError::TokenNotFound(token.clone()))?,
        };

        let session_id = *session.id();
        let messages = self.store.list_messages(&session_id).await?;
        let ratings = self.store.list_ratings(&session_id).await?;
        let summary = self.store.find_summary(&session_id).await?;

        Ok(GetConversationResult {
            session,
            messages,
            ratings,
            summary,
        })
    }
}
