//! Immutable conversation messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Dimension, MessageId, SessionId, Timestamp};

/// Role of a conversation message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System framing (not shown to the participant).
    System,
    /// The AI interviewer.
    Assistant,
    /// The participant.
    User,
}

impl MessageRole {
    /// Returns the stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::Assistant => "assistant",
            MessageRole::User => "user",
        }
    }
}

/// One immutable turn in an interview conversation.
///
/// Ordering within a session is authoritative via `sequence`, which the
/// orchestrator assigns contiguously from the session aggregate. Creation
/// timestamps are informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    session_id: SessionId,
    role: MessageRole,
    content: String,
    dimension_context: Option<Dimension>,
    is_rating_prompt: bool,
    sequence: u32,
    tokens_input: Option<u32>,
    tokens_output: Option<u32>,
    latency_ms: Option<u32>,
    created_at: Timestamp,
}

impl Message {
    /// Creates a user message.
    pub fn user(
        session_id: SessionId,
        content: impl Into<String>,
        dimension_context: Option<Dimension>,
        sequence: u32,
    ) -> Self {
        Self::new(
            session_id,
            MessageRole::User,
            content,
            dimension_context,
            sequence,
        )
    }

    /// Creates an assistant message.
    pub fn assistant(
        session_id: SessionId,
        content: impl Into<String>,
        dimension_context: Option<Dimension>,
        sequence: u32,
    ) -> Self {
        Self::new(
            session_id,
            MessageRole::Assistant,
            content,
            dimension_context,
            sequence,
        )
    }

    fn new(
        session_id: SessionId,
        role: MessageRole,
        content: impl Into<String>,
        dimension_context: Option<Dimension>,
        sequence: u32,
    ) -> Self {
        Self {
            id: MessageId::new(),
            session_id,
            role,
            content: content.into(),
            dimension_context,
            is_rating_prompt: false,
            sequence,
            tokens_input: None,
            tokens_output: None,
            latency_ms: None,
            created_at: Timestamp::now(),
        }
    }

    /// Attaches generation token usage.
    pub fn with_usage(mut self, tokens_input: Option<u32>, tokens_output: Option<u32>) -> Self {
        self.tokens_input = tokens_input;
        self.tokens_output = tokens_output;
        self
    }

    /// Attaches generation latency.
    pub fn with_latency_ms(mut self, latency_ms: u32) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    /// Marks this message as a rating-confirmation prompt.
    pub fn as_rating_prompt(mut self) -> Self {
        self.is_rating_prompt = true;
        self
    }

    /// Reconstitute a message from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: MessageId,
        session_id: SessionId,
        role: MessageRole,
        content: String,
        dimension_context: Option<Dimension>,
        is_rating_prompt: bool,
        sequence: u32,
        tokens_input: Option<u32>,
        tokens_output: Option<u32>,
        latency_ms: Option<u32>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            role,
            content,
            dimension_context,
            is_rating_prompt,
            sequence,
            tokens_input,
            tokens_output,
            latency_ms,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn dimension_context(&self) -> Option<Dimension> {
        self.dimension_context
    }

    pub fn is_rating_prompt(&self) -> bool {
        self.is_rating_prompt
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn tokens_input(&self) -> Option<u32> {
        self.tokens_input
    }

    pub fn tokens_output(&self) -> Option<u32> {
        self.tokens_output
    }

    pub fn latency_ms(&self) -> Option<u32> {
        self.latency_ms
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_carries_sequence_and_role() {
        let session_id = SessionId::new();
        let msg = Message::user(session_id, "hello", None, 3);
        assert_eq!(msg.role(), MessageRole::User);
        assert_eq!(msg.sequence(), 3);
        assert_eq!(msg.session_id(), &session_id);
        assert!(!msg.is_rating_prompt());
    }

    #[test]
    fn assistant_message_builder_attaches_metadata() {
        let msg = Message::assistant(SessionId::new(), "hi", Some(Dimension::Delay), 4)
            .with_usage(Some(120), Some(45))
            .with_latency_ms(800);

        assert_eq!(msg.dimension_context(), Some(Dimension::Delay));
        assert_eq!(msg.tokens_input(), Some(120));
        assert_eq!(msg.tokens_output(), Some(45));
        assert_eq!(msg.latency_ms(), Some(800));
    }

    #[test]
    fn rating_prompt_flag_is_settable() {
        let msg = Message::assistant(SessionId::new(), "does 4/5 feel right?", None, 9)
            .as_rating_prompt();
        assert!(msg.is_rating_prompt());
    }
}
