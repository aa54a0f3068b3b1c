//! SendMessageHandler - one conversational turn.
//!
//! A turn appends the participant's message, generates the assistant reply,
//! updates coverage, and, when the last dimension gets covered, extracts
//! ratings and moves the session into rating confirmation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::application::generation::BoundedGenerator;
use crate::application::rating_extraction::RatingExtractor;
use crate::application::session_locks::SessionLocks;
use crate::domain::foundation::{Dimension, InterviewStatus, SessionId};
use crate::domain::interview::{
    classify_dimension, prompts, InterviewError, InterviewSession, Message,
};
use crate::ports::{GenerationRequest, InterviewStore};

/// Conversational context window, in messages.
const CONTEXT_WINDOW_MESSAGES: usize = 10;

/// Command to record a participant message and produce the reply.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub session_id: SessionId,
    pub content: String,
}

/// The first rating awaiting confirmation, surfaced when the turn moved the
/// session into rating confirmation.
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    pub dimension: Dimension,
    pub inferred_score: f64,
    pub confidence: f64,
    pub reasoning: String,
}

/// Result of a successful turn.
#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub session: InterviewSession,
    pub user_message: Message,
    pub assistant_message: Message,
    /// Present only on the turn that completed coverage.
    pub wrap_up_message: Option<Message>,
    pub pending_confirmation: Option<PendingConfirmation>,
}

/// Handler for message turns.
pub struct SendMessageHandler {
    store: Arc<dyn InterviewStore>,
    generator: BoundedGenerator,
    extractor: RatingExtractor,
    locks: Arc<SessionLocks>,
}

impl SendMessageHandler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        generator: BoundedGenerator,
        extractor: RatingExtractor,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            store,
            generator,
            extractor,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendMessageCommand,
    ) -> Result<SendMessageResult, InterviewError> {
        if cmd.content.trim().is_empty() {
            return Err(InterviewError::validation(
                "content",
                "message content must not be empty",
            ));
        }

        // Turns for one session never interleave.
        let _turn_guard = self.locks.acquire(cmd.session_id).await;

        // 1. Load and validate
        let mut session = self
            .store
            .find_session(&cmd.session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(cmd.session_id))?;
        match session.status() {
            InterviewStatus::Started | InterviewStatus::InProgress => {}
            InterviewStatus::RatingConfirmation => {
                return Err(InterviewError::invalid_state(
                    "session is awaiting rating confirmation",
                ));
            }
            InterviewStatus::Completed | InterviewStatus::Abandoned => {
                return Err(InterviewError::SessionClosed(cmd.session_id));
            }
        }
        session.begin()?;

        // 2. Append the participant message
        let sequence = session.next_sequence();
        let user_message = Message::user(
            cmd.session_id,
            cmd.content.clone(),
            session.current_dimension(),
            sequence,
        );

        let mut transcript = self.store.list_messages(&cmd.session_id).await?;
        transcript.push(user_message.clone());

        // 3. Generate the assistant reply
        let context = prompts::format_transcript(&transcript, CONTEXT_WINDOW_MESSAGES);
        let request =
            GenerationRequest::new(prompts::response_prompt(&context, &session.coverage().covered()))
                .with_system_prompt(prompts::SYSTEM_PROMPT)
                .with_temperature(prompts::CONVERSATION_TEMPERATURE);
        let started = Instant::now();
        let (reply, usage) = match self.generator.generate(request).await {
            Ok(generated) => {
                let usage = (generated.tokens_input, generated.tokens_output);
                (generated.content, usage)
            }
            Err(err) => {
                warn!(
                    session_id = %cmd.session_id,
                    error = %err,
                    "reply generation failed, using fallback follow-up"
                );
                (prompts::FALLBACK_FOLLOW_UP.to_string(), (None, None))
            }
        };
        let latency_ms = started.elapsed().as_millis().min(u32::MAX as u128) as u32;

        // 4. Update coverage from this turn's content
        if let Some(dimension) = classify_dimension(&cmd.content, &reply) {
            session.observe_dimension(dimension);
        }

        let sequence = session.next_sequence();
        let assistant_message = Message::assistant(
            cmd.session_id,
            reply,
            session.current_dimension(),
            sequence,
        )
        .with_usage(usage.0, usage.1)
        .with_latency_ms(latency_ms);
        transcript.push(assistant_message.clone());
        session.add_usage(usage.0, usage.1);
        session.touch();

        // 5. Cross into rating confirmation on the turn that completed
        // coverage
        let (wrap_up_message, ratings) = if session.coverage().is_complete()
            && session.status() == InterviewStatus::InProgress
        {
            let ratings = self
                .extractor
                .extract(cmd.session_id, &transcript)
                .await;
            let wrap_up = self.generate_wrap_up(&mut session, &transcript).await;
            session.enter_rating_confirmation()?;
            info!(
                session_id = %cmd.session_id,
                ratings = ratings.len(),
                "coverage complete, session entered rating confirmation"
            );
            (Some(wrap_up), ratings)
        } else {
            (None, Vec::new())
        };

        // 6. Persist the whole turn atomically. Abandonment bypasses the
        // turn lock, so the session may have been closed during any of the
        // generator calls above. Re-check right before the commit and
        // discard the late turn if so.
        let current = self
            .store
            .find_session(&cmd.session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(cmd.session_id))?;
        if current.status() == InterviewStatus::Abandoned {
            return Err(InterviewError::SessionClosed(cmd.session_id));
        }

        let mut messages = vec![user_message.clone(), assistant_message.clone()];
        if let Some(wrap_up) = &wrap_up_message {
            messages.push(wrap_up.clone());
        }
        self.store
            .commit_turn(&session, &messages, &ratings)
            .await?;

        let pending_confirmation = ratings.first().map(|rating| PendingConfirmation {
            dimension: rating.dimension(),
            inferred_score: rating.inferred_score().value(),
            confidence: rating.confidence().value(),
            reasoning: rating.reasoning().to_string(),
        });

        Ok(SendMessageResult {
            session,
            user_message,
            assistant_message,
            wrap_up_message,
            pending_confirmation,
        })
    }

    async fn generate_wrap_up(
        &self,
        session: &mut InterviewSession,
        transcript: &[Message],
    ) -> Message {
        let context = prompts::format_transcript(transcript, CONTEXT_WINDOW_MESSAGES);
        let request = GenerationRequest::new(prompts::wrap_up_prompt(&context))
            .with_system_prompt(prompts::SYSTEM_PROMPT)
            .with_temperature(prompts::CONVERSATION_TEMPERATURE);
        let (content, usage) = match self.generator.generate(request).await {
            Ok(generated) => {
                let usage = (generated.tokens_input, generated.tokens_output);
                (generated.content, usage)
            }
            Err(err) => {
                warn!(
                    session_id = %session.id(),
                    error = %err,
                    "wrap-up generation failed, using fallback"
                );
                (prompts::FALLBACK_WRAP_UP.to_string(), (None, None))
            }
        };
        let sequence = session.next_sequence();
        session.add_usage(usage.0, usage.1);
        Message::assistant(*session.id(), content, None, sequence).with_usage(usage.0, usage.1)
    }
}
