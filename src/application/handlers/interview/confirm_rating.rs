//! ConfirmRatingHandler - participant confirmation of an inferred rating.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::generation::BoundedGenerator;
use crate::application::session_locks::SessionLocks;
use crate::domain::foundation::{Dimension, InterviewStatus, RawScore, SessionId};
use crate::domain::interview::{prompts, ExtractedRating, InterviewError, Message};
use crate::ports::{GenerationRequest, InterviewStore};

/// Command to confirm or adjust one inferred rating.
#[derive(Debug, Clone)]
pub struct ConfirmRatingCommand {
    pub session_id: SessionId,
    pub dimension: Dimension,
    /// `true` when the participant accepted the inferred score as-is.
    pub confirmed: bool,
    /// The participant's own score, when they adjusted.
    pub adjusted_score: Option<f64>,
}

/// Result of a rating confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmRatingResult {
    pub rating: ExtractedRating,
    /// Next dimension still awaiting confirmation, in confirmation order.
    pub next_dimension: Option<Dimension>,
    pub all_confirmed: bool,
    /// Acknowledgement or next confirmation prompt. Absent when the call was
    /// an idempotent replay.
    pub assistant_message: Option<Message>,
}

/// Handler for rating confirmations.
pub struct ConfirmRatingHandler {
    store: Arc<dyn InterviewStore>,
    generator: BoundedGenerator,
    locks: Arc<SessionLocks>,
}

impl ConfirmRatingHandler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        generator: BoundedGenerator,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            store,
            generator,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmRatingCommand,
    ) -> Result<ConfirmRatingResult, InterviewError> {
        // 1. Validate the adjustment before touching any state
        let adjusted_score = match cmd.adjusted_score {
            Some(value) => Some(RawScore::try_new(value)?),
            None => None,
        };

        // Confirmations share the turn lock: each one reads the session,
        // generates the next prompt, and writes back a sequence number.
        let _turn_guard = self.locks.acquire(cmd.session_id).await;

        let mut session = self
            .store
            .find_session(&cmd.session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(cmd.session_id))?;
        if session.status() != InterviewStatus::RatingConfirmation {
            return Err(InterviewError::invalid_state(format!(
                "cannot confirm ratings while session is {}",
                session.status()
            )));
        }

        let ratings = self.store.list_ratings(&cmd.session_id).await?;
        let rating = ratings
            .iter()
            .find(|r| r.dimension() == cmd.dimension)
            .cloned()
            .ok_or(InterviewError::RatingNotFound(cmd.session_id, cmd.dimension))?;

        // 2. Replays of an already-confirmed rating succeed without mutation
        if rating.is_confirmed() {
            let (next_dimension, all_confirmed) = Self::remaining(&ratings, cmd.dimension);
            return Ok(ConfirmRatingResult {
                rating,
                next_dimension,
                all_confirmed,
                assistant_message: None,
            });
        }

        let mut rating = rating;
        rating.apply_confirmation(cmd.confirmed, adjusted_score);

        let (next_dimension, all_confirmed) = Self::remaining(&ratings, cmd.dimension);

        // 3. Acknowledge, and prompt for the next dimension if one remains
        let assistant_message = match next_dimension {
            Some(dimension) => {
                let next = ratings
                    .iter()
                    .find(|r| r.dimension() == dimension)
                    .cloned()
                    .ok_or(InterviewError::RatingNotFound(cmd.session_id, dimension))?;
                Some(
                    self.confirmation_prompt(&mut session, &next)
                        .await
                        .as_rating_prompt(),
                )
            }
            None => None,
        };

        // Abandonment bypasses the turn lock, so the session may have been
        // closed during the generator call above. Discard the late
        // confirmation if so.
        let current = self
            .store
            .find_session(&cmd.session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(cmd.session_id))?;
        if current.status().is_terminal() {
            return Err(InterviewError::SessionClosed(cmd.session_id));
        }

        session.touch();
        self.store
            .commit_confirmation(&session, &rating, assistant_message.as_ref())
            .await?;

        info!(
            session_id = %cmd.session_id,
            dimension = %cmd.dimension,
            confirmed = cmd.confirmed,
            all_confirmed,
            "rating confirmation recorded"
        );

        Ok(ConfirmRatingResult {
            rating,
            next_dimension,
            all_confirmed,
            assistant_message,
        })
    }

    /// Next unconfirmed dimension after `just_confirmed`, by creation order.
    fn remaining(
        ratings: &[ExtractedRating],
        just_confirmed: Dimension,
    ) -> (Option<Dimension>, bool) {
        let mut pending: Vec<&ExtractedRating> = ratings
            .iter()
            .filter(|r| !r.is_confirmed() && r.dimension() != just_confirmed)
            .collect();
        pending.sort_by_key(|r| r.position());
        let next = pending.first().map(|r| r.dimension());
        (next, pending.is_empty())
    }

    async fn confirmation_prompt(
        &self,
        session: &mut crate::domain::interview::InterviewSession,
        rating: &ExtractedRating,
    ) -> Message {
        let request = GenerationRequest::new(prompts::rating_confirmation_prompt(
            rating.dimension(),
            rating.inferred_score().value(),
        ))
        .with_system_prompt(prompts::SYSTEM_PROMPT)
        .with_temperature(prompts::CONFIRMATION_TEMPERATURE);

        let (content, usage) = match self.generator.generate(request).await {
            Ok(generated) => {
                let usage = (generated.tokens_input, generated.tokens_output);
                (generated.content, usage)
            }
            Err(err) => {
                warn!(
                    session_id = %session.id(),
                    error = %err,
                    "confirmation prompt generation failed, using fallback"
                );
                (
                    prompts::fallback_confirmation(
                        rating.dimension(),
                        rating.inferred_score().value(),
                    ),
                    (None, None),
                )
            }
        };

        let sequence = session.next_sequence();
        session.add_usage(usage.0, usage.1);
        Message::assistant(*session.id(), content, Some(rating.dimension()), sequence)
            .with_usage(usage.0, usage.1)
    }
}
