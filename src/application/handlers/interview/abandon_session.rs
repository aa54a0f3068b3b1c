//! AbandonSessionHandler - marks a session abandoned.
//!
//! Deliberately does not take the per-session turn lock: abandonment is a
//! status-only write that must go through even while a turn is blocked on a
//! slow generator call. The turn path re-checks status after generating and
//! discards its reply when it finds the session abandoned.

use std::sync::Arc;

use tracing::info;

use crate::application::session_locks::SessionLocks;
use crate::domain::foundation::{InterviewStatus, SessionId};
use crate::domain::interview::InterviewError;
use crate::ports::InterviewStore;

/// Command to abandon a session.
#[derive(Debug, Clone)]
pub struct AbandonSessionCommand {
    pub session_id: SessionId,
}

/// Result of an abandon call.
#[derive(Debug, Clone)]
pub struct AbandonSessionResult {
    pub status: InterviewStatus,
    /// `false` when the session was already terminal and nothing changed.
    pub changed: bool,
}

/// Handler for abandoning sessions.
pub struct AbandonSessionHandler {
    store: Arc<dyn InterviewStore>,
    locks: Arc<SessionLocks>,
}

impl AbandonSessionHandler {
    pub fn new(store: Arc<dyn InterviewStore>, locks: Arc<SessionLocks>) -> Self {
        Self { store, locks }
    }

    /// Idempotent: abandoning a terminal session succeeds without mutation.
    pub async fn handle(
        &self,
        cmd: AbandonSessionCommand,
    ) -> Result<AbandonSessionResult, InterviewError> {
        let mut session = self
            .store
            .find_session(&cmd.session_id)
            .await?
            .ok_or(InterviewError::SessionNotFound(cmd.session_id))?;

        let changed = session.abandon();
        if changed {
            self.store.update_session(&session).await?;
            info!(session_id = %cmd.session_id, "interview session abandoned");
        }
        self.locks.release(&cmd.session_id);

        Ok(AbandonSessionResult {
            status: session.status(),
            changed,
        })
    }
}
