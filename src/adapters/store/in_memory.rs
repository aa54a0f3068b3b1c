//! In-memory storage, used by tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, SurveyId};
use crate::domain::interview::{ExtractedRating, InterviewSession, Message, SessionSummary};
use crate::ports::{InterviewStore, SurveyContext, SurveyDirectory};

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, InterviewSession>,
    messages: HashMap<SessionId, Vec<Message>>,
    ratings: HashMap<SessionId, Vec<ExtractedRating>>,
    summaries: HashMap<SessionId, SessionSummary>,
}

impl Inner {
    /// A terminal status is never overwritten, so a commit carrying a stale
    /// snapshot cannot reopen an abandoned or completed session.
    fn put_session(&mut self, session: &InterviewSession) {
        match self.sessions.get(session.id()) {
            Some(existing) if existing.status().is_terminal() => {}
            _ => {
                self.sessions.insert(*session.id(), session.clone());
            }
        }
    }
}

/// Hash-map backed [`InterviewStore`].
#[derive(Default)]
pub struct InMemoryInterviewStore {
    inner: Mutex<Inner>,
}

impl InMemoryInterviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewStore for InMemoryInterviewStore {
    async fn insert_session(
        &self,
        session: &InterviewSession,
        opening: &Message,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(*session.id(), session.clone());
        inner
            .messages
            .entry(*session.id())
            .or_default()
            .push(opening.clone());
        Ok(())
    }

    async fn find_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<InterviewSession>, DomainError> {
        Ok(self.inner.lock().unwrap().sessions.get(session_id).cloned())
    }

    async fn find_session_by_token(
        &self,
        anonymous_token: &str,
    ) -> Result<Option<InterviewSession>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sessions
            .values()
            .find(|s| s.anonymous_token() == anonymous_token)
            .cloned())
    }

    async fn commit_turn(
        &self,
        session: &InterviewSession,
        messages: &[Message],
        ratings: &[ExtractedRating],
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.put_session(session);
        inner
            .messages
            .entry(*session.id())
            .or_default()
            .extend_from_slice(messages);
        inner
            .ratings
            .entry(*session.id())
            .or_default()
            .extend_from_slice(ratings);
        Ok(())
    }

    async fn commit_confirmation(
        &self,
        session: &InterviewSession,
        rating: &ExtractedRating,
        message: Option<&Message>,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.put_session(session);
        if let Some(stored) = inner
            .ratings
            .entry(*session.id())
            .or_default()
            .iter_mut()
            .find(|r| r.id() == rating.id())
        {
            *stored = rating.clone();
        }
        if let Some(message) = message {
            inner
                .messages
                .entry(*session.id())
                .or_default()
                .push(message.clone());
        }
        Ok(())
    }

    async fn commit_completion(
        &self,
        session: &InterviewSession,
        summary: &SessionSummary,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.put_session(session);
        inner.summaries.insert(*session.id(), summary.clone());
        Ok(())
    }

    async fn update_session(&self, session: &InterviewSession) -> Result<(), DomainError> {
        self.inner.lock().unwrap().put_session(session);
        Ok(())
    }

    async fn list_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let mut messages = self
            .inner
            .lock()
            .unwrap()
            .messages
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by_key(Message::sequence);
        Ok(messages)
    }

    async fn list_ratings(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ExtractedRating>, DomainError> {
        let mut ratings = self
            .inner
            .lock()
            .unwrap()
            .ratings
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        ratings.sort_by_key(ExtractedRating::position);
        Ok(ratings)
    }

    async fn find_summary(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionSummary>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .summaries
            .get(session_id)
            .cloned())
    }
}

/// Hash-map backed [`SurveyDirectory`].
#[derive(Default)]
pub struct InMemorySurveyDirectory {
    surveys: Mutex<HashMap<SurveyId, SurveyContext>>,
}

impl InMemorySurveyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, survey: SurveyContext) {
        self.surveys
            .lock()
            .unwrap()
            .insert(survey.survey_id, survey);
    }
}

#[async_trait]
impl SurveyDirectory for InMemorySurveyDirectory {
    async fn find_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Option<SurveyContext>, DomainError> {
        Ok(self.surveys.lock().unwrap().get(survey_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> InterviewSession {
        InterviewSession::new(SurveyId::new())
    }

    #[tokio::test]
    async fn insert_then_find_round_trips_the_session() {
        let store = InMemoryInterviewStore::new();
        let mut session = sample_session();
        let sequence = session.next_sequence();
        let opening = Message::assistant(*session.id(), "Hello!", None, sequence);

        store.insert_session(&session, &opening).await.unwrap();

        let found = store.find_session(session.id()).await.unwrap().unwrap();
        assert_eq!(found.id(), session.id());
        let by_token = store
            .find_session_by_token(session.anonymous_token())
            .await
            .unwrap();
        assert!(by_token.is_some());
    }

    #[tokio::test]
    async fn messages_come_back_in_sequence_order() {
        let store = InMemoryInterviewStore::new();
        let mut session = sample_session();
        let s0 = session.next_sequence();
        let opening = Message::assistant(*session.id(), "Hello!", None, s0);
        store.insert_session(&session, &opening).await.unwrap();

        let s1 = session.next_sequence();
        let s2 = session.next_sequence();
        // Committed out of order on purpose.
        let turn = vec![
            Message::assistant(*session.id(), "reply", None, s2),
            Message::user(*session.id(), "hi", None, s1),
        ];
        store.commit_turn(&session, &turn, &[]).await.unwrap();

        let messages = store.list_messages(session.id()).await.unwrap();
        let sequences: Vec<u32> = messages.iter().map(Message::sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn stale_snapshot_cannot_reopen_an_abandoned_session() {
        let store = InMemoryInterviewStore::new();
        let mut session = sample_session();
        let sequence = session.next_sequence();
        let opening = Message::assistant(*session.id(), "Hello!", None, sequence);
        store.insert_session(&session, &opening).await.unwrap();

        // A turn snapshots the session, then abandonment lands first.
        let stale = session.clone();
        session.abandon();
        store.update_session(&session).await.unwrap();

        store.commit_turn(&stale, &[], &[]).await.unwrap();
        store.update_session(&stale).await.unwrap();

        let found = store.find_session(session.id()).await.unwrap().unwrap();
        assert_eq!(
            found.status(),
            crate::domain::foundation::InterviewStatus::Abandoned
        );
    }

    #[tokio::test]
    async fn confirmation_rewrites_the_stored_rating() {
        let store = InMemoryInterviewStore::new();
        let mut session = sample_session();
        let sequence = session.next_sequence();
        let opening = Message::assistant(*session.id(), "Hello!", None, sequence);
        store.insert_session(&session, &opening).await.unwrap();

        let rating = ExtractedRating::neutral(
            *session.id(),
            crate::domain::foundation::Dimension::Clarity,
            "discussed",
            0,
        );
        store.commit_turn(&session, &[], &[rating.clone()]).await.unwrap();

        let mut confirmed = rating;
        confirmed.apply_confirmation(true, None);
        store
            .commit_confirmation(&session, &confirmed, None)
            .await
            .unwrap();

        let ratings = store.list_ratings(session.id()).await.unwrap();
        assert!(ratings[0].is_confirmed());
    }
}
