//! StartSessionHandler - opens a session and generates the greeting.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::application::generation::BoundedGenerator;
use crate::domain::foundation::SurveyId;
use crate::domain::interview::{prompts, InterviewError, InterviewSession, Message};
use crate::ports::{GenerationRequest, InterviewStore, SurveyDirectory};

const DEFAULT_OCCUPATION: &str = "knowledge worker";

/// Command to start a new interview session.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub survey_id: SurveyId,
}

/// Result of successful session creation.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session: InterviewSession,
    pub opening_message: Message,
}

/// Handler for starting sessions.
pub struct StartSessionHandler {
    store: Arc<dyn InterviewStore>,
    surveys: Arc<dyn SurveyDirectory>,
    generator: BoundedGenerator,
}

impl StartSessionHandler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        surveys: Arc<dyn SurveyDirectory>,
        generator: BoundedGenerator,
    ) -> Self {
        Self {
            store,
            surveys,
            generator,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartSessionCommand,
    ) -> Result<StartSessionResult, InterviewError> {
        // 1. Validate the survey admits participants
        let survey = self
            .surveys
            .find_survey(&cmd.survey_id)
            .await?
            .ok_or(InterviewError::SurveyNotFound(cmd.survey_id))?;
        if !survey.accepting_responses {
            return Err(InterviewError::SurveyClosed(cmd.survey_id));
        }

        let occupation = survey
            .occupation_name
            .as_deref()
            .unwrap_or(DEFAULT_OCCUPATION);

        // 2. Create the aggregate and generate the opening message
        let mut session = InterviewSession::new(cmd.survey_id);

        let request = GenerationRequest::new(prompts::opening_prompt(occupation))
            .with_system_prompt(prompts::SYSTEM_PROMPT)
            .with_temperature(prompts::CONVERSATION_TEMPERATURE);
        let started = Instant::now();
        let (content, usage) = match self.generator.generate(request).await {
            Ok(generated) => {
                let usage = (generated.tokens_input, generated.tokens_output);
                (generated.content, usage)
            }
            Err(err) => {
                warn!(
                    session_id = %session.id(),
                    error = %err,
                    "opening generation failed, using fallback greeting"
                );
                (prompts::fallback_opening(occupation), (None, None))
            }
        };
        let latency_ms = started.elapsed().as_millis().min(u32::MAX as u128) as u32;

        let sequence = session.next_sequence();
        let opening = Message::assistant(*session.id(), content, None, sequence)
            .with_usage(usage.0, usage.1)
            .with_latency_ms(latency_ms);
        session.add_usage(usage.0, usage.1);

        // 3. Persist session and greeting atomically
        self.store.insert_session(&session, &opening).await?;

        info!(
            session_id = %session.id(),
            survey_id = %cmd.survey_id,
            "interview session started"
        );

        Ok(StartSessionResult {
            session,
            opening_message: opening,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::generation::MockTextGenerator;
    use crate::adapters::store::{InMemoryInterviewStore, InMemorySurveyDirectory};
    use crate::domain::foundation::InterviewStatus;
    use crate::ports::SurveyContext;
    use std::time::Duration;

    fn handler(
        store: Arc<InMemoryInterviewStore>,
        surveys: Arc<InMemorySurveyDirectory>,
        mock: Arc<MockTextGenerator>,
    ) -> StartSessionHandler {
        StartSessionHandler::new(
            store,
            surveys,
            BoundedGenerator::new(mock, Duration::from_secs(30)),
        )
    }

    fn open_survey(survey_id: SurveyId) -> SurveyContext {
        SurveyContext {
            survey_id,
            accepting_responses: true,
            occupation_name: Some("software engineer".to_string()),
        }
    }

    #[tokio::test]
    async fn starts_a_session_with_generated_greeting() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let surveys = Arc::new(InMemorySurveyDirectory::new());
        let survey_id = SurveyId::new();
        surveys.insert(open_survey(survey_id));
        let mock = Arc::new(MockTextGenerator::new().with_text("Welcome! Tell me about your day."));

        let result = handler(store.clone(), surveys, mock.clone())
            .handle(StartSessionCommand { survey_id })
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(
            requests[0].temperature,
            Some(prompts::CONVERSATION_TEMPERATURE)
        );

        assert_eq!(result.session.status(), InterviewStatus::Started);
        assert_eq!(result.opening_message.sequence(), 0);
        assert_eq!(
            result.opening_message.content(),
            "Welcome! Tell me about your day."
        );

        let persisted = store.find_session(result.session.id()).await.unwrap();
        assert!(persisted.is_some());
        let messages = store.list_messages(result.session.id()).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn unknown_survey_is_rejected() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let surveys = Arc::new(InMemorySurveyDirectory::new());
        let mock = Arc::new(MockTextGenerator::new());
        let survey_id = SurveyId::new();

        let result = handler(store, surveys, mock)
            .handle(StartSessionCommand { survey_id })
            .await;

        assert!(matches!(result, Err(InterviewError::SurveyNotFound(id)) if id == survey_id));
    }

    #[tokio::test]
    async fn closed_survey_is_rejected() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let surveys = Arc::new(InMemorySurveyDirectory::new());
        let survey_id = SurveyId::new();
        surveys.insert(SurveyContext {
            survey_id,
            accepting_responses: false,
            occupation_name: None,
        });
        let mock = Arc::new(MockTextGenerator::new());

        let result = handler(store, surveys, mock)
            .handle(StartSessionCommand { survey_id })
            .await;

        assert!(matches!(result, Err(InterviewError::SurveyClosed(id)) if id == survey_id));
    }

    #[tokio::test]
    async fn generator_outage_falls_back_to_deterministic_greeting() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let surveys = Arc::new(InMemorySurveyDirectory::new());
        let survey_id = SurveyId::new();
        surveys.insert(open_survey(survey_id));
        let mock = Arc::new(MockTextGenerator::always_fail());

        let result = handler(store, surveys, mock)
            .handle(StartSessionCommand { survey_id })
            .await
            .unwrap();

        assert!(result
            .opening_message
            .content()
            .contains("software engineer"));
    }

    #[tokio::test]
    async fn anonymous_tokens_are_unique_per_session() {
        let store = Arc::new(InMemoryInterviewStore::new());
        let surveys = Arc::new(InMemorySurveyDirectory::new());
        let survey_id = SurveyId::new();
        surveys.insert(open_survey(survey_id));
        let mock = Arc::new(MockTextGenerator::new());

        let h = handler(store, surveys, mock);
        let first = h.handle(StartSessionCommand { survey_id }).await.unwrap();
        let second = h.handle(StartSessionCommand { survey_id }).await.unwrap();

        assert_ne!(
            first.session.anonymous_token(),
            second.session.anonymous_token()
        );
    }
}
