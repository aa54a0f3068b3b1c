//! Lookup port for the surveys sessions belong to.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SurveyId};

/// What the orchestrator needs to know about a survey before admitting a
/// participant.
#[derive(Debug, Clone)]
pub struct SurveyContext {
    pub survey_id: SurveyId,
    pub accepting_responses: bool,
    pub occupation_name: Option<String>,
}

#[async_trait]
pub trait SurveyDirectory: Send + Sync {
    async fn find_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Option<SurveyContext>, DomainError>;
}
