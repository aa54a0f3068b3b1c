//! PostgreSQL implementations of the storage ports.
//!
//! The `commit_*` methods run in a transaction so a turn's session update,
//! messages and ratings land together or not at all.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::foundation::{
    Confidence, Dimension, DomainError, ErrorCode, InterviewStatus, MessageId, RatingId, RawScore,
    SessionId, SummaryId, SurveyId, Timestamp,
};
use crate::domain::interview::{
    DimensionCoverage, ExtractedRating, InterviewSession, Message, MessageRole, PainPoint,
    Sentiment, SessionSummary, Severity,
};
use crate::ports::{InterviewStore, SurveyContext, SurveyDirectory};

/// PostgreSQL implementation of [`InterviewStore`].
#[derive(Clone)]
pub struct PostgresInterviewStore {
    pool: PgPool,
}

impl PostgresInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_session(
        tx: &mut Transaction<'_, Postgres>,
        session: &InterviewSession,
    ) -> Result<(), DomainError> {
        let coverage = serde_json::to_value(session.coverage().to_map())
            .map_err(|e| db_err("serialize coverage", e))?;

        // The update arm refuses terminal rows, so a commit carrying a stale
        // snapshot cannot reopen an abandoned or completed session.
        sqlx::query(
            r#"
            INSERT INTO interview_sessions (
                id, survey_id, anonymous_token, status, current_dimension,
                coverage, message_count, total_tokens_input, total_tokens_output,
                started_at, last_activity_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                current_dimension = EXCLUDED.current_dimension,
                coverage = EXCLUDED.coverage,
                message_count = EXCLUDED.message_count,
                total_tokens_input = EXCLUDED.total_tokens_input,
                total_tokens_output = EXCLUDED.total_tokens_output,
                last_activity_at = EXCLUDED.last_activity_at,
                completed_at = EXCLUDED.completed_at
            WHERE interview_sessions.status NOT IN ('abandoned', 'completed')
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.survey_id().as_uuid())
        .bind(session.anonymous_token())
        .bind(session.status().as_str())
        .bind(session.current_dimension().map(|d| d.as_str()))
        .bind(coverage)
        .bind(session.message_count() as i32)
        .bind(session.total_tokens_input() as i64)
        .bind(session.total_tokens_output() as i64)
        .bind(session.started_at().as_datetime())
        .bind(session.last_activity_at().as_datetime())
        .bind(session.completed_at().map(Timestamp::as_datetime))
        .execute(&mut **tx)
        .await
        .map_err(|e| db_err("upsert session", e))?;

        Ok(())
    }

    async fn insert_message(
        tx: &mut Transaction<'_, Postgres>,
        message: &Message,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO interview_messages (
                id, session_id, role, content, dimension_context,
                is_rating_prompt, sequence, tokens_input, tokens_output,
                latency_ms, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.session_id().as_uuid())
        .bind(message.role().as_str())
        .bind(message.content())
        .bind(message.dimension_context().map(|d| d.as_str()))
        .bind(message.is_rating_prompt())
        .bind(message.sequence() as i32)
        .bind(message.tokens_input().map(|t| t as i32))
        .bind(message.tokens_output().map(|t| t as i32))
        .bind(message.latency_ms().map(|t| t as i32))
        .bind(message.created_at().as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(|e| db_err("insert message", e))?;

        Ok(())
    }

    async fn upsert_rating(
        tx: &mut Transaction<'_, Postgres>,
        rating: &ExtractedRating,
    ) -> Result<(), DomainError> {
        let key_quotes = serde_json::to_value(rating.key_quotes())
            .map_err(|e| db_err("serialize key quotes", e))?;

        sqlx::query(
            r#"
            INSERT INTO extracted_ratings (
                id, session_id, dimension, inferred_score, confidence,
                reasoning, user_confirmed, user_adjusted_score, final_score,
                key_quotes, summary_comment, ordinal, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (session_id, dimension) DO UPDATE SET
                user_confirmed = EXCLUDED.user_confirmed,
                user_adjusted_score = EXCLUDED.user_adjusted_score,
                final_score = EXCLUDED.final_score
            "#,
        )
        .bind(rating.id().as_uuid())
        .bind(rating.session_id().as_uuid())
        .bind(rating.dimension().as_str())
        .bind(rating.inferred_score().value())
        .bind(rating.confidence().value())
        .bind(rating.reasoning())
        .bind(rating.is_confirmed())
        .bind(rating.user_adjusted_score().map(|s| s.value()))
        .bind(rating.final_score())
        .bind(key_quotes)
        .bind(rating.summary_comment())
        .bind(rating.position() as i32)
        .bind(rating.created_at().as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(|e| db_err("upsert rating", e))?;

        Ok(())
    }
}

#[async_trait]
impl InterviewStore for PostgresInterviewStore {
    async fn insert_session(
        &self,
        session: &InterviewSession,
        opening: &Message,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("begin transaction", e))?;
        Self::upsert_session(&mut tx, session).await?;
        Self::insert_message(&mut tx, opening).await?;
        tx.commit().await.map_err(|e| db_err("commit", e))?;
        Ok(())
    }

    async fn find_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<InterviewSession>, DomainError> {
        let row = sqlx::query("SELECT * FROM interview_sessions WHERE id = $1")
            .bind(session_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("fetch session", e))?;

        row.map(row_to_session).transpose()
    }

    async fn find_session_by_token(
        &self,
        anonymous_token: &str,
    ) -> Result<Option<InterviewSession>, DomainError> {
        let row = sqlx::query("SELECT * FROM interview_sessions WHERE anonymous_token = $1")
            .bind(anonymous_token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("fetch session by token", e))?;

        row.map(row_to_session).transpose()
    }

    async fn commit_turn(
        &self,
        session: &InterviewSession,
        messages: &[Message],
        ratings: &[ExtractedRating],
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("begin transaction", e))?;
        Self::upsert_session(&mut tx, session).await?;
        for message in messages {
            Self::insert_message(&mut tx, message).await?;
        }
        for rating in ratings {
            Self::upsert_rating(&mut tx, rating).await?;
        }
        tx.commit().await.map_err(|e| db_err("commit", e))?;
        Ok(())
    }

    async fn commit_confirmation(
        &self,
        session: &InterviewSession,
        rating: &ExtractedRating,
        message: Option<&Message>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("begin transaction", e))?;
        Self::upsert_session(&mut tx, session).await?;
        Self::upsert_rating(&mut tx, rating).await?;
        if let Some(message) = message {
            Self::insert_message(&mut tx, message).await?;
        }
        tx.commit().await.map_err(|e| db_err("commit", e))?;
        Ok(())
    }

    async fn commit_completion(
        &self,
        session: &InterviewSession,
        summary: &SessionSummary,
    ) -> Result<(), DomainError> {
        let pain_points = serde_json::to_value(summary.pain_points())
            .map_err(|e| db_err("serialize pain points", e))?;
        let dimension_sentiments = serde_json::to_value(summary.dimension_sentiments())
            .map_err(|e| db_err("serialize dimension sentiments", e))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("begin transaction", e))?;
        Self::upsert_session(&mut tx, session).await?;
        sqlx::query(
            r#"
            INSERT INTO session_summaries (
                id, session_id, executive_summary, pain_points,
                positive_aspects, improvement_suggestions, overall_sentiment,
                dimension_sentiments, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(summary.id().as_uuid())
        .bind(summary.session_id().as_uuid())
        .bind(summary.executive_summary())
        .bind(pain_points)
        .bind(summary.positive_aspects())
        .bind(summary.improvement_suggestions())
        .bind(sentiment_to_str(summary.overall_sentiment()))
        .bind(dimension_sentiments)
        .bind(summary.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("insert summary", e))?;
        tx.commit().await.map_err(|e| db_err("commit", e))?;
        Ok(())
    }

    async fn update_session(&self, session: &InterviewSession) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("begin transaction", e))?;
        Self::upsert_session(&mut tx, session).await?;
        tx.commit().await.map_err(|e| db_err("commit", e))?;
        Ok(())
    }

    async fn list_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            "SELECT * FROM interview_messages WHERE session_id = $1 ORDER BY sequence",
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("fetch messages", e))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn list_ratings(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ExtractedRating>, DomainError> {
        let rows = sqlx::query(
            "SELECT * FROM extracted_ratings WHERE session_id = $1 ORDER BY ordinal",
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("fetch ratings", e))?;

        rows.into_iter().map(row_to_rating).collect()
    }

    async fn find_summary(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionSummary>, DomainError> {
        let row = sqlx::query("SELECT * FROM session_summaries WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("fetch summary", e))?;

        row.map(row_to_summary).transpose()
    }
}

/// PostgreSQL implementation of [`SurveyDirectory`].
#[derive(Clone)]
pub struct PostgresSurveyDirectory {
    pool: PgPool,
}

impl PostgresSurveyDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyDirectory for PostgresSurveyDirectory {
    async fn find_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Option<SurveyContext>, DomainError> {
        let row = sqlx::query(
            "SELECT id, accepting_responses, occupation_name FROM surveys WHERE id = $1",
        )
        .bind(survey_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("fetch survey", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: uuid::Uuid = row.try_get("id").map_err(|e| db_err("read id", e))?;
        let accepting_responses: bool = row
            .try_get("accepting_responses")
            .map_err(|e| db_err("read accepting_responses", e))?;
        let occupation_name: Option<String> = row
            .try_get("occupation_name")
            .map_err(|e| db_err("read occupation_name", e))?;

        Ok(Some(SurveyContext {
            survey_id: SurveyId::from_uuid(id),
            accepting_responses,
            occupation_name,
        }))
    }
}

// ─── row mapping ─────────────────────────────────────────────────────────────

fn db_err(context: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

fn str_to_status(s: &str) -> Result<InterviewStatus, DomainError> {
    match s {
        "started" => Ok(InterviewStatus::Started),
        "in_progress" => Ok(InterviewStatus::InProgress),
        "rating_confirmation" => Ok(InterviewStatus::RatingConfirmation),
        "completed" => Ok(InterviewStatus::Completed),
        "abandoned" => Ok(InterviewStatus::Abandoned),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid session status: {}", s),
        )),
    }
}

fn str_to_role(s: &str) -> Result<MessageRole, DomainError> {
    match s {
        "system" => Ok(MessageRole::System),
        "assistant" => Ok(MessageRole::Assistant),
        "user" => Ok(MessageRole::User),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid message role: {}", s),
        )),
    }
}

fn sentiment_to_str(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "positive",
        Sentiment::Neutral => "neutral",
        Sentiment::Negative => "negative",
    }
}

fn parse_dimension(s: &str) -> Result<Dimension, DomainError> {
    s.parse()
        .map_err(|_| db_err("parse dimension", format!("invalid dimension: {}", s)))
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<InterviewSession, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_err("read id", e))?;
    let survey_id: uuid::Uuid = row
        .try_get("survey_id")
        .map_err(|e| db_err("read survey_id", e))?;
    let anonymous_token: String = row
        .try_get("anonymous_token")
        .map_err(|e| db_err("read anonymous_token", e))?;
    let status_str: String = row.try_get("status").map_err(|e| db_err("read status", e))?;
    let current_dimension: Option<String> = row
        .try_get("current_dimension")
        .map_err(|e| db_err("read current_dimension", e))?;
    let coverage_value: serde_json::Value = row
        .try_get("coverage")
        .map_err(|e| db_err("read coverage", e))?;
    let coverage_map: BTreeMap<Dimension, bool> = serde_json::from_value(coverage_value)
        .map_err(|e| db_err("parse coverage", e))?;
    let message_count: i32 = row
        .try_get("message_count")
        .map_err(|e| db_err("read message_count", e))?;
    let total_tokens_input: i64 = row
        .try_get("total_tokens_input")
        .map_err(|e| db_err("read total_tokens_input", e))?;
    let total_tokens_output: i64 = row
        .try_get("total_tokens_output")
        .map_err(|e| db_err("read total_tokens_output", e))?;
    let started_at: chrono::DateTime<chrono::Utc> = row
        .try_get("started_at")
        .map_err(|e| db_err("read started_at", e))?;
    let last_activity_at: chrono::DateTime<chrono::Utc> = row
        .try_get("last_activity_at")
        .map_err(|e| db_err("read last_activity_at", e))?;
    let completed_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("completed_at")
        .map_err(|e| db_err("read completed_at", e))?;

    Ok(InterviewSession::reconstitute(
        SessionId::from_uuid(id),
        SurveyId::from_uuid(survey_id),
        anonymous_token,
        str_to_status(&status_str)?,
        current_dimension.as_deref().map(parse_dimension).transpose()?,
        DimensionCoverage::from_map(&coverage_map),
        message_count as u32,
        total_tokens_input as u64,
        total_tokens_output as u64,
        Timestamp::from_datetime(started_at),
        Timestamp::from_datetime(last_activity_at),
        completed_at.map(Timestamp::from_datetime),
    ))
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<Message, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_err("read id", e))?;
    let session_id: uuid::Uuid = row
        .try_get("session_id")
        .map_err(|e| db_err("read session_id", e))?;
    let role_str: String = row.try_get("role").map_err(|e| db_err("read role", e))?;
    let content: String = row
        .try_get("content")
        .map_err(|e| db_err("read content", e))?;
    let dimension_context: Option<String> = row
        .try_get("dimension_context")
        .map_err(|e| db_err("read dimension_context", e))?;
    let is_rating_prompt: bool = row
        .try_get("is_rating_prompt")
        .map_err(|e| db_err("read is_rating_prompt", e))?;
    let sequence: i32 = row
        .try_get("sequence")
        .map_err(|e| db_err("read sequence", e))?;
    let tokens_input: Option<i32> = row
        .try_get("tokens_input")
        .map_err(|e| db_err("read tokens_input", e))?;
    let tokens_output: Option<i32> = row
        .try_get("tokens_output")
        .map_err(|e| db_err("read tokens_output", e))?;
    let latency_ms: Option<i32> = row
        .try_get("latency_ms")
        .map_err(|e| db_err("read latency_ms", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_err("read created_at", e))?;

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        SessionId::from_uuid(session_id),
        str_to_role(&role_str)?,
        content,
        dimension_context.as_deref().map(parse_dimension).transpose()?,
        is_rating_prompt,
        sequence as u32,
        tokens_input.map(|t| t as u32),
        tokens_output.map(|t| t as u32),
        latency_ms.map(|t| t as u32),
        Timestamp::from_datetime(created_at),
    ))
}

fn row_to_rating(row: sqlx::postgres::PgRow) -> Result<ExtractedRating, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_err("read id", e))?;
    let session_id: uuid::Uuid = row
        .try_get("session_id")
        .map_err(|e| db_err("read session_id", e))?;
    let dimension_str: String = row
        .try_get("dimension")
        .map_err(|e| db_err("read dimension", e))?;
    let inferred_score: f64 = row
        .try_get("inferred_score")
        .map_err(|e| db_err("read inferred_score", e))?;
    let confidence: f64 = row
        .try_get("confidence")
        .map_err(|e| db_err("read confidence", e))?;
    let reasoning: String = row
        .try_get("reasoning")
        .map_err(|e| db_err("read reasoning", e))?;
    let user_confirmed: bool = row
        .try_get("user_confirmed")
        .map_err(|e| db_err("read user_confirmed", e))?;
    let user_adjusted_score: Option<f64> = row
        .try_get("user_adjusted_score")
        .map_err(|e| db_err("read user_adjusted_score", e))?;
    let final_score: f64 = row
        .try_get("final_score")
        .map_err(|e| db_err("read final_score", e))?;
    let key_quotes_value: serde_json::Value = row
        .try_get("key_quotes")
        .map_err(|e| db_err("read key_quotes", e))?;
    let key_quotes: Vec<String> =
        serde_json::from_value(key_quotes_value).map_err(|e| db_err("parse key_quotes", e))?;
    let summary_comment: Option<String> = row
        .try_get("summary_comment")
        .map_err(|e| db_err("read summary_comment", e))?;
    let ordinal: i32 = row
        .try_get("ordinal")
        .map_err(|e| db_err("read ordinal", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_err("read created_at", e))?;

    Ok(ExtractedRating::reconstitute(
        RatingId::from_uuid(id),
        SessionId::from_uuid(session_id),
        parse_dimension(&dimension_str)?,
        RawScore::try_new(inferred_score).map_err(|e| db_err("parse inferred_score", e))?,
        Confidence::clamped(confidence),
        reasoning,
        user_confirmed,
        user_adjusted_score
            .map(RawScore::try_new)
            .transpose()
            .map_err(|e| db_err("parse user_adjusted_score", e))?,
        final_score,
        key_quotes,
        summary_comment,
        ordinal as u32,
        Timestamp::from_datetime(created_at),
    ))
}

fn row_to_summary(row: sqlx::postgres::PgRow) -> Result<SessionSummary, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_err("read id", e))?;
    let session_id: uuid::Uuid = row
        .try_get("session_id")
        .map_err(|e| db_err("read session_id", e))?;
    let executive_summary: String = row
        .try_get("executive_summary")
        .map_err(|e| db_err("read executive_summary", e))?;
    let pain_points_value: serde_json::Value = row
        .try_get("pain_points")
        .map_err(|e| db_err("read pain_points", e))?;
    let pain_points: Vec<PainPoint> =
        serde_json::from_value(pain_points_value).map_err(|e| db_err("parse pain_points", e))?;
    let positive_aspects: Vec<String> = row
        .try_get("positive_aspects")
        .map_err(|e| db_err("read positive_aspects", e))?;
    let improvement_suggestions: Vec<String> = row
        .try_get("improvement_suggestions")
        .map_err(|e| db_err("read improvement_suggestions", e))?;
    let sentiment_str: String = row
        .try_get("overall_sentiment")
        .map_err(|e| db_err("read overall_sentiment", e))?;
    let sentiments_value: serde_json::Value = row
        .try_get("dimension_sentiments")
        .map_err(|e| db_err("read dimension_sentiments", e))?;
    let dimension_sentiments: BTreeMap<Dimension, Sentiment> =
        serde_json::from_value(sentiments_value)
            .map_err(|e| db_err("parse dimension_sentiments", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| db_err("read created_at", e))?;

    Ok(SessionSummary::reconstitute(
        SummaryId::from_uuid(id),
        SessionId::from_uuid(session_id),
        executive_summary,
        pain_points,
        positive_aspects,
        improvement_suggestions,
        Sentiment::parse_lenient(&sentiment_str),
        dimension_sentiments,
        Timestamp::from_datetime(created_at),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_conversion_covers_every_variant() {
        for status in [
            InterviewStatus::Started,
            InterviewStatus::InProgress,
            InterviewStatus::RatingConfirmation,
            InterviewStatus::Completed,
            InterviewStatus::Abandoned,
        ] {
            assert_eq!(str_to_status(status.as_str()).unwrap(), status);
        }
        assert!(str_to_status("archived").is_err());
    }

    #[test]
    fn role_conversion_covers_every_variant() {
        for role in [
            MessageRole::System,
            MessageRole::Assistant,
            MessageRole::User,
        ] {
            assert_eq!(str_to_role(role.as_str()).unwrap(), role);
        }
        assert!(str_to_role("bot").is_err());
    }

    #[test]
    fn sentiment_serialization_roundtrips() {
        for sentiment in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
            assert_eq!(
                Sentiment::parse_lenient(sentiment_to_str(sentiment)),
                sentiment
            );
        }
    }

    // Severity appears in pain point JSON; keep its wire form stable.
    #[test]
    fn severity_parse_is_lenient() {
        assert_eq!(Severity::parse_lenient("HIGH"), Severity::High);
        assert_eq!(Severity::parse_lenient("unknown"), Severity::Medium);
    }
}
