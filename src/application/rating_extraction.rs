//! Rating extraction from a finished conversation.
//!
//! Extraction happens exactly once per session, when coverage completes. It
//! is deliberately infallible: malformed model output, missing dimensions or
//! a full provider outage all degrade to low-confidence neutral ratings that
//! the participant corrects during confirmation.

use serde_json::Value;
use tracing::warn;

use crate::application::generation::BoundedGenerator;
use crate::domain::foundation::{Confidence, Dimension, RawScore, SessionId};
use crate::domain::interview::{
    prompts, ExtractedRating, Message, EXTRACTION_FAILED_REASONING, NOT_DISCUSSED_REASONING,
};
use crate::ports::GenerationRequest;

/// Context window for extraction. Wider than the conversational window
/// because scores should reflect the whole interview.
const EXTRACTION_TRANSCRIPT_MESSAGES: usize = 100;

/// Turns a transcript into one rating per dimension.
pub struct RatingExtractor {
    generator: BoundedGenerator,
}

impl RatingExtractor {
    pub fn new(generator: BoundedGenerator) -> Self {
        Self { generator }
    }

    /// Extracts ratings for all dimensions, in canonical dimension order.
    ///
    /// Never fails: dimensions the model skipped or mangled come back as
    /// neutral defaults.
    pub async fn extract(&self, session_id: SessionId, messages: &[Message]) -> Vec<ExtractedRating> {
        let transcript = prompts::format_transcript(messages, EXTRACTION_TRANSCRIPT_MESSAGES);
        let request = GenerationRequest::new(prompts::extraction_prompt(&transcript))
            .with_system_prompt(prompts::EXTRACTION_SYSTEM_PROMPT)
            .with_temperature(prompts::EXTRACTION_TEMPERATURE)
            .with_schema_hint(r#"{"ratings": [{"dimension": "...", "score": 0, "confidence": 0}]}"#);

        match self.generator.generate_json(request).await {
            Ok(value) => self.ratings_from_value(session_id, &value),
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    error = %err,
                    "rating extraction failed, defaulting all dimensions to neutral"
                );
                self.all_neutral(session_id, EXTRACTION_FAILED_REASONING)
            }
        }
    }

    fn ratings_from_value(&self, session_id: SessionId, value: &Value) -> Vec<ExtractedRating> {
        let entries = value
            .get("ratings")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut ratings: Vec<ExtractedRating> = Vec::with_capacity(Dimension::COUNT);
        for dimension in Dimension::ALL {
            let position = ratings.len() as u32;
            match entries
                .iter()
                .find_map(|entry| Self::parse_entry(entry, dimension))
            {
                Some((score, confidence, reasoning, key_quotes, summary_comment)) => {
                    ratings.push(ExtractedRating::inferred(
                        session_id,
                        dimension,
                        score,
                        confidence,
                        reasoning,
                        key_quotes,
                        summary_comment,
                        position,
                    ));
                }
                None => {
                    ratings.push(ExtractedRating::neutral(
                        session_id,
                        dimension,
                        NOT_DISCUSSED_REASONING,
                        position,
                    ));
                }
            }
        }
        ratings
    }

    /// Parses one extraction entry if it targets `dimension` and carries a
    /// valid score. Anything malformed is treated as absent.
    fn parse_entry(
        entry: &Value,
        dimension: Dimension,
    ) -> Option<(RawScore, Confidence, String, Vec<String>, Option<String>)> {
        let entry_dimension: Dimension = entry.get("dimension")?.as_str()?.parse().ok()?;
        if entry_dimension != dimension {
            return None;
        }

        let score = RawScore::try_new(entry.get("score")?.as_f64()?).ok()?;
        let confidence =
            Confidence::clamped(entry.get("confidence").and_then(Value::as_f64).unwrap_or(0.5));
        let reasoning = entry
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let key_quotes = entry
            .get("key_quotes")
            .and_then(Value::as_array)
            .map(|quotes| {
                quotes
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let summary_comment = entry
            .get("summary_comment")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some((score, confidence, reasoning, key_quotes, summary_comment))
    }

    fn all_neutral(&self, session_id: SessionId, reasoning: &str) -> Vec<ExtractedRating> {
        Dimension::ALL
            .iter()
            .enumerate()
            .map(|(position, dimension)| {
                ExtractedRating::neutral(session_id, *dimension, reasoning, position as u32)
            })
            .collect()
    }
}
