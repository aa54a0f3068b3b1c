//! Interview module - the conversational interview core.
//!
//! # Module Organization
//!
//! - `session` - InterviewSession aggregate (lifecycle state machine,
//!   coverage, sequence assignment, token accounting)
//! - `coverage` - per-dimension discussion coverage tracking
//! - `message` - immutable conversation turns
//! - `rating` - ratings extracted from the transcript and their confirmation
//! - `summary` - the final session summary artifact
//! - `classifier` - keyword heuristic mapping turn content to a dimension
//! - `prompts` - prompt templates, dimension profiles, and fallback content
//! - `errors` - interview operation errors

mod classifier;
mod coverage;
mod errors;
mod message;
pub mod prompts;
mod rating;
mod session;
mod summary;

pub use classifier::classify_dimension;
pub use coverage::DimensionCoverage;
pub use errors::InterviewError;
pub use message::{Message, MessageRole};
pub use rating::{ExtractedRating, EXTRACTION_FAILED_REASONING, NOT_DISCUSSED_REASONING};
pub use session::InterviewSession;
pub use summary::{PainPoint, Sentiment, SessionSummary, Severity, SUMMARY_UNAVAILABLE};
