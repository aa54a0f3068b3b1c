//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the Candor interview domain.

mod dimension;
mod errors;
mod ids;
mod score;
mod status;
mod timestamp;

pub use dimension::Dimension;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{MessageId, RatingId, SessionId, SummaryId, SurveyId};
pub use score::{Confidence, RawScore};
pub use status::InterviewStatus;
pub use timestamp::Timestamp;
