//! Outbound interfaces the application layer depends on.
//!
//! Adapters implement these traits; handlers only ever see the trait objects.

mod generator;
mod metrics;
mod store;
mod survey_directory;

pub use generator::{GeneratedText, GenerationError, GenerationRequest, TextGenerator};
pub use metrics::{MetricsError, MetricsSink};
pub use store::InterviewStore;
pub use survey_directory::{SurveyContext, SurveyDirectory};
