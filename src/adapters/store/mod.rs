//! Storage adapters.

mod in_memory;
mod postgres;

pub use in_memory::{InMemoryInterviewStore, InMemorySurveyDirectory};
pub use postgres::{PostgresInterviewStore, PostgresSurveyDirectory};
