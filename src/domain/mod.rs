//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `interview` - Interview session aggregate, messages, ratings, summaries,
//!   dimension coverage tracking, content classification, and prompt templates

pub mod foundation;
pub mod interview;
