//! Application layer - orchestration of interview operations.
//!
//! Handlers wire the domain model to the ports. Each handler owns one
//! operation; shared machinery (per-session locking, bounded generation,
//! rating extraction) lives alongside them.

pub mod generation;
pub mod handlers;
pub mod rating_extraction;
pub mod session_locks;

pub use generation::BoundedGenerator;
pub use rating_extraction::RatingExtractor;
pub use session_locks::SessionLocks;
