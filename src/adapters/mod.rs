//! Adapters implementing the outbound ports.

pub mod generation;
pub mod metrics;
pub mod store;
