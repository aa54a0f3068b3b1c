//! Command handlers, one per interview operation.

pub mod interview;
