//! Candor - Conversational Workplace-Friction Interview Orchestrator
//!
//! This crate implements the interview session engine for a workplace-friction
//! survey platform: a stateful orchestrator that drives a semi-structured
//! interview through an external language-generation service, tracks coverage
//! of the six friction dimensions, extracts structured ratings from the
//! transcript, runs a per-dimension confirmation loop, and finalizes each
//! session into a durable summary.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
