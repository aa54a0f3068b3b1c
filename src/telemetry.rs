//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize structured logging for the process.
///
/// Reads the `CANDOR_LOG` environment variable for filter directives, for
/// example `CANDOR_LOG=candor=debug,sqlx=warn`, and falls back to
/// `candor=info` when it is unset or invalid.
///
/// Idempotent, so tests and embedding binaries can call it freely.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("CANDOR_LOG")
            .unwrap_or_else(|_| EnvFilter::new("candor=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
