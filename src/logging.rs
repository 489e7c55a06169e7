//! # Structured Logging Module
//!
//! `tracing` subscriber setup for the CLI. `RUST_LOG` wins when set;
//! otherwise the `-v` count picks the level.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Map a `-v` count to a filter directive
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize logging once; later calls are no-ops.
///
/// Logs go to stderr so reports on stdout stay machine-readable.
pub fn init_logging(verbose: u8, json: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

        let builder = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr);

        // try_init: a subscriber may already be installed (e.g. by a test harness)
        let result = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        if result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}
