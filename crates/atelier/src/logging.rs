//! Logging setup for the command-line frontend.
//!
//! Everything goes to stderr; stdout stays clean in case the output CSV
//! is ever piped. The level and format come from the config file's
//! `logging` section, with `--verbose` and `--json-logs` as one-shot
//! overrides and `RUST_LOG` taking precedence over both.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use atelier_core::Config;

/// Install the global subscriber. Call once, before any pipeline work.
pub fn init(config: &Config, verbose: bool, json_logs: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs || config.logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}
