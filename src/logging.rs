//! Logging configuration using the tracing ecosystem.
//!
//! Embedding hosts normally install their own subscriber and collect the
//! plugin's spans through it. For standalone use and debugging this
//! module sets up a stderr fmt layer with environment-based filtering.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "sentry_openproject=info,warn";

/// Initialize the logging system.
///
/// Sets up tracing with a stderr writer and log level configuration via
/// the `RUST_LOG` environment variable (e.g.
/// `RUST_LOG=sentry_openproject=debug`).
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging initialized");
    Ok(())
}
