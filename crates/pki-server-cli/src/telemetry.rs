//! Request-scoped diagnostics for one CLI invocation.
//!
//! The subscriber is installed with [`tracing::subscriber::set_default`] so it
//! lives exactly as long as the returned [`TelemetryGuard`]. Nothing is
//! registered process-wide, which keeps concurrent invocations in tests from
//! sharing a log level.

use std::io::{self, IsTerminal};

use pki_config::{Config, LogFormat};
use tracing::Subscriber;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::context::Verbosity;

/// Keeps the invocation's subscriber installed until dropped.
#[must_use = "diagnostics stop when the guard is dropped"]
pub(crate) struct TelemetryGuard {
    _guard: DefaultGuard,
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TelemetryError {
    /// Failed to parse the log filter expression.
    #[error("invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },
}

/// Installs a stderr subscriber for the current thread.
pub(crate) fn install(
    config: &Config,
    verbosity: Verbosity,
) -> Result<TelemetryGuard, TelemetryError> {
    let subscriber = build_subscriber(config, verbosity)?;
    Ok(TelemetryGuard {
        _guard: tracing::subscriber::set_default(subscriber),
    })
}

fn build_subscriber(
    config: &Config,
    verbosity: Verbosity,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let expression = verbosity.filter(config.log_filter());
    let filter = EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter {
        filter: expression.to_owned(),
        message: error.to_string(),
    })?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };
    Ok(subscriber)
}
