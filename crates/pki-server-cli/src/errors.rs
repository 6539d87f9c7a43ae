//! Error types for the CLI runtime.

use std::sync::Arc;

use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl AppError {
    /// Usage line to print after the error, if any.
    pub(crate) fn usage(&self) -> Option<&str> {
        match self {
            Self::Lifecycle(LifecycleError::MissingArgument { usage, .. }) => Some(usage),
            _ => None,
        }
    }
}
