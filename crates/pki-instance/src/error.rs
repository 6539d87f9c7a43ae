use std::io;
use std::path::PathBuf;

use pki_config::InstancePathsError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while resolving, loading, or laying out an instance.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// The instance has no persisted state.
    #[error("instance '{name}' does not exist")]
    NotFound { name: String },
    /// The instance identifier is unusable.
    #[error(transparent)]
    Paths(#[from] InstancePathsError),
    /// A configuration store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A port entry in `server.cfg` was not a valid port number.
    #[error("invalid port '{value}' for {key}")]
    InvalidPort { key: String, value: String },
    /// The instance type entry was not recognised.
    #[error("invalid instance type '{value}'")]
    InvalidType { value: String },
    /// Creating or removing the instance layout failed.
    #[error("failed to update {path:?}: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstanceError {
    pub(crate) fn layout(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Layout {
            path: path.into(),
            source,
        }
    }
}
