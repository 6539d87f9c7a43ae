//! Error types for instance lifecycle operations.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use pki_config::InstancePathsError;
use pki_instance::{GroupError, InstanceError, StoreError};
use thiserror::Error;

/// Errors raised while executing instance commands.
#[derive(Debug, Error)]
pub(crate) enum LifecycleError {
    #[error("Invalid instance: {name}")]
    InvalidInstance { name: String },
    #[error("Instance already exists: {name}")]
    AlreadyExists { name: String },
    #[error("Instance not found: {name}")]
    NotFound { name: String },
    #[error("No {subsystem} subsystem in instance {instance}")]
    NoSuchSubsystem {
        subsystem: &'static str,
        instance: String,
    },
    #[error("No such parameter: {name}")]
    NoSuchParameter { name: String },
    #[error("No such group: {group}")]
    NoSuchGroup { group: String },
    #[error("Missing {argument}")]
    MissingArgument {
        argument: &'static str,
        usage: String,
    },
    #[error("timed out after {}s waiting for instance {instance} to {action}", .waited.as_secs())]
    Timeout {
        instance: String,
        action: &'static str,
        waited: Duration,
    },
    #[error("instance {instance} is active but pid file {path:?} is missing")]
    MissingPid { instance: String, path: PathBuf },
    #[error("invalid pid {pid}: {reason}")]
    InvalidPid { pid: u32, reason: String },
    #[error("failed to signal server pid {pid}: {source}")]
    SignalFailed {
        pid: u32,
        #[source]
        source: io::Error,
    },
    #[error("failed to launch server '{program:?}': {source}")]
    Launch {
        program: OsString,
        #[source]
        source: io::Error,
    },
    #[error("failed to monitor server process: {source}")]
    MonitorChild {
        #[source]
        source: io::Error,
    },
    #[error("server exited with status {code:?}")]
    ServerExited { code: Option<i32> },
    #[error("failed to install interrupt handler: {source}")]
    InterruptHandler {
        #[source]
        source: io::Error,
    },
    #[error("failed to open runtime directory {path:?}: {source}")]
    OpenRuntimeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read pid file {path:?}: {source}")]
    ReadPid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse pid file {path:?}: {source}")]
    ParsePid {
        path: PathBuf,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to update pid file {path:?}: {source}")]
    WritePid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write command output: {0}")]
    Io(#[source] io::Error),
    #[error("failed to serialise status report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    #[cfg(not(unix))]
    #[error("platform does not support server lifecycle signalling")]
    UnsupportedPlatform,
    #[error(transparent)]
    Paths(#[from] InstancePathsError),
    #[error(transparent)]
    Instance(InstanceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<InstanceError> for LifecycleError {
    fn from(error: InstanceError) -> Self {
        match error {
            InstanceError::NotFound { name } => Self::InvalidInstance { name },
            InstanceError::Store(source) => Self::Store(source),
            InstanceError::Paths(source) => Self::Paths(source),
            other => Self::Instance(other),
        }
    }
}

impl From<GroupError> for LifecycleError {
    fn from(error: GroupError) -> Self {
        match error {
            GroupError::NoSuchGroup { group } => Self::NoSuchGroup { group },
            GroupError::Store(source) => Self::Store(source),
        }
    }
}
