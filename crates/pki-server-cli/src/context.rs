//! Request-scoped state shared by every command of one invocation.

use std::time::Duration;

use pki_config::{Config, InstancePaths};
use pki_instance::InstanceHandle;

use crate::command::CommandTree;
use crate::lifecycle::LifecycleError;

/// Diagnostic detail requested on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Verbosity {
    /// Use the configured log filter.
    #[default]
    Quiet,
    /// `-v/--verbose`: informational messages.
    Verbose,
    /// `--debug`: debug messages.
    Debug,
}

impl Verbosity {
    /// Derives verbosity from the global flags; `--debug` wins.
    pub(crate) fn from_flags(verbose: bool, debug: bool) -> Self {
        match (verbose, debug) {
            (_, true) => Self::Debug,
            (true, false) => Self::Verbose,
            (false, false) => Self::Quiet,
        }
    }

    /// Filter expression for the invocation's subscriber.
    pub(crate) fn filter<'a>(self, configured: &'a str) -> &'a str {
        match self {
            Self::Quiet => configured,
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// State available to command handlers for the duration of one invocation.
pub(crate) struct RequestContext<'a> {
    pub(crate) config: &'a Config,
    pub(crate) commands: &'a CommandTree,
    pub(crate) verbosity: Verbosity,
    pub(crate) stdout_is_terminal: bool,
}

impl RequestContext<'_> {
    /// Resolves the handle of the named instance.
    pub(crate) fn instance(&self, name: &str) -> Result<InstanceHandle, LifecycleError> {
        let paths: InstancePaths = self.config.instance_paths(name)?;
        Ok(InstanceHandle::new(paths))
    }

    /// Resolves the handle of an instance that must already exist.
    pub(crate) fn existing_instance(&self, name: &str) -> Result<InstanceHandle, LifecycleError> {
        let handle = self.instance(name)?;
        if !handle.exists() {
            return Err(LifecycleError::InvalidInstance {
                name: name.to_owned(),
            });
        }
        Ok(handle)
    }

    /// Per-attempt connection budget, honouring a command-line override.
    pub(crate) fn connect_timeout(&self, override_secs: Option<u64>) -> Duration {
        override_secs.map_or_else(|| self.config.connect_timeout(), Duration::from_secs)
    }
}
