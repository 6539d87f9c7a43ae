//! Lifecycle option types and output abstractions.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use super::LifecycleError;

/// Waiting behaviour for `start`, `stop`, and `restart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WaitOptions {
    /// Block until the target state is reached.
    pub wait: bool,
    /// Upper bound for the wait.
    pub max_wait: Duration,
    /// Budget for a single readiness check.
    pub per_attempt: Duration,
}

/// Line-oriented handle on the command's stdout.
pub(crate) struct LifecycleOutput<W: Write> {
    pub stdout: W,
}

impl<W: Write> LifecycleOutput<W> {
    pub fn new(stdout: W) -> Self {
        Self { stdout }
    }

    pub fn stdout_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), LifecycleError> {
        self.stdout.write_fmt(args).map_err(LifecycleError::Io)?;
        self.stdout.write_all(b"\n").map_err(LifecycleError::Io)?;
        self.stdout.flush().map_err(LifecycleError::Io)
    }
}
