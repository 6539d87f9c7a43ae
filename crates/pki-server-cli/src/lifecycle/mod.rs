//! Lifecycle management for PKI server instances.
//!
//! The module is split into focused submodules:
//! - [`types`] defines wait options and the output wrapper.
//! - [`error`] captures the error surface exposed to the CLI.
//! - [`readiness`] implements the bounded polling primitive.
//! - [`socket`] checks whether an instance is servicing requests.
//! - [`spawning`] launches server processes.
//! - [`pidfile`] records the pid of background processes.
//! - [`shutdown`] signals server processes.
//! - [`controller`] implements create/remove/start/stop/restart/run.

mod controller;
mod error;
mod pidfile;
mod readiness;
mod shutdown;
mod socket;
mod spawning;
mod types;

pub(crate) use controller::{LifecycleController, Transition};
pub(crate) use error::LifecycleError;
pub(crate) use socket::{ActivityCheck, NetworkCheck};
pub(crate) use spawning::{Debugger, LaunchModifiers, ProcessLauncher, SystemLauncher};
pub(crate) use types::{LifecycleOutput, WaitOptions};

#[cfg(test)]
pub(crate) use pidfile::{read_pid, write_pid};
#[cfg(test)]
pub(crate) use readiness::Attempt;
#[cfg(test)]
pub(crate) use socket::CheckTarget;
#[cfg(test)]
pub(crate) use spawning::{LaunchRequest, RunExit};
