//! Instance lifecycle state machine.
//!
//! Observable states are "not created", "stopped", and "active"; "starting" and
//! "stopping" exist only while a `--wait` poll is running. Starting an active
//! instance and stopping a stopped one are no-ops that neither launch, signal,
//! nor poll.

use std::time::Duration;

use pki_instance::{Instance, InstanceHandle, InstanceSettings};
use tracing::{debug, info, warn};

use super::error::LifecycleError;
use super::pidfile::{read_pid, remove_pid, write_pid};
use super::readiness::{PollSchedule, ReadinessOutcome, await_condition};
use super::socket::{ActivityCheck, CheckTarget};
use super::spawning::{LaunchModifiers, LaunchRequest, ProcessLauncher, RunExit};
use super::types::WaitOptions;

/// Whether an operation changed the instance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Changed,
    AlreadyInState,
}

/// Drives instance transitions through injected collaborators.
pub(crate) struct LifecycleController<L, P> {
    launcher: L,
    activity: P,
    program: String,
}

impl<L, P> LifecycleController<L, P>
where
    L: ProcessLauncher,
    P: ActivityCheck,
{
    pub(crate) fn new(launcher: L, activity: P, program: impl Into<String>) -> Self {
        Self {
            launcher,
            activity,
            program: program.into(),
        }
    }

    /// Creates the instance layout.
    pub(crate) fn create(
        &mut self,
        handle: &InstanceHandle,
        settings: &InstanceSettings,
        force: bool,
    ) -> Result<Instance, LifecycleError> {
        if handle.exists() && !force {
            return Err(LifecycleError::AlreadyExists {
                name: handle.name().to_owned(),
            });
        }
        info!(
            target: "pki_server_cli::lifecycle::controller",
            instance = handle.name(),
            "creating instance"
        );
        Ok(handle.create(settings)?)
    }

    /// Deletes the instance directory.
    pub(crate) fn remove(
        &mut self,
        handle: &InstanceHandle,
        force: bool,
    ) -> Result<(), LifecycleError> {
        if !handle.exists() && !force {
            return Err(LifecycleError::NotFound {
                name: handle.name().to_owned(),
            });
        }
        info!(
            target: "pki_server_cli::lifecycle::controller",
            instance = handle.name(),
            "removing instance"
        );
        Ok(handle.remove()?)
    }

    /// Returns whether the loaded instance is servicing requests.
    pub(crate) fn is_active(
        &self,
        instance: &Instance,
        budget: Duration,
    ) -> Result<bool, LifecycleError> {
        let target = CheckTarget::for_instance(instance)?;
        Ok(self.activity.is_active(&target, budget))
    }

    /// Starts the instance in the background.
    pub(crate) fn start(
        &mut self,
        handle: &InstanceHandle,
        options: WaitOptions,
    ) -> Result<Transition, LifecycleError> {
        let instance = load_existing(handle)?;
        let mut target = CheckTarget::for_instance(&instance)?;
        if self.activity.is_active(&target, options.per_attempt) {
            debug!(
                target: "pki_server_cli::lifecycle::controller",
                instance = handle.name(),
                "instance already active"
            );
            return Ok(Transition::AlreadyInState);
        }

        let modifiers = LaunchModifiers::default();
        let request = launch_request(&self.program, &instance, &modifiers);
        let pid = self.launcher.spawn(&request)?;
        write_pid(instance.paths(), pid)?;
        info!(
            target: "pki_server_cli::lifecycle::controller",
            instance = handle.name(),
            pid,
            "instance starting"
        );

        if options.wait {
            target.pid = Some(pid);
            let outcome = await_condition(schedule(options), |budget| {
                self.activity.check(&target, budget)
            });
            ensure_reached(outcome, handle, "start", options)?;
            info!(
                target: "pki_server_cli::lifecycle::controller",
                instance = handle.name(),
                "instance started"
            );
        }
        Ok(Transition::Changed)
    }

    /// Stops the instance.
    pub(crate) fn stop(
        &mut self,
        handle: &InstanceHandle,
        options: WaitOptions,
    ) -> Result<Transition, LifecycleError> {
        let instance = load_existing(handle)?;
        let target = CheckTarget::for_instance(&instance)?;
        if !self.activity.is_active(&target, options.per_attempt) {
            debug!(
                target: "pki_server_cli::lifecycle::controller",
                instance = handle.name(),
                "instance already stopped"
            );
            if target.pid.is_some() {
                remove_pid(instance.paths())?;
            }
            return Ok(Transition::AlreadyInState);
        }

        let Some(pid) = read_pid(instance.paths())? else {
            return Err(LifecycleError::MissingPid {
                instance: handle.name().to_owned(),
                path: instance.paths().pid_path().to_path_buf(),
            });
        };
        self.launcher.terminate(pid)?;
        remove_pid(instance.paths())?;
        info!(
            target: "pki_server_cli::lifecycle::controller",
            instance = handle.name(),
            pid,
            "instance stopping"
        );

        if options.wait {
            let outcome = await_condition(schedule(options), |budget| {
                self.activity.check(&target, budget).negate()
            });
            ensure_reached(outcome, handle, "stop", options)?;
            info!(
                target: "pki_server_cli::lifecycle::controller",
                instance = handle.name(),
                "instance stopped"
            );
        }
        Ok(Transition::Changed)
    }

    /// Stops then starts the instance; a stop no-op does not skip the start.
    pub(crate) fn restart(
        &mut self,
        handle: &InstanceHandle,
        stop: WaitOptions,
        start: WaitOptions,
    ) -> Result<(), LifecycleError> {
        self.stop(handle, stop)?;
        self.start(handle, start)?;
        Ok(())
    }

    /// Runs the server in the foreground. An operator interrupt is success.
    pub(crate) fn run(
        &mut self,
        handle: &InstanceHandle,
        modifiers: &LaunchModifiers,
    ) -> Result<(), LifecycleError> {
        let instance = load_existing(handle)?;
        let request = launch_request(&self.program, &instance, modifiers);
        match self.launcher.run_foreground(&request)? {
            RunExit::Interrupted => {
                debug!(
                    target: "pki_server_cli::lifecycle::controller",
                    instance = handle.name(),
                    "server stopped"
                );
                Ok(())
            }
            RunExit::Exited { code: Some(0) } => Ok(()),
            RunExit::Exited { code } => Err(LifecycleError::ServerExited { code }),
        }
    }
}

fn schedule(options: WaitOptions) -> PollSchedule {
    PollSchedule::new(options.max_wait, options.per_attempt)
}

fn launch_request<'a>(
    program: &'a str,
    instance: &'a Instance,
    modifiers: &'a LaunchModifiers,
) -> LaunchRequest<'a> {
    LaunchRequest {
        program,
        instance_dir: instance.paths().base_dir(),
        logs_dir: instance.paths().logs_dir(),
        user: &instance.settings().user,
        modifiers,
    }
}

fn load_existing(handle: &InstanceHandle) -> Result<Instance, LifecycleError> {
    if !handle.exists() {
        return Err(LifecycleError::InvalidInstance {
            name: handle.name().to_owned(),
        });
    }
    Ok(handle.load()?)
}

fn ensure_reached(
    outcome: ReadinessOutcome,
    handle: &InstanceHandle,
    action: &'static str,
    options: WaitOptions,
) -> Result<(), LifecycleError> {
    match outcome {
        ReadinessOutcome::Reached => Ok(()),
        ReadinessOutcome::TimedOut | ReadinessOutcome::ConnectionRefusedUntilDeadline => {
            warn!(
                target: "pki_server_cli::lifecycle::controller",
                instance = handle.name(),
                action,
                outcome = ?outcome,
                "wait bound elapsed"
            );
            Err(LifecycleError::Timeout {
                instance: handle.name().to_owned(),
                action,
                waited: options.max_wait,
            })
        }
    }
}
