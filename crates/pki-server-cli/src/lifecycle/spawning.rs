//! Server process launching.
//!
//! [`ProcessLauncher`] is the seam between the lifecycle controller and the
//! operating system. [`SystemLauncher`] turns a [`LaunchRequest`] into a
//! command line: an optional `runuser` prefix, an optional debugger prefix,
//! then the configured server program pointed at the instance directory.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::error::LifecycleError;

const JAVA_TOOL_OPTIONS: &str = "JAVA_TOOL_OPTIONS";
const RUNUSER: &str = "runuser";
const SERVER_LOG: &str = "server.log";
const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Debugger wrapping a foreground run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Debugger {
    Jdb,
    Gdb,
    Valgrind,
}

impl Debugger {
    fn prefix(self) -> &'static [&'static str] {
        match self {
            Self::Jdb => &["jdb"],
            Self::Gdb => &["gdb", "--args"],
            Self::Valgrind => &["valgrind", "--tool=memcheck"],
        }
    }
}

/// Options altering how the server process is launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LaunchModifiers {
    pub as_current_user: bool,
    pub debugger: Option<Debugger>,
    pub agentpath: Option<String>,
}

/// Everything a launcher needs to start one instance.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LaunchRequest<'a> {
    pub program: &'a str,
    pub instance_dir: &'a Path,
    pub logs_dir: &'a Path,
    pub user: &'a str,
    pub modifiers: &'a LaunchModifiers,
}

/// How a foreground run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunExit {
    /// The process exited on its own.
    Exited { code: Option<i32> },
    /// The operator interrupted the run.
    Interrupted,
}

/// Starts and stops server processes.
pub(crate) trait ProcessLauncher {
    /// Starts the server in the background and returns its pid.
    fn spawn(&mut self, request: &LaunchRequest<'_>) -> Result<u32, LifecycleError>;

    /// Runs the server in the foreground until it exits or is interrupted.
    fn run_foreground(&mut self, request: &LaunchRequest<'_>) -> Result<RunExit, LifecycleError>;

    /// Asks the server process to terminate.
    fn terminate(&mut self, pid: u32) -> Result<(), LifecycleError>;
}

/// Program, arguments, and environment derived from a [`LaunchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub env: Vec<(String, String)>,
}

impl LaunchPlan {
    /// Builds the plan for `request`. `current_user` is the name of the
    /// invoking account, used to decide whether a user switch is needed.
    pub(crate) fn build(request: &LaunchRequest<'_>, current_user: Option<&str>) -> Self {
        let mut words: Vec<OsString> = Vec::new();

        let switch_user = !request.modifiers.as_current_user
            && !request.user.is_empty()
            && current_user != Some(request.user);
        if switch_user {
            words.extend([RUNUSER, "-u", request.user, "--"].map(OsString::from));
        }
        if let Some(debugger) = request.modifiers.debugger {
            words.extend(debugger.prefix().iter().map(OsString::from));
        }
        words.push(OsString::from(request.program));
        words.push(OsString::from("--instance-dir"));
        words.push(request.instance_dir.as_os_str().to_owned());

        let env = request
            .modifiers
            .agentpath
            .iter()
            .map(|path| (JAVA_TOOL_OPTIONS.to_owned(), format!("-agentpath:{path}")))
            .collect();

        let mut words = words.into_iter();
        let program = words.next().unwrap_or_else(|| OsString::from(request.program));
        Self {
            program,
            args: words.collect(),
            env,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.env.iter().map(|(key, value)| (key, value)));
        command
    }
}

/// Launcher backed by real operating-system processes.
#[derive(Debug, Default)]
pub(crate) struct SystemLauncher;

impl SystemLauncher {
    fn plan(request: &LaunchRequest<'_>) -> LaunchPlan {
        LaunchPlan::build(request, current_user_name().as_deref())
    }
}

impl ProcessLauncher for SystemLauncher {
    fn spawn(&mut self, request: &LaunchRequest<'_>) -> Result<u32, LifecycleError> {
        let plan = Self::plan(request);
        let log = open_server_log(request.logs_dir).map_err(|source| LifecycleError::Launch {
            program: plan.program.clone(),
            source,
        })?;
        let log_err = log.try_clone().map_err(|source| LifecycleError::Launch {
            program: plan.program.clone(),
            source,
        })?;

        let mut command = plan.command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));
        let child = command.spawn().map_err(|source| LifecycleError::Launch {
            program: plan.program.clone(),
            source,
        })?;
        info!(
            target: "pki_server_cli::lifecycle::spawning",
            pid = child.id(),
            program = %plan.program.to_string_lossy(),
            "spawned server process"
        );
        Ok(child.id())
    }

    fn run_foreground(&mut self, request: &LaunchRequest<'_>) -> Result<RunExit, LifecycleError> {
        let plan = Self::plan(request);
        let interrupted = Arc::new(AtomicBool::new(false));
        let handler = InterruptFlag::install(Arc::clone(&interrupted))?;

        let mut command = plan.command();
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        let mut child = command.spawn().map_err(|source| LifecycleError::Launch {
            program: plan.program.clone(),
            source,
        })?;
        debug!(
            target: "pki_server_cli::lifecycle::spawning",
            pid = child.id(),
            "running server in the foreground"
        );

        let status = wait_for_child(&mut child, &interrupted)?;
        drop(handler);

        if interrupted.load(Ordering::SeqCst) || killed_by_interrupt(&status) {
            return Ok(RunExit::Interrupted);
        }
        Ok(RunExit::Exited {
            code: status.code(),
        })
    }

    fn terminate(&mut self, pid: u32) -> Result<(), LifecycleError> {
        super::shutdown::signal_server(pid)
    }
}

fn open_server_log(logs_dir: &Path) -> std::io::Result<File> {
    fs::create_dir_all(logs_dir)?;
    let path: PathBuf = logs_dir.join(SERVER_LOG);
    OpenOptions::new().create(true).append(true).open(path)
}

fn wait_for_child(
    child: &mut Child,
    interrupted: &AtomicBool,
) -> Result<ExitStatus, LifecycleError> {
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|source| LifecycleError::MonitorChild { source })?
        {
            return Ok(status);
        }
        if interrupted.load(Ordering::SeqCst) {
            // The terminal delivers SIGINT to the whole foreground group; wait
            // for the server to finish its own shutdown.
            return child
                .wait()
                .map_err(|source| LifecycleError::MonitorChild { source });
        }
        thread::sleep(CHILD_POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(signal_hook::consts::SIGINT)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &ExitStatus) -> bool {
    false
}

/// SIGINT registration that lasts until dropped.
struct InterruptFlag {
    id: signal_hook::SigId,
}

impl InterruptFlag {
    fn install(flag: Arc<AtomicBool>) -> Result<Self, LifecycleError> {
        let id = signal_hook::flag::register(signal_hook::consts::SIGINT, flag)
            .map_err(|source| LifecycleError::InterruptHandler { source })?;
        Ok(Self { id })
    }
}

impl Drop for InterruptFlag {
    fn drop(&mut self) {
        signal_hook::low_level::unregister(self.id);
    }
}

#[cfg(unix)]
fn current_user_name() -> Option<String> {
    use nix::unistd::{User, geteuid};
    User::from_uid(geteuid()).ok().flatten().map(|user| user.name)
}

#[cfg(not(unix))]
fn current_user_name() -> Option<String> {
    None
}
