//! Activity checks.
//!
//! An instance is active when its readiness port accepts a TCP connection on
//! the loopback interface. Instances without any configured port fall back to
//! checking whether the recorded pid is still alive.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::time::Duration;

use pki_instance::Instance;
use tracing::{debug, warn};

use super::error::LifecycleError;
use super::pidfile::read_pid;
use super::readiness::Attempt;

const MIN_ATTEMPT_BUDGET: Duration = Duration::from_millis(10);

/// What to check for one instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CheckTarget {
    pub port: Option<u16>,
    pub pid: Option<u32>,
}

impl CheckTarget {
    /// Derives the check target from a loaded instance and its pid file.
    pub(crate) fn for_instance(instance: &Instance) -> Result<Self, LifecycleError> {
        Ok(Self {
            port: instance.network().readiness_port(),
            pid: read_pid(instance.paths())?,
        })
    }
}

/// Decides whether an instance is servicing requests.
pub(crate) trait ActivityCheck {
    /// Runs one attempt bounded by `budget`.
    fn check(&self, target: &CheckTarget, budget: Duration) -> Attempt;

    /// Convenience wrapper returning `true` when the instance is active.
    fn is_active(&self, target: &CheckTarget, budget: Duration) -> bool {
        self.check(target, budget) == Attempt::Satisfied
    }
}

/// Activity check backed by loopback TCP connections and pid liveness.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NetworkCheck;

impl ActivityCheck for NetworkCheck {
    fn check(&self, target: &CheckTarget, budget: Duration) -> Attempt {
        match target.port {
            Some(port) => check_port(port, budget),
            None => check_pid(target.pid),
        }
    }
}

fn check_port(port: u16, budget: Duration) -> Attempt {
    let address = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    match TcpStream::connect_timeout(&address, budget.max(MIN_ATTEMPT_BUDGET)) {
        Ok(_) => Attempt::Satisfied,
        Err(error) => classify_connect_error(port, &error),
    }
}

fn classify_connect_error(port: u16, error: &io::Error) -> Attempt {
    if is_connection_refused(error) {
        return Attempt::Refused;
    }
    if matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    ) {
        return Attempt::AttemptTimedOut;
    }
    warn!(
        target: "pki_server_cli::lifecycle::socket",
        port,
        %error,
        "unexpected connection failure"
    );
    Attempt::Unsatisfied
}

/// Returns `true` for errors indicating that nothing is listening.
///
/// `ConnectionReset` is excluded: a reset means a process accepted and then
/// closed the connection.
fn is_connection_refused(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotFound
            | io::ErrorKind::AddrNotAvailable
    )
}

#[cfg(unix)]
fn check_pid(pid: Option<u32>) -> Attempt {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Some(raw) = pid.and_then(|pid| i32::try_from(pid).ok()).filter(|pid| *pid > 0) else {
        return Attempt::Unsatisfied;
    };
    match kill(Pid::from_raw(raw), None) {
        // EPERM means the process exists but belongs to someone else.
        Ok(()) | Err(Errno::EPERM) => Attempt::Satisfied,
        Err(errno) => {
            debug!(
                target: "pki_server_cli::lifecycle::socket",
                pid = raw,
                %errno,
                "recorded pid is not alive"
            );
            Attempt::Unsatisfied
        }
    }
}

#[cfg(not(unix))]
fn check_pid(_pid: Option<u32>) -> Attempt {
    Attempt::Unsatisfied
}
