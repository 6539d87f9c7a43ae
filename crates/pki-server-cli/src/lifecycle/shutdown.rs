//! Server shutdown signalling.

use super::error::LifecycleError;

/// Sends SIGTERM to the server process.
///
/// Pid 0 would address the caller's process group and values above
/// `i32::MAX` do not fit `pid_t`; both are rejected before any signal is
/// sent.
pub(crate) fn signal_server(pid: u32) -> Result<(), LifecycleError> {
    if pid == 0 {
        return Err(LifecycleError::InvalidPid {
            pid,
            reason: String::from("pid 0 addresses the whole process group"),
        });
    }
    let Ok(raw) = i32::try_from(pid) else {
        return Err(LifecycleError::InvalidPid {
            pid,
            reason: String::from("pid exceeds the platform pid range"),
        });
    };
    send_sigterm(pid, raw)
}

#[cfg(unix)]
fn send_sigterm(pid: u32, raw: i32) -> Result<(), LifecycleError> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(|errno| LifecycleError::SignalFailed {
        pid,
        source: std::io::Error::from(errno),
    })
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32, _raw: i32) -> Result<(), LifecycleError> {
    Err(LifecycleError::UnsupportedPlatform)
}
