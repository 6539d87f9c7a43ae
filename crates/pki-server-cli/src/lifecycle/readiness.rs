//! Bounded readiness polling.
//!
//! [`await_condition`] runs a check repeatedly until it reports success or the
//! wait bound elapses. Attempts are strictly sequential; between attempts the
//! caller's thread sleeps for the backoff clipped to the remaining time, so a
//! call never blocks for longer than `max_wait + per_attempt`.

use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Default pause between attempts.
pub(crate) const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    /// The condition holds.
    Satisfied,
    /// The condition does not hold yet.
    Unsatisfied,
    /// The target refused the connection.
    Refused,
    /// The attempt exceeded its own budget.
    AttemptTimedOut,
}

impl Attempt {
    /// Inverts an activity check into a "has stopped" check.
    pub(crate) fn negate(self) -> Self {
        match self {
            Self::Satisfied => Self::Unsatisfied,
            Self::Unsatisfied | Self::Refused => Self::Satisfied,
            Self::AttemptTimedOut => Self::AttemptTimedOut,
        }
    }
}

/// Final outcome of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadinessOutcome {
    Reached,
    TimedOut,
    ConnectionRefusedUntilDeadline,
}

/// Timing parameters for [`await_condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollSchedule {
    pub max_wait: Duration,
    pub per_attempt: Duration,
    pub backoff: Duration,
}

impl PollSchedule {
    /// Schedule using the default one-second backoff.
    pub(crate) fn new(max_wait: Duration, per_attempt: Duration) -> Self {
        Self {
            max_wait,
            per_attempt,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Polls `poll` until it is satisfied or `schedule.max_wait` elapses.
///
/// The poll receives the per-attempt budget and must not exceed it. At least
/// one attempt is always made, even with a zero wait bound.
pub(crate) fn await_condition<F>(schedule: PollSchedule, mut poll: F) -> ReadinessOutcome
where
    F: FnMut(Duration) -> Attempt,
{
    // An unrepresentable deadline means the wait is effectively unbounded.
    let deadline = Instant::now().checked_add(schedule.max_wait);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let failure = match poll(schedule.per_attempt) {
            Attempt::Satisfied => {
                debug!(
                    target: "pki_server_cli::lifecycle::readiness",
                    attempt,
                    "condition reached"
                );
                return ReadinessOutcome::Reached;
            }
            Attempt::Refused => {
                debug!(
                    target: "pki_server_cli::lifecycle::readiness",
                    attempt,
                    "connection refused"
                );
                ReadinessOutcome::ConnectionRefusedUntilDeadline
            }
            Attempt::AttemptTimedOut => {
                debug!(
                    target: "pki_server_cli::lifecycle::readiness",
                    attempt,
                    budget_ms = duration_ms(schedule.per_attempt),
                    "attempt timed out"
                );
                ReadinessOutcome::TimedOut
            }
            Attempt::Unsatisfied => ReadinessOutcome::TimedOut,
        };

        let remaining = deadline.map_or(Duration::MAX, |deadline| {
            deadline.saturating_duration_since(Instant::now())
        });
        if remaining.is_zero() {
            debug!(
                target: "pki_server_cli::lifecycle::readiness",
                attempts = attempt,
                outcome = ?failure,
                "wait bound elapsed"
            );
            return failure;
        }
        thread::sleep(schedule.backoff.min(remaining));
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
