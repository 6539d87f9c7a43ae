//! Recording stand-ins for the process launcher and activity check.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::lifecycle::{
    ActivityCheck, Attempt, CheckTarget, LaunchModifiers, LaunchRequest, LifecycleError,
    ProcessLauncher, RunExit,
};

pub(in crate::tests) const SPAWNED_PID: u32 = 4242;

/// One call observed by [`RecordingLauncher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(in crate::tests) enum LaunchCall {
    Spawn {
        program: String,
        instance_dir: PathBuf,
        user: String,
    },
    RunForeground {
        program: String,
        modifiers: LaunchModifiers,
    },
    Terminate {
        pid: u32,
    },
}

/// Launcher that records requests instead of starting processes.
///
/// Clones share the call log so a test can inspect it after the runtime
/// consumed its copy.
#[derive(Debug, Clone)]
pub(in crate::tests) struct RecordingLauncher {
    calls: Rc<RefCell<Vec<LaunchCall>>>,
    run_exit: Rc<Cell<RunExit>>,
}

impl Default for RecordingLauncher {
    fn default() -> Self {
        Self {
            calls: Rc::default(),
            run_exit: Rc::new(Cell::new(RunExit::Exited { code: Some(0) })),
        }
    }
}

impl RecordingLauncher {
    pub(in crate::tests) fn calls(&self) -> Vec<LaunchCall> {
        self.calls.borrow().clone()
    }

    pub(in crate::tests) fn set_run_exit(&self, exit: RunExit) {
        self.run_exit.set(exit);
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn spawn(&mut self, request: &LaunchRequest<'_>) -> Result<u32, LifecycleError> {
        self.calls.borrow_mut().push(LaunchCall::Spawn {
            program: request.program.to_owned(),
            instance_dir: request.instance_dir.to_path_buf(),
            user: request.user.to_owned(),
        });
        Ok(SPAWNED_PID)
    }

    fn run_foreground(&mut self, request: &LaunchRequest<'_>) -> Result<RunExit, LifecycleError> {
        self.calls.borrow_mut().push(LaunchCall::RunForeground {
            program: request.program.to_owned(),
            modifiers: request.modifiers.clone(),
        });
        Ok(self.run_exit.get())
    }

    fn terminate(&mut self, pid: u32) -> Result<(), LifecycleError> {
        self.calls.borrow_mut().push(LaunchCall::Terminate { pid });
        Ok(())
    }
}

/// Activity check replaying scripted results, then repeating a fallback.
#[derive(Debug, Clone)]
pub(in crate::tests) struct ScriptedCheck {
    script: Rc<RefCell<VecDeque<Attempt>>>,
    fallback: Rc<Cell<Attempt>>,
    attempts: Rc<Cell<usize>>,
}

impl ScriptedCheck {
    fn with_fallback(fallback: Attempt) -> Self {
        Self {
            script: Rc::default(),
            fallback: Rc::new(Cell::new(fallback)),
            attempts: Rc::default(),
        }
    }

    pub(in crate::tests) fn inactive() -> Self {
        Self::with_fallback(Attempt::Refused)
    }

    pub(in crate::tests) fn set_active(&self, active: bool) {
        self.fallback.set(if active {
            Attempt::Satisfied
        } else {
            Attempt::Refused
        });
    }

    pub(in crate::tests) fn push(&self, results: impl IntoIterator<Item = Attempt>) {
        self.script.borrow_mut().extend(results);
    }

    pub(in crate::tests) fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl ActivityCheck for ScriptedCheck {
    fn check(&self, _target: &CheckTarget, _budget: Duration) -> Attempt {
        self.attempts.set(self.attempts.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.fallback.get())
    }
}
