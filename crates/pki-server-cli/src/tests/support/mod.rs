//! Test support for driving the CLI runtime without touching real processes.
//!
//! Supplies a static configuration loader, a launcher that records calls
//! instead of spawning, and an activity check that replays scripted results while
//! counting attempts.

mod collaborators;

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use pki_config::{Config, InstancePaths};
use tempfile::TempDir;

use crate::lifecycle::ActivityCheck;
use crate::{AppError, ConfigLoader, IoStreams, run_with_collaborators};

pub(super) use collaborators::{LaunchCall, RecordingLauncher, SPAWNED_PID, ScriptedCheck};

/// A config loader that returns a fixed configuration for tests.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Captured result of one CLI invocation.
#[derive(Debug)]
pub(super) struct Invocation {
    pub exit_code: ExitCode,
    pub stdout: String,
    pub stderr: String,
}

impl Invocation {
    pub(super) fn succeeded(&self) -> bool {
        self.exit_code == ExitCode::SUCCESS
    }
}

/// Temporary instance root plus the collaborators handed to the runtime.
pub(super) struct TestWorld {
    _root: TempDir,
    pub config: Config,
    pub launcher: RecordingLauncher,
    pub activity: ScriptedCheck,
}

impl TestWorld {
    pub(super) fn new() -> Result<Self> {
        let root = TempDir::new().context("create instance root")?;
        let config = Config {
            instance_root: root.path().to_string_lossy().into_owned().into(),
            server_command: String::from("pki-test-server"),
            connect_timeout_secs: 1,
            ..Config::default()
        };
        Ok(Self {
            _root: root,
            config,
            launcher: RecordingLauncher::default(),
            activity: ScriptedCheck::inactive(),
        })
    }

    pub(super) fn paths(&self, name: &str) -> Result<InstancePaths> {
        self.config
            .instance_paths(name)
            .context("resolve instance paths")
    }

    /// Runs `pki-server <args>` against this world.
    pub(super) fn run(&self, args: &[&str]) -> Invocation {
        self.run_with_activity(args, self.activity.clone())
    }

    /// Runs `pki-server <args>` with a different activity check.
    pub(super) fn run_with_activity<P: ActivityCheck>(
        &self,
        args: &[&str],
        activity: P,
    ) -> Invocation {
        let argv = std::iter::once("pki-server")
            .chain(args.iter().copied())
            .map(OsString::from);
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let exit_code = {
            let mut io = IoStreams::new(&mut stdout, &mut stderr, false);
            run_with_collaborators(
                argv,
                &mut io,
                &StaticConfigLoader::new(self.config.clone()),
                self.launcher.clone(),
                activity,
            )
        };
        Invocation {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        }
    }

    /// Creates an instance through the CLI and asserts success.
    pub(super) fn create_instance(&self, name: &str) -> Result<InstancePaths> {
        let outcome = self.run(&["create", name]);
        anyhow::ensure!(outcome.succeeded(), "create failed: {}", outcome.stderr);
        self.paths(name)
    }

    /// Installs a subsystem store with the given entries.
    pub(super) fn install_subsystem(
        &self,
        paths: &InstancePaths,
        kind: &str,
        entries: &[(&str, &str)],
    ) -> Result<()> {
        let content: String = entries
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect();
        write_file(&paths.subsystem_config_path(kind), &content)
    }

    /// Marks a subsystem as deployed.
    pub(super) fn enable_subsystem(&self, paths: &InstancePaths, kind: &str) -> Result<()> {
        write_file(&paths.deployment_descriptor_path(kind), "<Context/>\n")
    }
}

pub(super) fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("write {}", path.display()))
}
