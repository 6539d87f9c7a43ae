//! Derives the on-disk layout of an instance.
//!
//! The instance directory houses the server configuration, one configuration
//! store per subsystem, deployment descriptors, logs, and the pid file written
//! when the server is started in the background. Every command resolves the
//! same layout so lifecycle and status commands agree on what exists.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Canonical paths for the artefacts of one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePaths {
    name: String,
    base_dir: PathBuf,
    conf_dir: PathBuf,
    server_config_path: PathBuf,
    deployment_dir: PathBuf,
    logs_dir: PathBuf,
    run_dir: PathBuf,
    pid_path: PathBuf,
}

impl InstancePaths {
    /// Derives the layout of `name` under `root` without touching the disk.
    pub fn new(root: &Path, name: &str) -> Result<Self, InstancePathsError> {
        validate_name(name)?;
        let base_dir = root.join(name);
        let conf_dir = base_dir.join("conf");
        let run_dir = base_dir.join("run");
        Ok(Self {
            name: name.to_owned(),
            server_config_path: conf_dir.join("server.cfg"),
            deployment_dir: conf_dir.join("Catalina").join("localhost"),
            logs_dir: base_dir.join("logs"),
            pid_path: run_dir.join("server.pid"),
            run_dir,
            conf_dir,
            base_dir,
        })
    }

    /// Instance identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding every artefact of the instance.
    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_path()
    }

    /// Configuration directory.
    pub fn conf_dir(&self) -> &Path {
        self.conf_dir.as_path()
    }

    /// Store holding instance metadata and ports.
    pub fn server_config_path(&self) -> &Path {
        self.server_config_path.as_path()
    }

    /// Directory holding subsystem deployment descriptors.
    pub fn deployment_dir(&self) -> &Path {
        self.deployment_dir.as_path()
    }

    /// Log directory for the server process.
    pub fn logs_dir(&self) -> &Path {
        self.logs_dir.as_path()
    }

    /// Directory holding runtime artefacts.
    pub fn run_dir(&self) -> &Path {
        self.run_dir.as_path()
    }

    /// Pid file written when the server is started in the background.
    pub fn pid_path(&self) -> &Path {
        self.pid_path.as_path()
    }

    /// Configuration directory of one subsystem.
    pub fn subsystem_dir(&self, subsystem: &str) -> PathBuf {
        self.conf_dir.join(subsystem)
    }

    /// Configuration store of one subsystem.
    pub fn subsystem_config_path(&self, subsystem: &str) -> PathBuf {
        self.subsystem_dir(subsystem).join("CS.cfg")
    }

    /// Group directory store of one subsystem.
    pub fn group_store_path(&self, subsystem: &str) -> PathBuf {
        self.subsystem_dir(subsystem).join("groups.cfg")
    }

    /// Deployment descriptor whose presence marks a subsystem as enabled.
    pub fn deployment_descriptor_path(&self, subsystem: &str) -> PathBuf {
        self.deployment_dir.join(format!("{subsystem}.xml"))
    }
}

fn validate_name(name: &str) -> Result<(), InstancePathsError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(InstancePathsError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Errors raised while deriving instance paths.
#[derive(Debug, Error)]
pub enum InstancePathsError {
    /// The identifier cannot be used as a directory name.
    #[error("invalid instance name '{name}'")]
    InvalidName { name: String },
}
