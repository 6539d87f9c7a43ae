//! Shared configuration for the `pki-server` tool.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, an optional
//! TOML file (`--config-path` or `PKI_CONFIG_PATH`), `PKI_*` environment
//! variables, and finally the configuration flags given before the command on
//! the command line. The crate also owns the on-disk layout of an instance so
//! every consumer agrees on where configuration stores and pid files live.

mod defaults;
mod logging;
mod paths;

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_INSTANCE_NAME, DEFAULT_INSTANCE_ROOT,
    DEFAULT_LOG_FILTER, DEFAULT_MAX_WAIT_SECS, DEFAULT_SERVER_COMMAND,
    default_connect_timeout_secs, default_instance_root, default_log_filter,
    default_log_filter_string, default_log_format, default_server_command,
};
pub use logging::LogFormat;
pub use paths::{InstancePaths, InstancePathsError};

/// Tool-wide configuration resolved before any command runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PKI")]
pub struct Config {
    /// Directory holding one sub-directory per instance.
    #[serde(default = "default_instance_root")]
    #[ortho_config(default = default_instance_root())]
    pub instance_root: Utf8PathBuf,
    /// Program launched to host an instance.
    #[serde(default = "default_server_command")]
    #[ortho_config(default = default_server_command())]
    pub server_command: String,
    /// Base `tracing` filter used when no verbosity flag is given.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for diagnostics written to stderr.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Upper bound, in seconds, for a single readiness connection attempt.
    #[serde(default = "default_connect_timeout_secs")]
    #[ortho_config(default = default_connect_timeout_secs())]
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instance_root: default_instance_root(),
            server_command: default_server_command(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Config {
    /// Directory holding instance directories.
    pub fn instance_root(&self) -> &Utf8PathBuf {
        &self.instance_root
    }

    /// Program launched to host an instance.
    pub fn server_command(&self) -> &str {
        &self.server_command
    }

    /// Base log filter expression.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Configured diagnostics format.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Per-attempt budget for readiness checks.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Resolves the on-disk layout of the named instance.
    pub fn instance_paths(&self, name: &str) -> Result<InstancePaths, InstancePathsError> {
        InstancePaths::new(self.instance_root.as_std_path(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_documented_values() {
        let config = Config::default();
        assert_eq!(config.instance_root().as_str(), DEFAULT_INSTANCE_ROOT);
        assert_eq!(config.server_command(), DEFAULT_SERVER_COMMAND);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(
            config.connect_timeout(),
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn instance_paths_hang_off_the_instance_root() {
        let config = Config {
            instance_root: Utf8PathBuf::from("/srv/pki"),
            ..Config::default()
        };
        let paths = config.instance_paths("pki-tomcat").expect("paths");
        assert_eq!(paths.base_dir(), std::path::Path::new("/srv/pki/pki-tomcat"));
    }
}
