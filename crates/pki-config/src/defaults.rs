use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Instance identifier used when a command omits one.
pub const DEFAULT_INSTANCE_NAME: &str = "pki-tomcat";

/// Directory holding instance directories.
pub const DEFAULT_INSTANCE_ROOT: &str = "/var/lib/pki";

/// Program launched to host an instance.
pub const DEFAULT_SERVER_COMMAND: &str = "pki-server-daemon";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default per-attempt readiness check budget in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default bound for `--wait` in seconds.
pub const DEFAULT_MAX_WAIT_SECS: u64 = 60;

/// Default directory holding instance directories.
pub fn default_instance_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_INSTANCE_ROOT)
}

/// Default program launched to host an instance.
pub fn default_server_command() -> String {
    DEFAULT_SERVER_COMMAND.to_owned()
}

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default diagnostics format.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default per-attempt readiness check budget in seconds.
pub fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}
