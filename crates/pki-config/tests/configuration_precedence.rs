//! Layering checks for configuration files, environment, and CLI flags.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use pki_config::{Config, DEFAULT_INSTANCE_ROOT, LogFormat};
use rstest::{fixture, rstest};
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serialises environment access and restores overrides on drop.
struct EnvGuard {
    overrides: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn acquire() -> Self {
        let lock = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self {
            overrides: Vec::new(),
            _lock: lock,
        }
    }

    fn set(&mut self, key: &'static str, value: &OsStr) {
        self.overrides.push((key, std::env::var_os(key)));
        // Environment mutation is unsafe on the 2024 edition; the guard holds
        // the mutex and restores the previous value on drop.
        unsafe { std::env::set_var(key, value) };
    }

    fn clear(&mut self, key: &'static str) {
        self.overrides.push((key, std::env::var_os(key)));
        unsafe { std::env::remove_var(key) };
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.overrides.pop() {
            match previous {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

#[fixture]
fn env() -> EnvGuard {
    let mut guard = EnvGuard::acquire();
    guard.clear("PKI_INSTANCE_ROOT");
    guard.clear("PKI_LOG_FORMAT");
    guard.clear("PKI_CONFIG_PATH");
    guard
}

fn write_config(dir: &TempDir, contents: &str) -> OsString {
    let path = dir.path().join("pki-server.toml");
    fs::write(&path, contents).expect("write configuration file");
    path.into_os_string()
}

fn load(args: &[&OsStr]) -> Config {
    let mut argv = vec![OsString::from("pki-server")];
    argv.extend(args.iter().map(|arg| arg.to_os_string()));
    Config::load_from_iter(argv).expect("configuration loads")
}

#[rstest]
fn defaults_apply_without_overrides(env: EnvGuard) {
    let config = load(&[]);
    assert_eq!(config.instance_root().as_str(), DEFAULT_INSTANCE_ROOT);
    assert_eq!(config.log_format(), LogFormat::Compact);
    drop(env);
}

#[rstest]
fn file_overrides_defaults(env: EnvGuard) {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "instance_root = \"/srv/from-file\"\n");
    let config = load(&[OsStr::new("--config-path"), path.as_os_str()]);
    assert_eq!(config.instance_root().as_str(), "/srv/from-file");
    drop(env);
}

#[rstest]
fn environment_overrides_file(mut env: EnvGuard) {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "instance_root = \"/srv/from-file\"\n");
    env.set("PKI_INSTANCE_ROOT", OsStr::new("/srv/from-env"));
    let config = load(&[OsStr::new("--config-path"), path.as_os_str()]);
    assert_eq!(config.instance_root().as_str(), "/srv/from-env");
}

#[rstest]
fn cli_overrides_environment(mut env: EnvGuard) {
    env.set("PKI_INSTANCE_ROOT", OsStr::new("/srv/from-env"));
    let config = load(&[OsStr::new("--instance-root"), OsStr::new("/srv/from-cli")]);
    assert_eq!(config.instance_root().as_str(), "/srv/from-cli");
}

#[rstest]
fn log_format_parses_from_environment(mut env: EnvGuard) {
    env.set("PKI_LOG_FORMAT", OsStr::new("json"));
    let config = load(&[]);
    assert_eq!(config.log_format(), LogFormat::Json);
}
