//! Pid file handling for background server processes.
//!
//! The pid file lives in the instance's `run/` directory and is accessed
//! through a capability handle on that directory.

use std::io;
use std::path::Path;

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use pki_config::InstancePaths;

use super::error::LifecycleError;

fn pid_file_name(paths: &InstancePaths) -> &str {
    paths
        .pid_path()
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("server.pid")
}

fn open_run_dir(path: &Path) -> Result<Option<Dir>, LifecycleError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LifecycleError::OpenRuntimeDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reads the recorded pid; a missing or empty file yields `None`.
pub(crate) fn read_pid(paths: &InstancePaths) -> Result<Option<u32>, LifecycleError> {
    let Some(dir) = open_run_dir(paths.run_dir())? else {
        return Ok(None);
    };
    let content = match dir.read_to_string(pid_file_name(paths)) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LifecycleError::ReadPid {
                path: paths.pid_path().to_path_buf(),
                source,
            });
        }
    };
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|source| LifecycleError::ParsePid {
            path: paths.pid_path().to_path_buf(),
            source,
        })
}

/// Records `pid`, creating the runtime directory when needed.
pub(crate) fn write_pid(paths: &InstancePaths, pid: u32) -> Result<(), LifecycleError> {
    let write_error = |source| LifecycleError::WritePid {
        path: paths.pid_path().to_path_buf(),
        source,
    };
    std::fs::create_dir_all(paths.run_dir()).map_err(write_error)?;
    let dir = Dir::open_ambient_dir(paths.run_dir(), ambient_authority()).map_err(|source| {
        LifecycleError::OpenRuntimeDir {
            path: paths.run_dir().to_path_buf(),
            source,
        }
    })?;
    dir.write(pid_file_name(paths), format!("{pid}\n"))
        .map_err(write_error)
}

/// Removes the pid file; a missing file is not an error.
pub(crate) fn remove_pid(paths: &InstancePaths) -> Result<(), LifecycleError> {
    let Some(dir) = open_run_dir(paths.run_dir())? else {
        return Ok(());
    };
    match dir.remove_file(pid_file_name(paths)) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LifecycleError::WritePid {
            path: paths.pid_path().to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn paths() -> (TempDir, InstancePaths) {
        let dir = TempDir::new().expect("temp dir");
        let paths = InstancePaths::new(dir.path(), "pki-tomcat").expect("paths");
        (dir, paths)
    }

    #[rstest]
    fn write_then_read_then_remove(paths: (TempDir, InstancePaths)) {
        let (_dir, paths) = paths;
        assert_eq!(read_pid(&paths).expect("read"), None);
        write_pid(&paths, 4242).expect("write");
        assert_eq!(read_pid(&paths).expect("read"), Some(4242));
        remove_pid(&paths).expect("remove");
        assert_eq!(read_pid(&paths).expect("read"), None);
        remove_pid(&paths).expect("second remove");
    }

    #[rstest]
    #[case::empty("", None)]
    #[case::whitespace("  \n", None)]
    #[case::padded(" 17\n", Some(17))]
    fn read_tolerates_whitespace(
        paths: (TempDir, InstancePaths),
        #[case] content: &str,
        #[case] expected: Option<u32>,
    ) {
        let (_dir, paths) = paths;
        fs::create_dir_all(paths.run_dir()).expect("run dir");
        fs::write(paths.pid_path(), content).expect("pid file");
        assert_eq!(read_pid(&paths).expect("read"), expected);
    }

    #[rstest]
    fn read_rejects_garbage(paths: (TempDir, InstancePaths)) {
        let (_dir, paths) = paths;
        fs::create_dir_all(paths.run_dir()).expect("run dir");
        fs::write(paths.pid_path(), "not-a-pid").expect("pid file");
        let error = read_pid(&paths).expect_err("garbage");
        assert!(matches!(error, LifecycleError::ParsePid { .. }));
    }
}
