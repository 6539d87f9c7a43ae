//! Ordered `key=value` configuration store.
//!
//! Every persisted artefact of an instance (server metadata, subsystem
//! configuration, group directories) uses the same line-oriented layout: one
//! `key=value` entry per line, split at the first `=`, with blank lines and
//! `#` comments ignored on load. Entry order is preserved so `find` output
//! mirrors the file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;
use thiserror::Error;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// In-memory view of one configuration file.
///
/// Mutations stay in memory until [`ConfigStore::persist`] succeeds; a fresh
/// [`ConfigStore::load`] of the same path never observes unsaved changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl ConfigStore {
    /// Creates an empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Loads the store at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let entries = parse_entries(&path, &content)?;
        Ok(Self { path, entries })
    }

    /// Loads the store at `path`, treating a missing file as empty.
    pub fn load_or_empty(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match Self::load(path.clone()) {
            Ok(store) => Ok(store),
            Err(error) if error.is_not_found() => Ok(Self::empty(path)),
            Err(error) => Err(error),
        }
    }

    /// File backing the store.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Stores `value` under `key`, keeping the position of an existing entry.
    ///
    /// Entries that the line format cannot represent are rejected, so every
    /// accepted entry reads back unchanged after `persist` and `load`.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StoreError> {
        let key = key.into();
        let value = value.into();
        if let Some(reason) = unrepresentable(&key, &value) {
            return Err(StoreError::InvalidEntry { key, reason });
        }
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        Ok(())
    }

    /// Removes `key`, returning whether a value was present.
    pub fn unset(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(name, _)| name != key);
        self.entries.len() != before
    }

    /// Iterates over entries in insertion order.
    pub fn find(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the store to disk.
    ///
    /// The content is written to a temporary file in the target directory,
    /// synced, and renamed over the target so a crash never leaves a
    /// partially written store behind.
    pub fn persist(&self) -> Result<(), StoreError> {
        atomic_write(&self.path, self.render().as_bytes()).map_err(|source| {
            StoreError::Persist {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn render(&self) -> String {
        let mut output = String::new();
        for (key, value) in &self.entries {
            output.push_str(key);
            output.push('=');
            output.push_str(value);
            output.push('\n');
        }
        output
    }
}

fn unrepresentable(key: &str, value: &str) -> Option<&'static str> {
    let breaks_line = |text: &str| text.contains(['\n', '\r']);
    if key.trim().is_empty() {
        Some("key is empty")
    } else if key.trim() != key {
        Some("key has surrounding whitespace")
    } else if key.starts_with('#') {
        Some("key starts with a comment marker")
    } else if key.contains('=') {
        Some("key contains '='")
    } else if breaks_line(key) || breaks_line(value) {
        Some("entry contains a line break")
    } else {
        None
    }
}

fn parse_entries(path: &Path, content: &str) -> Result<Vec<(String, String)>, StoreError> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(StoreError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(StoreError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
            });
        }
        // Later duplicates win but keep the first position.
        match entries.iter_mut().find(|(name, _)| name == key) {
            Some(entry) => entry.1 = value.to_owned(),
            None => entries.push((key.to_owned(), value.to_owned())),
        }
    }
    Ok(entries)
}

fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "target path did not have a parent directory",
        )
    })?;

    let mut builder = Builder::new();
    builder.prefix(
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("store"),
    );
    #[cfg(unix)]
    {
        builder.permissions(fs::Permissions::from_mode(0o640));
    }

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

/// Errors raised while loading or persisting a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A non-comment line lacked a `key=value` shape.
    #[error("malformed entry at {path:?} line {line}")]
    Parse { path: PathBuf, line: usize },
    /// The entry cannot be written as a single `key=value` line.
    #[error("cannot store {key:?}: {reason}")]
    InvalidEntry { key: String, reason: &'static str },
    /// Writing the store failed.
    #[error("failed to persist {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Returns `true` when the store file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
