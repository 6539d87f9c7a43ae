//! Group membership directory of a subsystem.
//!
//! Group administration is an external concern; the tool only lists groups,
//! lists members, and adds members. [`GroupDirectory`] is the seam, and
//! [`FileGroupDirectory`] backs it with the subsystem's `groups.cfg` store,
//! one `group=member,member` entry per group.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::store::{ConfigStore, StoreError};

/// Access to a subsystem's groups.
pub trait GroupDirectory {
    /// Group identifiers in directory order.
    fn groups(&self) -> Result<Vec<String>, GroupError>;

    /// Members of `group`.
    fn members(&self, group: &str) -> Result<Vec<String>, GroupError>;

    /// Adds `member` to `group`. Adding an existing member is a no-op.
    fn add_member(&mut self, group: &str, member: &str) -> Result<(), GroupError>;
}

/// Errors raised by a group directory.
#[derive(Debug, Error)]
pub enum GroupError {
    /// The group does not exist.
    #[error("no such group: {group}")]
    NoSuchGroup { group: String },
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Group directory stored next to the subsystem configuration.
#[derive(Debug, Clone)]
pub struct FileGroupDirectory {
    store: ConfigStore,
}

impl FileGroupDirectory {
    /// Opens the directory at `path`; a missing file holds no groups.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GroupError> {
        Ok(Self {
            store: ConfigStore::load_or_empty(path)?,
        })
    }
}

fn split_members(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .map(str::to_owned)
        .collect()
}

impl GroupDirectory for FileGroupDirectory {
    fn groups(&self) -> Result<Vec<String>, GroupError> {
        Ok(self.store.find().map(|(group, _)| group.to_owned()).collect())
    }

    fn members(&self, group: &str) -> Result<Vec<String>, GroupError> {
        self.store
            .get(group)
            .map(split_members)
            .ok_or_else(|| GroupError::NoSuchGroup {
                group: group.to_owned(),
            })
    }

    fn add_member(&mut self, group: &str, member: &str) -> Result<(), GroupError> {
        let mut members = self.members(group)?;
        if members.iter().any(|existing| existing == member) {
            debug!(
                target: "pki_instance::groups",
                group,
                member,
                "member already present"
            );
            return Ok(());
        }
        members.push(member.to_owned());
        self.store.set(group, members.join(","))?;
        self.store.persist()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn seeded() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("groups.cfg");
        fs::write(
            &path,
            "Administrators=caadmin\nCertificate Manager Agents=caadmin, agent1\nAuditors=\n",
        )
        .expect("seed groups");
        (dir, path)
    }

    #[rstest]
    fn lists_groups_in_file_order(seeded: (TempDir, PathBuf)) {
        let directory = FileGroupDirectory::open(&seeded.1).expect("open");
        assert_eq!(
            directory.groups().expect("groups"),
            ["Administrators", "Certificate Manager Agents", "Auditors"]
        );
    }

    #[rstest]
    #[case("Certificate Manager Agents", &["caadmin", "agent1"])]
    #[case("Auditors", &[])]
    fn lists_members(
        seeded: (TempDir, PathBuf),
        #[case] group: &str,
        #[case] expected: &[&str],
    ) {
        let directory = FileGroupDirectory::open(&seeded.1).expect("open");
        assert_eq!(directory.members(group).expect("members"), expected);
    }

    #[rstest]
    fn add_member_persists(seeded: (TempDir, PathBuf)) {
        let mut directory = FileGroupDirectory::open(&seeded.1).expect("open");
        directory.add_member("Auditors", "auditor1").expect("add");
        directory.add_member("Auditors", "auditor1").expect("re-add");

        let reopened = FileGroupDirectory::open(&seeded.1).expect("reopen");
        assert_eq!(reopened.members("Auditors").expect("members"), ["auditor1"]);
    }

    #[rstest]
    fn unknown_group_is_reported(seeded: (TempDir, PathBuf)) {
        let mut directory = FileGroupDirectory::open(&seeded.1).expect("open");
        let error = directory.add_member("Nobody", "x").expect_err("missing group");
        assert!(matches!(error, GroupError::NoSuchGroup { ref group } if group == "Nobody"));
    }

    #[test]
    fn missing_store_has_no_groups() {
        let dir = TempDir::new().expect("temp dir");
        let directory = FileGroupDirectory::open(dir.path().join("groups.cfg")).expect("open");
        assert!(directory.groups().expect("groups").is_empty());
    }
}
