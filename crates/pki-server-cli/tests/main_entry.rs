//! Integration tests for the `pki-server` binary entry point.
//!
//! Verifies help output, configuration flags placed before the command, and
//! the exit status reported for a missing instance.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn help_succeeds() {
    let mut command = cargo_bin_cmd!("pki-server");
    command.arg("--help");
    command.assert().success().stdout(contains("status"));
}

#[test]
fn status_of_missing_instance_exits_with_failure() {
    let root = TempDir::new().expect("instance root");
    let mut command = cargo_bin_cmd!("pki-server");
    command
        .env_remove("PKI_INSTANCE_ROOT")
        .arg("--instance-root")
        .arg(root.path())
        .args(["status", "missing"]);
    command
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("ERROR: Invalid instance: missing"));
}

#[test]
fn subsystem_command_on_fresh_instance_reports_missing_subsystem() {
    let root = TempDir::new().expect("instance root");
    let run = |args: &[&str]| {
        let mut command = cargo_bin_cmd!("pki-server");
        command
            .env_remove("PKI_INSTANCE_ROOT")
            .arg("--instance-root")
            .arg(root.path())
            .args(args);
        command
    };

    run(&["create", "--user", "pkiuser"]).assert().success();
    run(&["ca", "config", "find"])
        .assert()
        .failure()
        .stderr(contains("No CA subsystem in instance pki-tomcat"));
}
