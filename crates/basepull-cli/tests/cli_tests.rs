//! CLI surface tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_every_subcommand() {
    let mut cmd = Command::cargo_bin("basepull").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("daily"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn missing_credentials_fail_fast() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("basepull").unwrap();
    cmd.current_dir(dir.path())
        .env_clear()
        .arg("fetch")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("BASEPULL_APP_ID"));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("basepull").unwrap();
    cmd.arg("mirror").assert().failure().code(2);
}
