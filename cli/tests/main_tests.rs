//! # doxyrs CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `doxyrs` binary: `--version`, `--help` and
//! argument errors.
//!

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_version_flag() {
    let home = tempdir().unwrap();
    doxyrs_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_actions() {
    let home = tempdir().unwrap();
    doxyrs_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("wizard"))
        .stdout(predicate::str::contains("opened-project"))
        .stdout(predicate::str::contains("active-project"));
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    let home = tempdir().unwrap();
    doxyrs_cmd(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_invalid_timeout_is_rejected() {
    let home = tempdir().unwrap();
    doxyrs_cmd(home.path())
        .args(["build", "--timeout", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}
