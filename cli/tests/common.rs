//! # doxyrs CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and gets the `doxyrs` binary wrapped in an
//! `assert_cmd::Command` that is isolated from the user's own configuration.
//!

// Not every test file uses every helper.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns a `Command` for the `doxyrs` binary with the user config directory
/// pointed at `config_home` and the environment overrides cleared.
pub fn doxyrs_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("doxyrs").expect("Failed to find doxyrs binary for testing");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("DOXYRS_DOXYGEN")
        .env_remove("DOXYRS_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Creates a project directory (marked by a `.git` directory) under `parent`.
pub fn make_project(parent: &Path) -> PathBuf {
    let root = parent.join("proj");
    fs::create_dir_all(root.join(".git")).expect("Failed to create project");
    root
}

/// Writes an executable shell script standing in for doxygen.
///
/// With `-g <file>` it writes a stub configuration file; otherwise it prints
/// its arguments on stdout and a warning on stderr.
#[cfg(unix)]
pub fn fake_doxygen(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-doxygen");
    fs::write(
        &script,
        r##"#!/bin/sh
if [ "$1" = "-g" ]; then
  echo "# generated" > "$2"
  echo "Configuration file '$2' created."
  exit 0
fi
echo "building with $*"
echo "warning: no sources" 1>&2
exit 0
"##,
    )
    .expect("Failed to write fake doxygen");
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}
