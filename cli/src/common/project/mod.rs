//! # doxyrs Project Context (`common::project`)
//!
//! File: cli/src/common/project/mod.rs
//!
//! ## Overview
//!
//! Answers the two questions the commands ask the host: which project is
//! current, and is a file open? On the command line:
//!
//! - the **project root** is the `--project` directory when given, otherwise
//!   the nearest ancestor of the current directory that contains the
//!   configured Doxyfile, a `.doxyrs.toml`, or a `.git` directory;
//! - the **open file** is the `--file` argument, if it exists.
//!
//! ## Architecture
//!
//! Detection walks upwards from the start directory and checks marker entries
//! in priority order at each level, in the same way the configuration loader
//! looks for `.doxyrs.toml`.
//!
use crate::core::config::PROJECT_CONFIG_FILENAME;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the commands need to know about the user's workspace.
pub trait ProjectContext {
    /// Root directory of the current project, if there is one.
    fn current_project_root(&self) -> Option<PathBuf>;
    /// Whether a file is open (the target of per-file actions).
    fn current_editor_open(&self) -> bool;
}

/// Project context resolved from the command line and the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingTree {
    root: Option<PathBuf>,
    file: Option<PathBuf>,
}

impl WorkingTree {
    /// Resolves the project root.
    ///
    /// An explicit `project` directory wins (and yields no project when it is
    /// not a directory). Otherwise the ancestors of `start` are searched for
    /// project markers.
    pub fn discover(
        start: &Path,
        project: Option<&Path>,
        file: Option<PathBuf>,
        doxyfile_name: &str,
    ) -> Self {
        let root = match project {
            Some(dir) if dir.is_dir() => Some(dir.to_path_buf()),
            Some(dir) => {
                debug!("--project {} is not a directory", dir.display());
                None
            }
            None => find_project_root(start, doxyfile_name),
        };
        debug!("Project root: {:?}, open file: {:?}", root, file);
        WorkingTree { root, file }
    }
}

impl ProjectContext for WorkingTree {
    fn current_project_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn current_editor_open(&self) -> bool {
        self.file.as_deref().is_some_and(Path::is_file)
    }
}

/// Finds the nearest ancestor of `start` (inclusive) that looks like a
/// project root.
pub fn find_project_root(start: &Path, doxyfile_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| is_project_root(dir, doxyfile_name))
        .map(Path::to_path_buf)
}

fn is_project_root(dir: &Path, doxyfile_name: &str) -> bool {
    if !doxyfile_name.is_empty() && dir.join(doxyfile_name).is_file() {
        debug!("Found {} in {}", doxyfile_name, dir.display());
        return true;
    }
    if dir.join(PROJECT_CONFIG_FILENAME).is_file() {
        debug!("Found {} in {}", PROJECT_CONFIG_FILENAME, dir.display());
        return true;
    }
    dir.join(".git").is_dir()
}
