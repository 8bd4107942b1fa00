//! # doxyrs Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used by the command handlers. The
//! process runner itself never returns an error: every failure of an external
//! program is described by an `ExecutionResult`. Errors in this module are what
//! a command hands back to `main` once it has decided the run failed.
//!
//! ## Architecture
//!
//! - `DoxyError`: a `thiserror` enum mirroring the failure taxonomy
//!   (configuration, launch, runtime, timeout) plus the host preconditions
//!   (no project, no file open).
//! - `Result<T>`: an alias for `anyhow::Result<T>` so handlers can attach
//!   context with `anyhow::Context`.
//!
//! ## Examples
//!
//! ```rust
//! let result = driver.build_documentation(&root, "Doxyfile", &template).await;
//! if !result.is_success() {
//!     return Err(DoxyError::from(&result).into());
//! }
//! ```
//!
use crate::common::process::{ErrorKind, ExecutionResult};
use thiserror::Error;

/// Custom error type for doxyrs.
#[derive(Error, Debug)]
pub enum DoxyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("No current project: {0}")]
    NoProject(String),

    #[error("No file is open: {0}")]
    NoFileOpen(String),
}

impl From<&ExecutionResult> for DoxyError {
    /// Maps a failed run onto the error taxonomy. A successful result has no
    /// error kind and maps to `Runtime` with an empty message; callers only
    /// convert results they already know failed.
    fn from(result: &ExecutionResult) -> Self {
        let message = result.message().to_string();
        match result.kind() {
            Some(ErrorKind::Configuration) => DoxyError::Config(message),
            Some(ErrorKind::Launch) => DoxyError::Launch(message),
            Some(ErrorKind::Timeout) => DoxyError::Timeout(message),
            Some(ErrorKind::Precondition) => DoxyError::NoProject(message),
            Some(ErrorKind::Runtime) | None => DoxyError::Runtime(message),
        }
    }
}

/// Type alias for Result using anyhow::Error.
pub type Result<T> = anyhow::Result<T>;
