//! # doxyrs Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the commands, kept apart from the command
//! logic (`commands::`) and the core infrastructure (`core::`):
//!
//! - **`process`**: running external programs (bounded runner with streaming
//!   output, detached launcher) and the types describing a run.
//! - **`project`**: locating the current project root and the open file.
//! - **`ui`**: the output sink user-facing text is written to.
//!
//! ```rust
//! use crate::common::{process, project, ui};
//! ```
//!

/// Running external programs and describing their outcome.
pub mod process;
/// Project root discovery and the host's project context.
pub mod project;
/// Output sink for user-facing progress and result text.
pub mod ui;
