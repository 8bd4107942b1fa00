//! # doxyrs Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the commands of the doxyrs CLI, one per action:
//!
//! - `build`: bootstrap a Doxyfile if needed, then run doxygen
//! - `wizard`: open the Doxyfile in doxywizard
//! - `document`: the comment generation actions (`inline`, `file`,
//!   `opened-project`, `active-project`)
//!
//! Each command defines its clap arguments and an async handler that takes
//! the parsed arguments and the `Session` built in `main.rs`.
//!

/// Builds documentation with doxygen, generating a default Doxyfile first if needed.
pub mod build;
/// Comment generation actions (precondition checks and notice only).
pub mod document;
/// Launches doxywizard on the project's Doxyfile.
pub mod wizard;
