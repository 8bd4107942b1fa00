//! # doxyrs Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by all commands:
//! - `config`: configuration loading, merging and validation
//! - `error`: error types and the crate-wide `Result` alias
//! - `session`: the composition root handed to every command
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{DoxyError, Result}; // For error handling
//! use crate::core::session::Session; // Collaborators for a command
//! ```
//!
pub mod config;
pub mod error;
pub mod session;
