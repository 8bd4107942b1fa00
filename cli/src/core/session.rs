//! # doxyrs Session (Composition Root)
//!
//! File: cli/src/core/session.rs
//!
//! ## Overview
//!
//! A `Session` is built once in `main` and owns the collaborators every
//! command needs: the settings, the process runner, the detached launcher,
//! the output sink and the project context. Commands borrow it; nothing is
//! reached through globals.
//!
//! The runner is a type parameter because `ProcessRunner` uses async trait
//! methods; the other collaborators are trait objects so tests can swap them
//! individually.
//!
use crate::common::process::launcher::{DetachedLauncher, Launcher};
use crate::common::process::runner::{ProcessRunner, TokioProcessRunner};
use crate::common::project::ProjectContext;
use crate::common::ui::{ConsoleSink, OutputSink};
use crate::core::config::SettingsProvider;

pub struct Session<R: ProcessRunner> {
    pub settings: Box<dyn SettingsProvider>,
    pub runner: R,
    pub launcher: Box<dyn Launcher>,
    pub sink: Box<dyn OutputSink>,
    pub project: Box<dyn ProjectContext>,
}

impl Session<TokioProcessRunner> {
    /// The production wiring: tokio runner, detached launcher, console output.
    pub fn new(settings: Box<dyn SettingsProvider>, project: Box<dyn ProjectContext>) -> Self {
        Session {
            settings,
            runner: TokioProcessRunner,
            launcher: Box::new(DetachedLauncher),
            sink: Box::new(ConsoleSink::stdout()),
            project,
        }
    }
}
