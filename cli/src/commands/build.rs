//! # doxyrs Build Command
//!
//! File: cli/src/commands/build.rs
//!
//! ## Overview
//!
//! Implements `doxyrs build`: run doxygen on the current project, generating
//! a default configuration file first when the project has none.
//!
//! ## Workflow
//!
//! 1. Resolve the project root (error if there is no current project).
//! 2. `config_path = <root>/<doxyfile>`.
//! 3. If `config_path` does not exist, run `doxygen -g <config_path>` to
//!    bootstrap it. A failed bootstrap ends the build with that result.
//! 4. Run `doxygen <config_path>` in the project root.
//!
//! Every step writes the command line, its streamed output and its final
//! message to the output sink.
//!
//! Only a project is required: `build` does not need a file passed with
//! `--file`.
//!
//! ## Usage
//!
//! ```bash
//! # From anywhere inside the project
//! doxyrs build
//!
//! # Explicit project and a shorter timeout
//! doxyrs --project ~/code/engine --timeout 30 build
//! ```
//!
use crate::common::process::runner::ProcessRunner;
use crate::common::process::{ExecutionResult, Invocation, StreamEvent};
use crate::common::ui::OutputSink;
use crate::core::config::template_from;
use crate::core::error::{DoxyError, Result};
use crate::core::session::Session;
use anyhow::anyhow;
use clap::Parser;
use std::path::Path;
use tracing::{debug, info, warn};

/// Arguments for `doxyrs build`.
#[derive(Parser, Debug, Default)]
#[command(
    name = "build",
    about = "Build the project's doxygen documentation",
    long_about = "Runs doxygen on the project's configuration file, generating a default\n\
                  one with `doxygen -g` first if it does not exist yet."
)]
pub struct BuildArgs {}

/// Sequences the bootstrap and build runs of doxygen.
pub struct DocumentationDriver<'a, R: ProcessRunner> {
    runner: &'a R,
    sink: &'a dyn OutputSink,
}

impl<'a, R: ProcessRunner> DocumentationDriver<'a, R> {
    pub fn new(runner: &'a R, sink: &'a dyn OutputSink) -> Self {
        DocumentationDriver { runner, sink }
    }

    /// Builds the documentation of the project at `project_root`.
    ///
    /// `template` supplies the executable, timeout and extra arguments; its
    /// arguments are appended after the step's own arguments. Returns the
    /// result of the first failing step, or of the build step.
    pub async fn build_documentation(
        &self,
        project_root: &Path,
        config_file_name: &str,
        template: &Invocation,
    ) -> ExecutionResult {
        if project_root.as_os_str().is_empty() {
            let result = ExecutionResult::precondition_failed("No project is open.");
            self.sink.show_pane();
            self.sink.write_line(result.message());
            return result;
        }

        let config_path = project_root.join(config_file_name);
        let config_arg = config_path.to_string_lossy().into_owned();

        if !config_path.exists() {
            info!(
                "{} not found, generating a default configuration",
                config_path.display()
            );
            let bootstrap = template.derive(["-g", config_arg.as_str()], project_root);
            let result = self.run_step(&bootstrap).await;
            if !result.is_success() {
                warn!("Bootstrap failed, not building: {}", result.message());
                return result;
            }
        } else {
            debug!("Using existing {}", config_path.display());
        }

        let build = template.derive([config_arg], project_root);
        self.run_step(&build).await
    }

    async fn run_step(&self, invocation: &Invocation) -> ExecutionResult {
        let sink = self.sink;
        sink.show_pane();
        sink.write_line(&format!("Executing: {}", invocation.display_command()));

        let result = self
            .runner
            .execute(invocation, &mut |event: &StreamEvent| {
                if !event.text.is_empty() {
                    sink.write_line(&event.text);
                }
            })
            .await;

        if result.is_success() {
            sink.write_line(&format!("{} finished successfully.", invocation.executable));
        } else {
            sink.write_line(result.message());
        }
        result
    }
}

/// Handler for `doxyrs build`.
pub async fn handle_build<R: ProcessRunner>(_args: BuildArgs, session: &Session<R>) -> Result<()> {
    info!("Handling build command...");

    let Some(project_root) = session.project.current_project_root() else {
        return Err(anyhow!(DoxyError::NoProject(
            "You don't have any current project.".to_string()
        )));
    };

    let template = template_from(session.settings.as_ref());
    let driver = DocumentationDriver::new(&session.runner, session.sink.as_ref());
    let result = driver
        .build_documentation(&project_root, session.settings.config_file_name(), &template)
        .await;

    if result.is_success() {
        Ok(())
    } else {
        Err(anyhow!(DoxyError::from(&result)))
    }
}
