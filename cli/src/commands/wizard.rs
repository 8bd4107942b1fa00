//! # doxyrs Wizard Command
//!
//! File: cli/src/commands/wizard.rs
//!
//! ## Overview
//!
//! Implements `doxyrs wizard`: open the project's doxygen configuration in
//! `doxywizard`. The wizard is started detached in the project root with the
//! configured Doxyfile name as its only argument; doxyrs does not wait for it.
//!
//! ```bash
//! doxyrs wizard
//! ```
//!
use crate::common::process::runner::ProcessRunner;
use crate::core::error::{DoxyError, Result};
use crate::core::session::Session;
use anyhow::anyhow;
use clap::Parser;
use tracing::{info, warn};

/// Arguments for `doxyrs wizard`.
#[derive(Parser, Debug, Default)]
#[command(name = "wizard", about = "Edit the project's Doxyfile with doxywizard")]
pub struct WizardArgs {}

/// Handler for `doxyrs wizard`.
pub async fn handle_wizard<R: ProcessRunner>(_args: WizardArgs, session: &Session<R>) -> Result<()> {
    info!("Handling wizard command...");

    // Only a project is needed; no file has to be open.
    let Some(project_root) = session.project.current_project_root() else {
        return Err(anyhow!(DoxyError::NoProject(
            "You don't have any current project.".to_string()
        )));
    };

    let executable = session.settings.wizard_executable_path();
    let arguments = vec![session.settings.config_file_name().to_string()];

    match session
        .launcher
        .start_detached(executable, &arguments, &project_root)
    {
        Ok(()) => {
            session
                .sink
                .write_line(&format!("Started {} {}", executable, arguments[0]));
            Ok(())
        }
        Err(e) => {
            warn!("Failed to launch '{}': {}", executable, e);
            session.sink.show_pane();
            session
                .sink
                .write_line(&format!("Failed to launch {}", executable));
            Err(anyhow!(DoxyError::Launch(format!(
                "Failed to launch {}: {}",
                executable, e
            ))))
        }
    }
}
