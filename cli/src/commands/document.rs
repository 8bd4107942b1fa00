//! # doxyrs Comment Generation Commands
//!
//! File: cli/src/commands/document.rs
//!
//! ## Overview
//!
//! The four comment generation actions: `inline`, `file`, `opened-project`
//! and `active-project`. They check the same preconditions as the real
//! actions (an open file and/or a current project) and then report that
//! comment generation is not available. Running doxygen itself is done by
//! `doxyrs build`.
//!
//! | Command          | Needs `--file` | Needs a project |
//! |------------------|----------------|-----------------|
//! | `inline`         | yes            | no              |
//! | `file`           | yes            | no              |
//! | `opened-project` | yes            | yes             |
//! | `active-project` | no             | yes             |
//!
use crate::common::process::runner::ProcessRunner;
use crate::core::error::{DoxyError, Result};
use crate::core::session::Session;
use anyhow::anyhow;
use clap::Parser;
use tracing::info;

/// Arguments shared by the comment generation commands.
#[derive(Parser, Debug, Default)]
pub struct DocumentArgs {}

/// Which comment generation action was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    Inline,
    File,
    OpenedProject,
    ActiveProject,
}

impl DocumentAction {
    pub fn title(self) -> &'static str {
        match self {
            DocumentAction::Inline => "Create inline documentation",
            DocumentAction::File => "Document current file",
            DocumentAction::OpenedProject => "Document project of opened file",
            DocumentAction::ActiveProject => "Document active project",
        }
    }

    fn needs_file(self) -> bool {
        !matches!(self, DocumentAction::ActiveProject)
    }

    fn needs_project(self) -> bool {
        matches!(
            self,
            DocumentAction::OpenedProject | DocumentAction::ActiveProject
        )
    }
}

/// Handler for the comment generation commands.
pub async fn handle_document<R: ProcessRunner>(
    action: DocumentAction,
    _args: DocumentArgs,
    session: &Session<R>,
) -> Result<()> {
    info!("Handling {:?} command...", action);

    if action.needs_file() && !session.project.current_editor_open() {
        return Err(anyhow!(DoxyError::NoFileOpen(
            "Pass the file to document with --file.".to_string()
        )));
    }
    if action.needs_project() && session.project.current_project_root().is_none() {
        return Err(anyhow!(DoxyError::NoProject(
            "You don't have any current project.".to_string()
        )));
    }

    session.sink.show_pane();
    session.sink.write_line(&format!(
        "{}: comment generation is not available; use `doxyrs build` to run doxygen.",
        action.title()
    ));
    Ok(())
}
