//! # doxyrs Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the doxyrs CLI. It:
//! - parses command-line arguments using Clap,
//! - sets up logging based on the verbosity flags,
//! - loads the configuration and builds the `Session` (the collaborators every
//!   command uses),
//! - routes to the command handler and reports its error, if any.
//!
//! ## Examples
//!
//! ```bash
//! # Build the documentation of the project containing the current directory
//! doxyrs build
//!
//! # Use another doxygen and show debug logs
//! doxyrs -vv --doxygen /opt/doxygen/bin/doxygen build
//!
//! # Edit the Doxyfile of a given project
//! doxyrs --project ~/code/engine wizard
//! ```
//!
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // One module per action (build, wizard, document)
mod common; // Process execution, project discovery, output sink
mod core; // Configuration, errors, session

use crate::commands::{build, document, wizard};
use crate::common::project::WorkingTree;
use crate::core::config::{load_config, Overrides};
use crate::core::error::Result;
use crate::core::session::Session;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "doxyrs",
    about = "Run doxygen for a project: bootstrap a Doxyfile, build documentation, launch doxywizard",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Project root (default: detected from the current directory).
    #[arg(long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,
    /// The file to document, for the per-file actions.
    #[arg(long, global = true, value_name = "FILE")]
    file: Option<PathBuf>,
    /// Doxygen executable, overriding the configuration.
    #[arg(long, global = true, env = "DOXYRS_DOXYGEN", value_name = "EXE")]
    doxygen: Option<String>,
    /// Timeout for each doxygen run, in seconds.
    #[arg(long, global = true, env = "DOXYRS_TIMEOUT", value_name = "SECS")]
    timeout: Option<u64>,
}

/// The actions doxyrs offers.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create inline documentation
    Inline(document::DocumentArgs),
    /// Document the whole file given with --file
    File(document::DocumentArgs),
    /// Document the whole project of the file given with --file
    OpenedProject(document::DocumentArgs),
    /// Document the active project
    ActiveProject(document::DocumentArgs),
    /// Build the documentation with doxygen
    #[command(alias = "b")]
    Build(build::BuildArgs),
    /// Edit the Doxyfile with doxywizard
    #[command(alias = "w")]
    Wizard(wizard::WizardArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Loads the configuration, wires the session and dispatches the command.
async fn run(cli: Cli) -> Result<()> {
    let start_dir = std::env::current_dir().context("Failed to get current directory")?;
    // Relative --project paths would otherwise resolve differently for the child.
    let project_dir = cli.project.as_ref().map(|dir| start_dir.join(dir));
    let file = cli.file.as_ref().map(|file| start_dir.join(file));

    let overrides = Overrides {
        command: cli.doxygen.clone(),
        timeout_secs: cli.timeout,
    };
    let config = load_config(project_dir.as_deref().unwrap_or(&start_dir), &overrides)?;
    let settings = config.doxygen;

    let project = WorkingTree::discover(&start_dir, project_dir.as_deref(), file, &settings.doxyfile);
    let session = Session::new(Box::new(settings), Box::new(project));

    match cli.command {
        Commands::Inline(args) => {
            document::handle_document(document::DocumentAction::Inline, args, &session).await
        }
        Commands::File(args) => {
            document::handle_document(document::DocumentAction::File, args, &session).await
        }
        Commands::OpenedProject(args) => {
            document::handle_document(document::DocumentAction::OpenedProject, args, &session)
                .await
        }
        Commands::ActiveProject(args) => {
            document::handle_document(document::DocumentAction::ActiveProject, args, &session)
                .await
        }
        Commands::Build(args) => build::handle_build(args, &session).await,
        Commands::Wizard(args) => wizard::handle_wizard(args, &session).await,
    }
}
