//! # doxyrs Detached Launcher (`common::process::launcher`)
//!
//! File: cli/src/common/process/launcher.rs
//!
//! Starts a program that outlives the command (used for `doxywizard`). There is
//! no output capture and no timeout; the only thing reported back is whether
//! the program could be started.
//!
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Fire-and-forget program start.
pub trait Launcher {
    /// Starts `executable` detached from the current process. `Ok(())` means
    /// the program was started, not that it succeeded.
    fn start_detached(&self, executable: &str, arguments: &[String], working_dir: &Path) -> io::Result<()>;
}

/// `Launcher` based on `std::process::Command` with all stdio detached.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl Launcher for DetachedLauncher {
    fn start_detached(&self, executable: &str, arguments: &[String], working_dir: &Path) -> io::Result<()> {
        if executable.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                super::NO_EXECUTABLE,
            ));
        }
        debug!(
            "Launching detached: {} {:?} in {}",
            executable,
            arguments,
            working_dir.display()
        );
        let child = Command::new(executable)
            .args(arguments)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        info!("Started '{}' with pid {}", executable, child.id());
        // Not waited on: the program keeps running after we exit.
        drop(child);
        Ok(())
    }
}
