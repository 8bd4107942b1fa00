//! # doxyrs Process Execution (`common::process`)
//!
//! File: cli/src/common/process/mod.rs
//!
//! ## Overview
//!
//! Everything needed to run an external program on behalf of a command:
//!
//! - **`Invocation`**: what to run (executable, arguments, working directory,
//!   timeout, whether stdout is streamed).
//! - **`StreamEvent`**: one buffered chunk of output delivered while the
//!   program is still running.
//! - **`ExecutionResult`**: the single terminal result of a run, with the
//!   full captured output and a user-facing message.
//! - **`runner`**: the `ProcessRunner` trait and its tokio implementation
//!   (timeout, streaming, outcome classification).
//! - **`launcher`**: fire-and-forget start of detached programs (doxywizard).
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::process::{Invocation, runner::{ProcessRunner, TokioProcessRunner}};
//!
//! let invocation = Invocation::new("doxygen")
//!     .args(["Doxyfile"])
//!     .current_dir("/proj")
//!     .timeout_secs(120)
//!     .stream_stdout(true);
//! let result = TokioProcessRunner.execute(&invocation, &mut |event| print!("{}", event.text)).await;
//! if !result.is_success() {
//!     eprintln!("{}", result.message());
//! }
//! ```
//!
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Detached program launching (no capture, no timeout).
pub mod launcher;
/// The bounded process runner.
pub mod runner;

/// Message used when an invocation has no executable configured.
pub const NO_EXECUTABLE: &str = "no executable specified";

/// A single request to run an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run. Looked up on `PATH` when not a path.
    pub executable: String,
    /// Arguments, in order.
    pub arguments: Vec<String>,
    /// Working directory. `None` inherits the current directory.
    pub working_directory: Option<PathBuf>,
    /// How long the program may run before it is killed.
    pub timeout: Duration,
    /// Deliver stdout chunks to the listener. Stderr is always delivered and
    /// stdout is always captured into the result.
    pub stream_stdout: bool,
}

impl Invocation {
    /// Default timeout, in seconds, for building documentation.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    pub fn new(executable: impl Into<String>) -> Self {
        Invocation {
            executable: executable.into(),
            arguments: Vec::new(),
            working_directory: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            stream_stdout: false,
        }
    }

    /// Appends arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn stream_stdout(mut self, stream: bool) -> Self {
        self.stream_stdout = stream;
        self
    }

    /// Builds a new invocation from this one used as a template: same
    /// executable, timeout and streaming, `leading` arguments followed by the
    /// template's own arguments, running in `dir`.
    pub fn derive<I, S>(&self, leading: I, dir: impl Into<PathBuf>) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arguments: Vec<String> = leading.into_iter().map(Into::into).collect();
        arguments.extend(self.arguments.iter().cloned());
        Invocation {
            executable: self.executable.clone(),
            arguments,
            working_directory: Some(dir.into()),
            timeout: self.timeout,
            stream_stdout: self.stream_stdout,
        }
    }

    /// Checks the parts of the invocation that are user configuration rather
    /// than launch conditions. Returns the failure message, if any.
    pub(crate) fn configuration_problem(&self) -> Option<String> {
        if self.executable.trim().is_empty() {
            return Some(NO_EXECUTABLE.to_string());
        }
        if self.timeout.as_secs() == 0 {
            return Some("timeout must be at least one second".to_string());
        }
        None
    }

    /// The command line as shown to the user.
    pub fn display_command(&self) -> String {
        let args = format_arguments(&self.arguments);
        if args.is_empty() {
            self.executable.clone()
        } else {
            format!("{} {}", self.executable, args)
        }
    }
}

/// Output channel of the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Stdout => write!(f, "stdout"),
            Channel::Stderr => write!(f, "stderr"),
        }
    }
}

/// A chunk of output read while the program runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub channel: Channel,
    /// One line including its terminator, or the unterminated tail of the
    /// stream. May be empty on the final flush.
    pub text: String,
    /// True only for the final flush of `channel`.
    pub is_last_chunk: bool,
}

/// Terminal classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NonZeroExit(i32),
    AbnormalTermination,
    StartFailed,
    TimedOut,
}

/// Failure taxonomy used when reporting a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No executable or an unusable timeout; detected before spawning.
    Configuration,
    /// The program could not be started.
    Launch,
    /// Non-zero exit or abnormal termination.
    Runtime,
    /// Killed after exceeding its timeout.
    Timeout,
    /// A host precondition (no project, no open file) was not met.
    Precondition,
}

/// How a child process ended on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signalled,
}

impl From<std::process::ExitStatus> for Termination {
    fn from(status: std::process::ExitStatus) -> Self {
        status.code().map_or(Termination::Signalled, Termination::Exited)
    }
}

/// The result of one invocation.
///
/// `message` is empty exactly when the outcome is `Success`. Captured output is
/// kept for every outcome, including partial output of a run that timed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    outcome: Outcome,
    kind: Option<ErrorKind>,
    stdout: String,
    stderr: String,
    message: String,
}

impl ExecutionResult {
    /// Classifies a process that ended by itself.
    pub fn finished(termination: Termination, stdout: String, stderr: String) -> Self {
        match termination {
            Termination::Exited(0) => ExecutionResult {
                outcome: Outcome::Success,
                kind: None,
                stdout,
                stderr,
                message: String::new(),
            },
            Termination::Exited(code) => ExecutionResult {
                outcome: Outcome::NonZeroExit(code),
                kind: Some(ErrorKind::Runtime),
                stdout,
                stderr,
                message: format!("The process terminated with exit code {}.", code),
            },
            Termination::Signalled => Self::abnormal("The process terminated abnormally.", stdout, stderr),
        }
    }

    pub fn abnormal(message: impl Into<String>, stdout: String, stderr: String) -> Self {
        ExecutionResult {
            outcome: Outcome::AbnormalTermination,
            kind: Some(ErrorKind::Runtime),
            stdout,
            stderr,
            message: message.into(),
        }
    }

    pub fn timed_out(limit: Duration, stdout: String, stderr: String) -> Self {
        ExecutionResult {
            outcome: Outcome::TimedOut,
            kind: Some(ErrorKind::Timeout),
            stdout,
            stderr,
            message: format!(
                "The process did not respond within the timeout limit ({} s).",
                limit.as_secs()
            ),
        }
    }

    pub fn start_failed(message: impl Into<String>) -> Self {
        Self::not_started(ErrorKind::Launch, message.into())
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::not_started(ErrorKind::Configuration, message.into())
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::not_started(ErrorKind::Precondition, message.into())
    }

    fn not_started(kind: ErrorKind, mut message: String) -> Self {
        if message.is_empty() {
            message = "the process could not be started".to_string();
        }
        ExecutionResult {
            outcome: Outcome::StartFailed,
            kind: Some(kind),
            stdout: String::new(),
            stderr: String::new(),
            message,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Formats an argument list for display, quoting arguments that contain
/// whitespace or quotes.
pub fn format_arguments(arguments: &[String]) -> String {
    arguments
        .iter()
        .map(|arg| {
            if arg.is_empty() {
                "\"\"".to_string()
            } else if arg.chars().any(|c| c.is_whitespace() || c == '"') {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
