//! # doxyrs Process Runner (`common::process::runner`)
//!
//! File: cli/src/common/process/runner.rs
//!
//! ## Overview
//!
//! Runs an external program with a timeout, streams its output to a listener
//! while it runs, and classifies how it ended.
//!
//! ## Architecture
//!
//! `TokioProcessRunner::execute` spawns the child with piped stdout/stderr and
//! hands each pipe to a reader task (`pump`). The reader tasks split output
//! into lines and send `StreamEvent`s over an unbounded mpsc channel. The
//! calling task runs `supervise`, a biased `tokio::select!` loop over:
//!
//! 1. the deadline (checked first),
//! 2. the child's exit,
//! 3. the next stream event.
//!
//! Every event is appended to the captured output and, for stderr (and stdout
//! when requested), passed to the listener on the calling task, so the
//! listener sees each channel in order and never concurrently.
//!
//! When both the deadline and the exit are ready in the same poll the
//! deadline wins: a run only counts as finished if its exit was observed
//! strictly before the timer fired. Once the exit is seen, output still in
//! flight is collected for `DRAIN_GRACE` at most, so a background descendant
//! holding the pipes cannot keep the caller waiting until the deadline.
//! `supervise` is generic over `Supervised` so tests can drive it with a
//! scripted child on tokio's paused clock.
//!
use super::{Channel, ExecutionResult, Invocation, StreamEvent, Termination};
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Instant};
use tracing::{debug, info, instrument, warn};

/// How long buffered output is still collected after the child has exited or
/// been killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs one invocation to completion.
///
/// `execute` resolves exactly once with the terminal result and never fails:
/// configuration problems, launch failures, non-zero exits, crashes and
/// timeouts are all reported through the returned `ExecutionResult`.
pub trait ProcessRunner {
    async fn execute(
        &self,
        invocation: &Invocation,
        on_stream: &mut dyn FnMut(&StreamEvent),
    ) -> ExecutionResult;
}

/// `ProcessRunner` backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    #[instrument(skip_all, fields(executable = %invocation.executable))]
    async fn execute(
        &self,
        invocation: &Invocation,
        on_stream: &mut dyn FnMut(&StreamEvent),
    ) -> ExecutionResult {
        // Checked before anything is spawned.
        if let Some(problem) = invocation.configuration_problem() {
            warn!("Not running '{}': {}", invocation.executable, problem);
            return ExecutionResult::not_configured(problem);
        }

        let mut command = Command::new(&invocation.executable);
        command
            .args(&invocation.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_directory {
            command.current_dir(dir);
        }

        info!("Executing: {}", invocation.display_command());
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn '{}': {}", invocation.executable, e);
                return ExecutionResult::start_failed(format!(
                    "Could not start '{}': {}. Please check the configured executable.",
                    invocation.executable, e
                ));
            }
        };
        debug!("Spawned process with pid {:?}", child.id());

        let (tx, mut events) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump(stdout, Channel::Stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump(stderr, Channel::Stderr, tx.clone())));
        }
        drop(tx);

        let mut stdout = String::new();
        let mut stderr = String::new();
        let stream_stdout = invocation.stream_stdout;
        let settled = supervise(&mut child, &mut events, invocation.timeout, |event| {
            match event.channel {
                Channel::Stdout => stdout.push_str(&event.text),
                Channel::Stderr => stderr.push_str(&event.text),
            }
            if event.channel == Channel::Stderr || stream_stdout {
                on_stream(&event);
            }
        })
        .await;

        // Pipes belong to this call only.
        for reader in readers {
            reader.abort();
        }

        match settled {
            Settled::Exited(termination) => {
                debug!(?termination, "Process finished");
                ExecutionResult::finished(termination, stdout, stderr)
            }
            Settled::TimedOut => {
                warn!(
                    "'{}' timed out after {} s",
                    invocation.executable,
                    invocation.timeout.as_secs()
                );
                ExecutionResult::timed_out(invocation.timeout, stdout, stderr)
            }
            Settled::Lost(e) => ExecutionResult::abnormal(
                format!("Lost track of the process: {}.", e),
                stdout,
                stderr,
            ),
        }
    }
}

/// A running child as seen by `supervise`.
pub(crate) trait Supervised {
    /// Resolves when the child has terminated. Must be cancel safe.
    async fn wait_exit(&mut self) -> io::Result<Termination>;
    /// Kills the child and waits for it to be gone.
    async fn terminate(&mut self) -> io::Result<()>;
}

impl Supervised for Child {
    async fn wait_exit(&mut self) -> io::Result<Termination> {
        self.wait().await.map(Termination::from)
    }

    async fn terminate(&mut self) -> io::Result<()> {
        self.kill().await
    }
}

/// How supervision ended.
#[derive(Debug)]
pub(crate) enum Settled {
    Exited(Termination),
    TimedOut,
    Lost(io::Error),
}

/// Waits for `child` to terminate while delivering its output, killing it if
/// `limit` elapses first.
pub(crate) async fn supervise<C, F>(
    child: &mut C,
    events: &mut UnboundedReceiver<StreamEvent>,
    limit: Duration,
    mut deliver: F,
) -> Settled
where
    C: Supervised,
    F: FnMut(StreamEvent),
{
    let deadline = time::sleep(limit);
    tokio::pin!(deadline);

    let mut streams_open = true;

    loop {
        tokio::select! {
            biased;

            () = &mut deadline => {
                warn!("Timeout of {} s reached, killing process", limit.as_secs());
                if let Err(e) = child.terminate().await {
                    warn!("Failed to kill timed out process: {}", e);
                }
                drain(events, &mut deliver).await;
                return Settled::TimedOut;
            }
            status = child.wait_exit() => match status {
                Ok(termination) => {
                    // A descendant may still hold the pipes; collect for the grace period only.
                    drain(events, &mut deliver).await;
                    return Settled::Exited(termination);
                }
                Err(e) => {
                    warn!("Failed to wait for process: {}", e);
                    if let Err(kill_err) = child.terminate().await {
                        debug!("Kill after wait failure also failed: {}", kill_err);
                    }
                    drain(events, &mut deliver).await;
                    return Settled::Lost(e);
                }
            },
            event = events.recv(), if streams_open => match event {
                Some(event) => deliver(event),
                None => streams_open = false,
            },
        }
    }
}

/// Delivers output still buffered once the child is gone, for at most
/// `DRAIN_GRACE`.
async fn drain<F>(events: &mut UnboundedReceiver<StreamEvent>, deliver: &mut F)
where
    F: FnMut(StreamEvent),
{
    let until = Instant::now() + DRAIN_GRACE;
    loop {
        match time::timeout_at(until, events.recv()).await {
            Ok(Some(event)) => deliver(event),
            Ok(None) => break,
            Err(_) => {
                debug!("Output pipes still open, dropping the rest");
                break;
            }
        }
    }
}

/// Reads one pipe line by line until EOF, sending each line as an event.
/// The last event of a channel carries `is_last_chunk = true`; it is the
/// unterminated tail if there is one, otherwise empty.
async fn pump<R>(source: R, channel: Channel, events: UnboundedSender<StreamEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let is_last_chunk = !line.ends_with(b"\n");
                let event = StreamEvent {
                    channel,
                    text: String::from_utf8_lossy(&line).into_owned(),
                    is_last_chunk,
                };
                if events.send(event).is_err() || is_last_chunk {
                    return;
                }
            }
            Err(e) => {
                debug!(%channel, "Read error: {}", e);
                break;
            }
        }
    }
    let _ = events.send(StreamEvent {
        channel,
        text: String::new(),
        is_last_chunk: true,
    });
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::{ErrorKind, Outcome, NO_EXECUTABLE};

    /// A child that exits on its own at a fixed instant of the (paused) clock.
    struct ScriptedChild {
        exits_at: Instant,
        termination: Termination,
        killed: bool,
    }

    impl ScriptedChild {
        fn exiting_after(after: Duration, termination: Termination) -> Self {
            ScriptedChild {
                exits_at: Instant::now() + after,
                termination,
                killed: false,
            }
        }
    }

    impl Supervised for ScriptedChild {
        async fn wait_exit(&mut self) -> io::Result<Termination> {
            time::sleep_until(self.exits_at).await;
            Ok(self.termination)
        }

        async fn terminate(&mut self) -> io::Result<()> {
            self.killed = true;
            Ok(())
        }
    }

    fn closed_stream() -> UnboundedReceiver<StreamEvent> {
        let (_tx, rx) = mpsc::unbounded_channel();
        rx
    }

    fn event(channel: Channel, text: &str) -> StreamEvent {
        StreamEvent {
            channel,
            text: text.to_string(),
            is_last_chunk: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_strictly_before_deadline_wins() {
        let limit = Duration::from_secs(5);
        let mut child =
            ScriptedChild::exiting_after(limit - Duration::from_millis(1), Termination::Exited(0));
        let mut events = closed_stream();

        let settled = supervise(&mut child, &mut events, limit, |_| {}).await;

        assert!(matches!(settled, Settled::Exited(Termination::Exited(0))));
        assert!(!child.killed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simultaneous_exit_and_deadline_times_out() {
        let limit = Duration::from_secs(5);
        let mut child = ScriptedChild::exiting_after(limit, Termination::Exited(0));
        let mut events = closed_stream();

        let settled = supervise(&mut child, &mut events, limit, |_| {}).await;

        assert!(matches!(settled, Settled::TimedOut));
        assert!(child.killed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_delivered_in_order_before_exit() {
        let (tx, mut events) = mpsc::unbounded_channel();
        tx.send(event(Channel::Stderr, "warning: one\n")).unwrap();
        tx.send(event(Channel::Stdout, "Generating\n")).unwrap();
        tx.send(event(Channel::Stderr, "warning: two\n")).unwrap();
        drop(tx);

        let mut child = ScriptedChild::exiting_after(Duration::from_secs(1), Termination::Exited(4));
        let mut seen = Vec::new();
        let settled = supervise(&mut child, &mut events, Duration::from_secs(10), |e| {
            seen.push(e.text)
        })
        .await;

        assert!(matches!(settled, Settled::Exited(Termination::Exited(4))));
        assert_eq!(seen, vec!["warning: one\n", "Generating\n", "warning: two\n"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_with_pipes_held_open_is_not_a_timeout() {
        let (tx, mut events) = mpsc::unbounded_channel();
        tx.send(event(Channel::Stdout, "done\n")).unwrap();

        let started = Instant::now();
        let mut child = ScriptedChild::exiting_after(Duration::from_secs(1), Termination::Exited(0));
        let mut seen = Vec::new();
        let settled = supervise(&mut child, &mut events, Duration::from_secs(60), |e| {
            seen.push(e.text)
        })
        .await;

        assert!(matches!(settled, Settled::Exited(Termination::Exited(0))));
        assert!(!child.killed);
        assert_eq!(seen, vec!["done\n"]);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1) + DRAIN_GRACE);
        assert!(elapsed < Duration::from_secs(2));
        drop(tx);
    }

    #[tokio::test]
    async fn test_empty_executable_is_configuration_error() {
        let invocation = Invocation::new("").args(["Doxyfile"]);
        let mut calls = 0;
        let result = TokioProcessRunner
            .execute(&invocation, &mut |_: &StreamEvent| calls += 1)
            .await;

        assert_eq!(result.outcome(), Outcome::StartFailed);
        assert_eq!(result.kind(), Some(ErrorKind::Configuration));
        assert_eq!(result.message(), NO_EXECUTABLE);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_missing_executable_fails_to_start() {
        let invocation = Invocation::new("/nonexistent/doxyrs-test-doxygen");
        let result = TokioProcessRunner
            .execute(&invocation, &mut |_: &StreamEvent| {})
            .await;

        assert_eq!(result.outcome(), Outcome::StartFailed);
        assert_eq!(result.kind(), Some(ErrorKind::Launch));
        assert!(result.message().contains("/nonexistent/doxyrs-test-doxygen"));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::time::Instant as StdInstant;
        use tempfile::tempdir;

        fn sh(script: &str) -> Invocation {
            Invocation::new("sh")
                .args(["-c", script])
                .timeout_secs(10)
                .stream_stdout(true)
        }

        async fn run(invocation: &Invocation) -> (ExecutionResult, Vec<StreamEvent>) {
            let mut events = Vec::new();
            let result = TokioProcessRunner
                .execute(invocation, &mut |event: &StreamEvent| events.push(event.clone()))
                .await;
            (result, events)
        }

        fn joined(events: &[StreamEvent], channel: Channel) -> String {
            events
                .iter()
                .filter(|e| e.channel == channel)
                .map(|e| e.text.as_str())
                .collect()
        }

        #[tokio::test]
        async fn test_success_has_empty_message() {
            let (result, _) = run(&sh("echo hello; echo oops 1>&2")).await;
            assert_eq!(result.outcome(), Outcome::Success);
            assert!(result.message().is_empty());
            assert_eq!(result.stdout(), "hello\n");
            assert_eq!(result.stderr(), "oops\n");
        }

        #[tokio::test]
        async fn test_streamed_events_match_captured_output() {
            let (result, events) = run(&sh(
                "printf 'one\\ntwo\\n'; printf 'warn\\n' 1>&2; printf 'three\\n'; printf tail",
            ))
            .await;

            assert_eq!(result.outcome(), Outcome::Success);
            assert_eq!(joined(&events, Channel::Stdout), result.stdout());
            assert_eq!(joined(&events, Channel::Stderr), result.stderr());
            assert_eq!(result.stdout(), "one\ntwo\nthree\ntail");

            for channel in [Channel::Stdout, Channel::Stderr] {
                let of_channel: Vec<_> = events.iter().filter(|e| e.channel == channel).collect();
                let last_flags: Vec<bool> = of_channel.iter().map(|e| e.is_last_chunk).collect();
                assert_eq!(last_flags.iter().filter(|&&last| last).count(), 1);
                assert_eq!(last_flags.last(), Some(&true));
            }
        }

        #[tokio::test]
        async fn test_stdout_captured_but_not_streamed() {
            let invocation = sh("echo quiet; echo loud 1>&2").stream_stdout(false);
            let (result, events) = run(&invocation).await;

            assert_eq!(result.stdout(), "quiet\n");
            assert!(events.iter().all(|e| e.channel == Channel::Stderr));
            assert_eq!(joined(&events, Channel::Stderr), "loud\n");
        }

        #[tokio::test]
        async fn test_non_zero_exit_reports_code() {
            let (result, _) = run(&sh("echo partial; exit 3")).await;
            assert_eq!(result.outcome(), Outcome::NonZeroExit(3));
            assert_eq!(result.kind(), Some(ErrorKind::Runtime));
            assert!(result.message().contains('3'));
            assert_eq!(result.stdout(), "partial\n");
        }

        #[tokio::test]
        async fn test_killed_by_signal_is_abnormal() {
            let (result, _) = run(&sh("kill -9 $$")).await;
            assert_eq!(result.outcome(), Outcome::AbnormalTermination);
            assert!(!result.message().is_empty());
        }

        #[tokio::test]
        async fn test_timeout_kills_and_keeps_partial_output() {
            let invocation = sh("echo $$; echo started 1>&2; exec sleep 30").timeout_secs(1);
            let started = StdInstant::now();
            let (result, events) = run(&invocation).await;

            assert_eq!(result.outcome(), Outcome::TimedOut);
            assert_eq!(result.kind(), Some(ErrorKind::Timeout));
            assert!(result.message().contains('1'));
            assert!(started.elapsed() < Duration::from_secs(10));
            assert_eq!(result.stderr(), "started\n");
            assert_eq!(joined(&events, Channel::Stderr), "started\n");

            let pid = result.stdout().trim().to_string();
            assert!(!pid.is_empty());
            let alive = std::process::Command::new("sh")
                .args(["-c", &format!("kill -0 {}", pid)])
                .stderr(Stdio::null())
                .status()
                .expect("sh should run");
            assert!(!alive.success(), "process {} still running", pid);
        }

        #[tokio::test]
        async fn test_background_descendant_does_not_delay_exit() {
            let invocation = sh("sleep 30 & echo done").timeout_secs(10);
            let started = StdInstant::now();
            let (result, _) = run(&invocation).await;

            assert_eq!(result.outcome(), Outcome::Success);
            assert_eq!(result.stdout(), "done\n");
            assert!(started.elapsed() < Duration::from_secs(5));
        }

        #[tokio::test]
        async fn test_runs_in_working_directory() {
            let dir = tempdir().unwrap();
            let invocation = sh("pwd -P").current_dir(dir.path());
            let (result, _) = run(&invocation).await;

            assert_eq!(result.outcome(), Outcome::Success);
            let expected = dir.path().canonicalize().unwrap();
            assert_eq!(result.stdout().trim(), expected.to_string_lossy());
        }
    }
}
