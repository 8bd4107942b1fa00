//! # doxyrs Output Sink (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! User-facing progress and result text goes through an `OutputSink`, the
//! command-line counterpart of an editor's output pane. Logging (`tracing`)
//! is separate and goes to stderr; the sink writes to stdout.
//!
//! ## Usage
//!
//! ```rust
//! let sink = ConsoleSink::stdout();
//! sink.show_pane();
//! sink.write_line("Executing: doxygen Doxyfile");
//! ```
//!
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
#[cfg(test)]
use std::sync::Arc;

/// Receives human-readable output lines.
pub trait OutputSink {
    /// Writes one line of output. A trailing newline in `text` is not doubled.
    fn write_line(&self, text: &str);
    /// Brings the output into view.
    fn show_pane(&self);
}

/// Writes to stdout, or any writer in tests. The first `show_pane` prints a
/// header line.
#[derive(Debug)]
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: Mutex<W>,
    shown: AtomicBool,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink {
            out: Mutex::new(out),
            shown: AtomicBool::new(false),
        }
    }
}

impl<W: Write> OutputSink for ConsoleSink<W> {
    fn write_line(&self, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        // Ignore a closed stdout.
        let _ = writeln!(out, "{}", text.trim_end_matches(['\r', '\n']));
        let _ = out.flush();
    }

    fn show_pane(&self) {
        if !self.shown.swap(true, Ordering::SeqCst) {
            self.write_line("==> doxygen");
        }
    }
}

#[cfg(test)]
impl<T: OutputSink + ?Sized> OutputSink for Arc<T> {
    fn write_line(&self, text: &str) {
        (**self).write_line(text);
    }

    fn show_pane(&self) {
        (**self).show_pane();
    }
}

/// Sink that records everything, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Mutex<Vec<String>>,
    pub shown: AtomicBool,
}

#[cfg(test)]
impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl OutputSink for RecordingSink {
    fn write_line(&self, text: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(text.trim_end_matches(['\r', '\n']).to_string());
    }

    fn show_pane(&self) {
        self.shown.store(true, Ordering::SeqCst);
    }
}
