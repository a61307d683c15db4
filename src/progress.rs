//! Operator-facing progress reporting
//!
//! The loader, sampler and driver never print directly. They emit
//! [`ProgressEvent`] values into a [`ProgressSink`] chosen by the caller: the
//! binary uses [`ConsoleSink`], tests use [`RecordingSink`].

use std::fmt;
use std::path::PathBuf;

/// Severity of a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// A single progress or diagnostic message
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// About to read a file
    Loading { path: PathBuf },
    /// File decoded; no sampling needed
    Processing { count: usize },
    /// Sampler reduced the log
    Sampling { kept: usize, original: usize },
    /// Document shape was off but tolerated
    MalformedShape { path: PathBuf, detail: String },
    /// Raw load fault (I/O or JSON)
    LoadFailed { path: PathBuf, cause: String },
    /// A dataset has no events
    NoEvents { path: PathBuf },
    /// Fatal condition reported just before a non-zero exit
    Fatal { message: String },
    /// Rendered artifact written
    Saved { comparison: bool, path: PathBuf },
}

impl ProgressEvent {
    /// Severity used for console routing and tracing mirroring
    pub fn level(&self) -> Level {
        match self {
            ProgressEvent::Loading { .. }
            | ProgressEvent::Processing { .. }
            | ProgressEvent::Sampling { .. }
            | ProgressEvent::Saved { .. } => Level::Info,
            ProgressEvent::MalformedShape { .. } | ProgressEvent::NoEvents { .. } => {
                Level::Warning
            }
            ProgressEvent::LoadFailed { .. } | ProgressEvent::Fatal { .. } => Level::Error,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Loading { path } => write!(f, "Loading {}...", path.display()),
            ProgressEvent::Processing { count } => write!(f, "Processing {} events...", count),
            ProgressEvent::Sampling { kept, original } => {
                write!(f, "Sampling {} events from {} total...", kept, original)
            }
            ProgressEvent::MalformedShape { path, detail } => {
                write!(f, "Warning: {} in {}, treating it as empty", detail, path.display())
            }
            ProgressEvent::LoadFailed { path, cause } => {
                write!(f, "Error loading {}: {}", path.display(), cause)
            }
            ProgressEvent::NoEvents { path } => {
                write!(f, "Warning: No events found in {}", path.display())
            }
            ProgressEvent::Fatal { message } => write!(f, "Error: {}", message),
            ProgressEvent::Saved { comparison, path } => {
                let what = if *comparison { "Comparison" } else { "Analysis" };
                write!(f, "{} saved: {}", what, path.display())
            }
        }
    }
}

/// Receiver for progress events
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

/// Prints every event to stdout and mirrors it into `tracing` at debug level
///
/// The `--debug` filter leaves the `fragviz::progress` target at info, so the
/// mirror only shows when `RUST_LOG` asks for it.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&mut self, event: ProgressEvent) {
        tracing::debug!(target: "fragviz::progress", level = ?event.level(), "{}", event);
        println!("{}", event);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<ProgressEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines, as the console would show them
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    /// Whether any event of the given severity was recorded
    pub fn has_level(&self, level: Level) -> bool {
        self.events.iter().any(|e| e.level() == level)
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}
