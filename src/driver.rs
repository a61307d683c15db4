//! Pipeline driver: load one or two logs, pick the mode, render, report
//!
//! Failure policy:
//! - the primary file is required; a raw load fault on it is always fatal,
//!   but in comparison mode the other file is still loaded and reported first
//! - the comparison file is optional; a raw load fault on it is reported and
//!   that side is treated as an empty dataset
//! - single mode needs events in the primary log
//! - comparison mode needs events on at least one side

use crate::cli::{Cli, OutputFormat};
use crate::config::VisualizerConfig;
use crate::dashboard::{Dataset, RenderOptions, Renderer};
use crate::event_log::EventLog;
use crate::loader;
use crate::metrics::dataset_label;
use crate::progress::{ProgressEvent, ProgressSink};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Everything one run needs, after merging config file and CLI flags
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub primary: PathBuf,
    pub compare: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub labels: [String; 2],
    pub bin_seconds: f64,
    /// `None` means no limit
    pub max_events: Option<usize>,
    pub stats_window_seconds: f64,
    pub format: OutputFormat,
}

impl RunOptions {
    /// Options for `primary` with built-in defaults
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        Self::from_config(primary.into(), &VisualizerConfig::default())
    }

    fn from_config(primary: PathBuf, config: &VisualizerConfig) -> Self {
        Self {
            primary,
            compare: None,
            output: None,
            labels: config.labels.clone(),
            bin_seconds: config.bin_seconds,
            max_events: config.event_cap(),
            stats_window_seconds: config.stats_window_seconds,
            format: OutputFormat::Html,
        }
    }

    /// Merge CLI flags over config values
    pub fn from_cli(cli: &Cli, config: &VisualizerConfig) -> Self {
        let mut options = Self::from_config(cli.input_file.clone(), config);
        options.compare = cli.compare.clone();
        options.output = cli.output.clone();
        options.format = cli.format;

        if let Some([a, b]) = cli.labels.as_deref() {
            options.labels = [a.clone(), b.clone()];
        }
        if let Some(bin) = cli.bin {
            options.bin_seconds = bin;
        }
        if let Some(max_events) = cli.max_events {
            options.max_events = (max_events > 0).then_some(max_events);
        }

        options
    }

    pub fn with_compare(mut self, path: impl Into<PathBuf>) -> Self {
        self.compare = Some(path.into());
        self
    }

    pub fn with_max_events(mut self, max_events: Option<usize>) -> Self {
        self.max_events = max_events;
        self
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            output: self.output.clone(),
            format: self.format,
            bin_seconds: self.bin_seconds,
            stats_window_seconds: self.stats_window_seconds,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Artifact written
    Rendered { path: PathBuf, comparison: bool },
    /// Invalid option value
    InvalidOptions,
    /// Primary file could not be read or decoded
    PrimaryLoadFailed,
    /// Nothing to visualize under the mode's rules
    NoEvents,
    /// Renderer failed to produce the artifact
    RenderFailed,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Rendered { .. })
    }

    /// Process exit status: 0 on success, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl From<RunOutcome> for ExitCode {
    fn from(outcome: RunOutcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

fn fatal(sink: &mut dyn ProgressSink, message: impl Into<String>) {
    sink.emit(ProgressEvent::Fatal {
        message: message.into(),
    });
}

/// Load the optional side; a raw fault degrades to an empty dataset
fn load_comparison(path: &Path, max_events: Option<usize>, sink: &mut dyn ProgressSink) -> EventLog {
    match loader::load(path, max_events, sink) {
        Ok(log) => log,
        Err(err) => {
            tracing::warn!(error = %err, "comparison dataset unavailable");
            sink.emit(ProgressEvent::LoadFailed {
                path: path.to_path_buf(),
                cause: err.cause(),
            });
            EventLog::default()
        }
    }
}

/// Run the pipeline and report the outcome
pub fn run(options: &RunOptions, sink: &mut dyn ProgressSink, renderer: &mut dyn Renderer) -> RunOutcome {
    if !(options.bin_seconds.is_finite() && options.bin_seconds > 0.0) {
        fatal(
            sink,
            format!("--bin must be a positive number of seconds, got {}", options.bin_seconds),
        );
        return RunOutcome::InvalidOptions;
    }
    if !(options.stats_window_seconds.is_finite() && options.stats_window_seconds > 0.0) {
        fatal(
            sink,
            format!(
                "stats window must be a positive number of seconds, got {}",
                options.stats_window_seconds
            ),
        );
        return RunOutcome::InvalidOptions;
    }

    let primary = loader::load(&options.primary, options.max_events, sink);
    if let Err(err) = &primary {
        sink.emit(ProgressEvent::LoadFailed {
            path: options.primary.clone(),
            cause: err.cause(),
        });
    }

    // The comparison file is loaded even when the primary failed so its
    // diagnostics still reach the operator.
    let secondary = options
        .compare
        .as_deref()
        .map(|path| load_comparison(path, options.max_events, sink));

    let Ok(primary) = primary else {
        fatal(sink, "Cannot load primary data");
        return RunOutcome::PrimaryLoadFailed;
    };

    if primary.is_empty() {
        sink.emit(ProgressEvent::NoEvents {
            path: options.primary.clone(),
        });
    }

    let render_options = options.render_options();

    let Some((compare_path, secondary)) = options.compare.as_ref().zip(secondary) else {
        if primary.is_empty() {
            fatal(sink, "Cannot create visualization without any events");
            return RunOutcome::NoEvents;
        }

        let label = dataset_label(&options.primary);
        let dataset = Dataset {
            label: &label,
            source: &options.primary,
            log: &primary,
        };
        return finish(renderer.render_single(dataset, &render_options), false, sink);
    };

    if secondary.is_empty() {
        sink.emit(ProgressEvent::NoEvents {
            path: compare_path.clone(),
        });
    }

    if primary.is_empty() && secondary.is_empty() {
        fatal(sink, "No valid events found in either dataset");
        return RunOutcome::NoEvents;
    }

    let a = Dataset {
        label: &options.labels[0],
        source: &options.primary,
        log: &primary,
    };
    let b = Dataset {
        label: &options.labels[1],
        source: compare_path,
        log: &secondary,
    };
    finish(renderer.render_comparison(a, b, &render_options), true, sink)
}

fn finish(
    result: Result<PathBuf, crate::dashboard::RenderError>,
    comparison: bool,
    sink: &mut dyn ProgressSink,
) -> RunOutcome {
    match result {
        Ok(path) => {
            sink.emit(ProgressEvent::Saved {
                comparison,
                path: path.clone(),
            });
            RunOutcome::Rendered { path, comparison }
        }
        Err(err) => {
            fatal(sink, format!("Cannot write visualization: {}", err));
            RunOutcome::RenderFailed
        }
    }
}
