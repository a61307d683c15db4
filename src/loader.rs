//! Reading fragmentation event logs from disk
//!
//! A load is a single blocking read of the whole file followed by a JSON
//! decode. The file handle is released before decoding starts.

use crate::event_log::EventLog;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::sampler::{self, SampleOutcome};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw load fault: the file could not be read or is not valid JSON
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// File the fault refers to
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. } | LoadError::Format { path, .. } => path,
        }
    }

    /// Underlying cause without the path, for messages that name the file already
    pub fn cause(&self) -> String {
        match self {
            LoadError::Io { source, .. } => source.to_string(),
            LoadError::Format { source, .. } => format!("invalid JSON: {}", source),
        }
    }
}

/// Load an event log, sampling it down to `max_events` when given and positive
pub fn load(
    path: impl AsRef<Path>,
    max_events: Option<usize>,
    sink: &mut dyn ProgressSink,
) -> Result<EventLog, LoadError> {
    let path = path.as_ref();
    sink.emit(ProgressEvent::Loading {
        path: path.to_path_buf(),
    });

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (mut log, warnings) = EventLog::from_slice(&bytes).map_err(|source| LoadError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    drop(bytes);

    for warning in warnings {
        sink.emit(ProgressEvent::MalformedShape {
            path: path.to_path_buf(),
            detail: warning.to_string(),
        });
    }

    tracing::debug!(path = %path.display(), events = log.len(), "decoded event log");

    let outcome = match max_events {
        Some(cap) if cap > 0 => sampler::sample(&mut log, cap, sink),
        _ => SampleOutcome::Unchanged,
    };

    if outcome == SampleOutcome::Unchanged {
        sink.emit(ProgressEvent::Processing { count: log.len() });
    }

    Ok(log)
}
