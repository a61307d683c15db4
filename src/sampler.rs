//! Evenly spaced down-sampling of large event logs
//!
//! Rendering cost grows with event count, so logs above a cap are reduced to
//! exactly `max_events` entries picked at evenly spaced positions across the
//! whole log. Selection is deterministic: index `i` maps to
//! `i * (n - 1) / (max_events - 1)` rounded to nearest, ties rounding down.
//! The first and last events are always kept when `max_events >= 2`.

use crate::event_log::{EventLog, ORIGINAL_COUNT_KEY, SAMPLED_KEY};
use crate::progress::{ProgressEvent, ProgressSink};
use serde_json::Value;

/// What the sampler did to a log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Log was at or under the cap (or the cap was zero)
    Unchanged,
    /// Log was reduced from `original` to `kept` events
    Sampled { original: usize, kept: usize },
}

/// Indices of the events kept when reducing `len` events to `max_events`
///
/// Returns `0..len` when no reduction is needed. The result is non-decreasing
/// and has exactly `max_events` entries otherwise.
pub fn sample_indices(len: usize, max_events: usize) -> Vec<usize> {
    if max_events == 0 || len <= max_events {
        return (0..len).collect();
    }
    if max_events == 1 {
        return vec![0];
    }

    let span = (len - 1) as u128;
    let steps = (max_events - 1) as u128;

    (0..max_events)
        .map(|i| {
            let numerator = i as u128 * span;
            let quotient = numerator / steps;
            let remainder = numerator % steps;
            // Exact halves round down
            let rounded = if remainder * 2 > steps {
                quotient + 1
            } else {
                quotient
            };
            rounded as usize
        })
        .collect()
}

/// Reduce `log` in place to at most `max_events` events
///
/// A `max_events` of zero means "no limit". When sampling happens the metadata
/// gains `sampled = true` and `original_count = <len before sampling>`.
pub fn sample(log: &mut EventLog, max_events: usize, sink: &mut dyn ProgressSink) -> SampleOutcome {
    let original = log.events.len();
    if max_events == 0 || original <= max_events {
        return SampleOutcome::Unchanged;
    }

    sink.emit(ProgressEvent::Sampling {
        kept: max_events,
        original,
    });

    // Indices are strictly increasing here, so one forward pass moves every kept event
    let mut keep = sample_indices(original, max_events).into_iter().peekable();
    log.events = std::mem::take(&mut log.events)
        .into_iter()
        .enumerate()
        .filter_map(|(i, event)| {
            if keep.peek() == Some(&i) {
                keep.next();
                Some(event)
            } else {
                None
            }
        })
        .collect();

    log.metadata.insert(SAMPLED_KEY.to_string(), Value::Bool(true));
    log.metadata
        .insert(ORIGINAL_COUNT_KEY.to_string(), Value::from(original as u64));

    tracing::debug!(original, kept = log.events.len(), "sampled event log");

    SampleOutcome::Sampled {
        original,
        kept: log.events.len(),
    }
}
