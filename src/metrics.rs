//! Fragmentation metrics extracted from event logs
//!
//! Events are read through a small set of well-known keys (`timestamp`,
//! `event_type`, `nr_migrated`, `status`, `fragmentation_index`). Events that
//! lack a key a metric needs are skipped for that metric only.

use crate::event_log::{Event, EventLog};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default window for the statistics table (seconds)
pub const DEFAULT_STATS_WINDOW_SECONDS: f64 = 60.0;

/// Event categories the dashboards know how to color and count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Extfrag,
    Migration,
    Compaction,
    Other,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "extfrag" => EventKind::Extfrag,
            "migration" => EventKind::Migration,
            "compaction" => EventKind::Compaction,
            _ => EventKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Extfrag => "extfrag",
            EventKind::Migration => "migration",
            EventKind::Compaction => "compaction",
            EventKind::Other => "other",
        }
    }

    pub const ALL: [EventKind; 4] = [
        EventKind::Extfrag,
        EventKind::Migration,
        EventKind::Compaction,
        EventKind::Other,
    ];
}

/// Timestamp of an event in seconds, if present and numeric
pub fn timestamp(event: &Event) -> Option<f64> {
    event.get("timestamp").and_then(|v| v.as_f64())
}

/// Category of an event, if it carries an `event_type`
pub fn kind(event: &Event) -> Option<EventKind> {
    event
        .get("event_type")
        .and_then(|v| v.as_str())
        .map(EventKind::from_type)
}

/// Largest window index magnitude; keeps `index + 1` and `index as f64` exact
const WINDOW_INDEX_LIMIT: i64 = 1 << 53;

/// Window containing `ts`, clamped so far-out timestamps stay addressable
pub fn window_index(ts: f64, window: f64) -> i64 {
    let limit = WINDOW_INDEX_LIMIT as f64;
    (ts / window).floor().clamp(-limit, limit) as i64
}

/// Sum that pins at `u64::MAX` instead of overflowing
fn saturating_total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

/// Compaction outcomes within one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompactionCounts {
    pub success: u64,
    pub failed: u64,
}

/// Windowed counts for one dataset
#[derive(Debug, Clone, Default)]
pub struct FragmentationMetrics {
    /// Window width in seconds
    pub window_seconds: f64,
    /// Extfrag events per window (keyed by window index)
    pub extfrag: BTreeMap<i64, u64>,
    /// Migrated pages per window
    pub migrated_pages: BTreeMap<i64, u64>,
    /// Compaction outcomes per window
    pub compaction: BTreeMap<i64, CompactionCounts>,
    /// (timestamp, fragmentation index) samples
    pub fragmentation_points: Vec<(f64, f64)>,
    /// Largest timestamp seen
    pub max_timestamp: Option<f64>,
    /// Events without a usable timestamp or event type
    pub skipped: usize,
}

impl FragmentationMetrics {
    /// Single linear pass over `events`
    pub fn from_events(events: &[Event], window_seconds: f64) -> Self {
        let mut metrics = FragmentationMetrics {
            window_seconds,
            ..Default::default()
        };

        for event in events {
            let Some(ts) = timestamp(event) else {
                metrics.skipped += 1;
                continue;
            };
            metrics.max_timestamp = Some(metrics.max_timestamp.map_or(ts, |m| m.max(ts)));

            if let Some(index) = event.get("fragmentation_index").and_then(|v| v.as_f64()) {
                metrics.fragmentation_points.push((ts, index));
            }

            let Some(kind) = kind(event) else {
                metrics.skipped += 1;
                continue;
            };
            let window = window_index(ts, window_seconds);

            match kind {
                EventKind::Extfrag => {
                    let count = metrics.extfrag.entry(window).or_default();
                    *count = count.saturating_add(1);
                }
                EventKind::Migration => {
                    let pages = event.get("nr_migrated").and_then(|v| v.as_u64()).unwrap_or(0);
                    let total = metrics.migrated_pages.entry(window).or_default();
                    *total = total.saturating_add(pages);
                }
                EventKind::Compaction => {
                    let counts = metrics.compaction.entry(window).or_default();
                    if event.get("status").and_then(|v| v.as_str()) == Some("success") {
                        counts.success += 1;
                    } else {
                        counts.failed += 1;
                    }
                }
                EventKind::Other => {}
            }
        }

        metrics
    }

    /// Start time (seconds) of a window index
    pub fn window_start(&self, window: i64) -> f64 {
        window as f64 * self.window_seconds
    }

    /// (window start, pages migrated in that window) for windows with migrations
    pub fn migration_series(&self) -> Vec<(f64, u64)> {
        self.migrated_pages
            .iter()
            .map(|(&window, &pages)| (self.window_start(window), pages))
            .collect()
    }

    /// Running total of migrated pages at each migration window
    pub fn cumulative_migrations(&self) -> Vec<(f64, u64)> {
        let mut total = 0u64;
        self.migration_series()
            .into_iter()
            .map(|(start, pages)| {
                total = total.saturating_add(pages);
                (start, total)
            })
            .collect()
    }
}

/// Summary row set for the statistics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub event_count: usize,
    pub sampled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_count: Option<u64>,
    pub total_extfrag: u64,
    pub mean_extfrag_per_window: f64,
    pub max_extfrag_per_window: u64,
    pub total_migrated_pages: u64,
    pub max_migrated_pages_per_window: u64,
    pub compaction_success: u64,
    pub compaction_failed: u64,
    pub fragmentation_samples: usize,
}

impl DatasetStats {
    pub fn from_log(log: &EventLog, window_seconds: f64) -> Self {
        let metrics = FragmentationMetrics::from_events(&log.events, window_seconds);
        Self::from_metrics(log, &metrics)
    }

    pub fn from_metrics(log: &EventLog, metrics: &FragmentationMetrics) -> Self {
        let total_extfrag = saturating_total(metrics.extfrag.values().copied());
        let mean_extfrag_per_window = if metrics.extfrag.is_empty() {
            0.0
        } else {
            total_extfrag as f64 / metrics.extfrag.len() as f64
        };

        Self {
            event_count: log.len(),
            sampled: log.is_sampled(),
            original_count: log.original_count(),
            total_extfrag,
            mean_extfrag_per_window,
            max_extfrag_per_window: metrics.extfrag.values().copied().max().unwrap_or(0),
            total_migrated_pages: saturating_total(metrics.migrated_pages.values().copied()),
            max_migrated_pages_per_window: metrics
                .migrated_pages
                .values()
                .copied()
                .max()
                .unwrap_or(0),
            compaction_success: saturating_total(metrics.compaction.values().map(|c| c.success)),
            compaction_failed: saturating_total(metrics.compaction.values().map(|c| c.failed)),
            fragmentation_samples: metrics.fragmentation_points.len(),
        }
    }

    /// (label, formatted value) pairs in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Events", self.event_count.to_string()),
            (
                "Original events",
                self.original_count
                    .map_or_else(|| "-".to_string(), |n| n.to_string()),
            ),
            ("Total extfrag events", self.total_extfrag.to_string()),
            (
                "Mean extfrag / window",
                format!("{:.2}", self.mean_extfrag_per_window),
            ),
            ("Max extfrag / window", self.max_extfrag_per_window.to_string()),
            ("Migrated pages", self.total_migrated_pages.to_string()),
            (
                "Max migrated pages / window",
                self.max_migrated_pages_per_window.to_string(),
            ),
            ("Compaction successes", self.compaction_success.to_string()),
            ("Compaction failures", self.compaction_failed.to_string()),
            (
                "Fragmentation index samples",
                self.fragmentation_samples.to_string(),
            ),
        ]
    }
}

/// Event counts per type over fixed-width time bins
#[derive(Debug, Clone, PartialEq)]
pub struct TypeHistogram {
    /// Effective bin width in seconds
    pub bin_seconds: f64,
    /// Counts keyed by bin index, then kind
    pub bins: BTreeMap<i64, BTreeMap<EventKind, u64>>,
}

impl TypeHistogram {
    /// Bin events by `bin_seconds`, widening bins so at most `max_bins` cover the data
    pub fn build(events: &[Event], bin_seconds: f64, max_bins: usize) -> Self {
        let timed: Vec<(f64, EventKind)> = events
            .iter()
            .filter_map(|e| Some((timestamp(e)?, kind(e).unwrap_or(EventKind::Other))))
            .collect();

        let mut width = bin_seconds;
        if let (Some(min), Some(max)) = (
            timed.iter().map(|(t, _)| *t).reduce(f64::min),
            timed.iter().map(|(t, _)| *t).reduce(f64::max),
        ) {
            let span = max - min;
            if max_bins > 0 && span / width > max_bins as f64 {
                width = span / max_bins as f64;
            }
        }

        let mut bins: BTreeMap<i64, BTreeMap<EventKind, u64>> = BTreeMap::new();
        for (ts, kind) in timed {
            *bins
                .entry(window_index(ts, width))
                .or_default()
                .entry(kind)
                .or_default() += 1;
        }

        Self {
            bin_seconds: width,
            bins,
        }
    }

    /// Total events in a bin
    pub fn total(&self, bin: i64) -> u64 {
        self.bins.get(&bin).map_or(0, |m| m.values().sum())
    }

    /// Largest single-kind count in any bin
    pub fn max_cell(&self) -> u64 {
        self.bins
            .values()
            .flat_map(|m| m.values().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Human label for a dataset derived from its file name
///
/// Strips the `_fragmentation_data` suffixes and an `lpc-` prefix, and maps
/// filesystem names to their display form.
pub fn dataset_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = stem
        .replace("_fragmentation_data_interim", "")
        .replace("_fragmentation_data", "");
    let name = name.strip_prefix("lpc-").unwrap_or(&name).to_string();

    let lower = name.to_lowercase();
    if lower.contains("btrfs") {
        "Btrfs".to_string()
    } else if lower.contains("xfs-4k") {
        "XFS 4k".to_string()
    } else if lower.contains("xfs-16k") {
        "XFS 16k".to_string()
    } else if lower.contains("xfs-64k") {
        "XFS 64k".to_string()
    } else if lower.contains("xfs") {
        "XFS (default)".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_events() -> Vec<Event> {
        vec![
            json!({"timestamp": 5.0, "event_type": "extfrag", "fragmentation_index": 0.4}),
            json!({"timestamp": 30.0, "event_type": "extfrag"}),
            json!({"timestamp": 70.0, "event_type": "extfrag"}),
            json!({"timestamp": 75.0, "event_type": "migration", "nr_migrated": 12}),
            json!({"timestamp": 80.0, "event_type": "migration", "nr_migrated": 3}),
            json!({"timestamp": 90.0, "event_type": "compaction", "status": "success"}),
            json!({"timestamp": 130.0, "event_type": "compaction", "status": "deferred"}),
            json!({"event_type": "extfrag"}),
            json!("opaque"),
        ]
    }

    #[test]
    fn test_metrics_windows() {
        let m = FragmentationMetrics::from_events(&sample_events(), 60.0);
        assert_eq!(m.extfrag.get(&0), Some(&2));
        assert_eq!(m.extfrag.get(&1), Some(&1));
        assert_eq!(m.migrated_pages.get(&1), Some(&15));
        assert_eq!(m.compaction[&1].success, 1);
        assert_eq!(m.compaction[&2].failed, 1);
        assert_eq!(m.fragmentation_points, vec![(5.0, 0.4)]);
        assert_eq!(m.max_timestamp, Some(130.0));
        assert_eq!(m.skipped, 2);
        assert_eq!(m.window_start(2), 120.0);
    }

    #[test]
    fn test_dataset_stats() {
        let log = EventLog::new(sample_events(), Default::default());
        let stats = DatasetStats::from_log(&log, DEFAULT_STATS_WINDOW_SECONDS);
        assert_eq!(stats.event_count, 9);
        assert_eq!(stats.total_extfrag, 3);
        assert_eq!(stats.mean_extfrag_per_window, 1.5);
        assert_eq!(stats.max_extfrag_per_window, 2);
        assert_eq!(stats.total_migrated_pages, 15);
        assert_eq!(stats.max_migrated_pages_per_window, 15);
        assert_eq!(stats.compaction_success, 1);
        assert_eq!(stats.compaction_failed, 1);
        assert!(!stats.sampled);
        assert_eq!(stats.rows().len(), 10);
    }

    #[test]
    fn test_migrated_pages_saturate() {
        let events = vec![
            json!({"timestamp": 1.0, "event_type": "migration", "nr_migrated": u64::MAX}),
            json!({"timestamp": 2.0, "event_type": "migration", "nr_migrated": 1}),
            json!({"timestamp": 90.0, "event_type": "migration", "nr_migrated": 5}),
        ];
        let m = FragmentationMetrics::from_events(&events, 60.0);
        assert_eq!(m.migrated_pages[&0], u64::MAX);
        assert_eq!(m.cumulative_migrations().last(), Some(&(60.0, u64::MAX)));

        let stats = DatasetStats::from_metrics(&EventLog::new(events, Default::default()), &m);
        assert_eq!(stats.total_migrated_pages, u64::MAX);
        assert_eq!(stats.max_migrated_pages_per_window, u64::MAX);
    }

    #[test]
    fn test_migration_series() {
        let m = FragmentationMetrics::from_events(&sample_events(), 60.0);
        assert_eq!(m.migration_series(), vec![(60.0, 15)]);

        let events = vec![
            json!({"timestamp": 10.0, "event_type": "migration", "nr_migrated": 4}),
            json!({"timestamp": 130.0, "event_type": "migration", "nr_migrated": 6}),
            json!({"timestamp": 140.0, "event_type": "migration"}),
        ];
        let m = FragmentationMetrics::from_events(&events, 60.0);
        assert_eq!(m.migration_series(), vec![(0.0, 4), (120.0, 6)]);
        assert_eq!(m.cumulative_migrations(), vec![(0.0, 4), (120.0, 10)]);
    }

    #[test]
    fn test_window_index_clamps_huge_timestamps() {
        let high = window_index(1e300, 0.5);
        let low = window_index(-1e300, 0.5);
        assert_eq!(high, WINDOW_INDEX_LIMIT);
        assert_eq!(low, -WINDOW_INDEX_LIMIT);
        assert!(high.checked_add(1).is_some());
        assert_eq!(window_index(f64::NAN, 60.0), 0);

        let events = vec![json!({"timestamp": 1e300, "event_type": "extfrag"})];
        let hist = TypeHistogram::build(&events, 0.5, 100);
        assert_eq!(hist.total(WINDOW_INDEX_LIMIT), 1);
    }

    #[test]
    fn test_dataset_stats_empty() {
        let stats = DatasetStats::from_log(&EventLog::default(), 60.0);
        assert_eq!(stats.mean_extfrag_per_window, 0.0);
        assert_eq!(stats.max_extfrag_per_window, 0);
    }

    #[test]
    fn test_type_histogram() {
        let hist = TypeHistogram::build(&sample_events(), 60.0, 100);
        assert_eq!(hist.bin_seconds, 60.0);
        assert_eq!(hist.total(0), 2);
        assert_eq!(hist.total(1), 4);
        assert_eq!(hist.bins[&1][&EventKind::Migration], 2);
        assert_eq!(hist.max_cell(), 2);
    }

    #[test]
    fn test_type_histogram_widens_bins() {
        let events: Vec<Event> = (0..1000)
            .map(|i| json!({"timestamp": i as f64, "event_type": "extfrag"}))
            .collect();
        let hist = TypeHistogram::build(&events, 0.5, 100);
        assert!(hist.bin_seconds > 0.5);
        assert!(hist.bins.len() <= 101);
    }

    #[test]
    fn test_dataset_label() {
        assert_eq!(
            dataset_label(Path::new("/data/lpc-btrfs_fragmentation_data.json")),
            "Btrfs"
        );
        assert_eq!(
            dataset_label(Path::new("xfs-16k_fragmentation_data_interim.json")),
            "XFS 16k"
        );
        assert_eq!(dataset_label(Path::new("lpc-xfs.json")), "XFS (default)");
        assert_eq!(
            dataset_label(Path::new("lpc-ext4-4k_fragmentation_data.json")),
            "ext4-4k"
        );
    }
}
