//! Property-based tests for evenly spaced event sampling
//!
//! Properties covered:
//! 1. Logs at or under the cap pass through untouched
//! 2. Logs over the cap shrink to exactly the cap with fixed endpoints
//! 3. Selected indices are non-decreasing and in bounds
//! 4. Selection is deterministic
//! 5. Re-sampling composes on the reduced set

use fragviz::event_log::{EventLog, ORIGINAL_COUNT_KEY, SAMPLED_KEY};
use fragviz::progress::RecordingSink;
use fragviz::sampler::{sample, sample_indices, SampleOutcome};
use proptest::prelude::*;
use serde_json::json;

fn numbered_log(n: usize) -> EventLog {
    EventLog::new((0..n).map(|i| json!({ "seq": i })).collect(), Default::default())
}

fn seqs(log: &EventLog) -> Vec<usize> {
    log.events
        .iter()
        .map(|e| e["seq"].as_u64().unwrap() as usize)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_under_cap_unchanged(len in 0usize..200, extra in 0usize..50) {
        let max_events = len + extra;
        let mut log = numbered_log(len);
        let before = log.clone();
        let mut sink = RecordingSink::new();

        let outcome = sample(&mut log, max_events.max(1), &mut sink);

        prop_assert_eq!(outcome, SampleOutcome::Unchanged);
        prop_assert_eq!(&log, &before);
        prop_assert!(!log.metadata.contains_key(SAMPLED_KEY));
        prop_assert!(sink.events.is_empty());
    }

    #[test]
    fn prop_over_cap_exact_size_and_endpoints(len in 3usize..2000, cap_seed in 0usize..10_000) {
        let max_events = 2 + cap_seed % (len - 2);
        prop_assume!(max_events < len);
        let mut log = numbered_log(len);

        let outcome = sample(&mut log, max_events, &mut RecordingSink::new());
        let kept = seqs(&log);

        prop_assert_eq!(outcome, SampleOutcome::Sampled { original: len, kept: max_events });
        prop_assert_eq!(kept.len(), max_events);
        prop_assert_eq!(kept[0], 0);
        prop_assert_eq!(*kept.last().unwrap(), len - 1);
        prop_assert!(kept.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(log.metadata[SAMPLED_KEY].as_bool(), Some(true));
        prop_assert_eq!(log.metadata[ORIGINAL_COUNT_KEY].as_u64(), Some(len as u64));
    }

    #[test]
    fn prop_indices_match_nearest_rounding(len in 2usize..5000, max_events in 2usize..500) {
        prop_assume!(max_events < len);
        let indices = sample_indices(len, max_events);
        let step = (len - 1) as f64 / (max_events - 1) as f64;

        for (i, &index) in indices.iter().enumerate() {
            let exact = i as f64 * step;
            prop_assert!(index < len);
            prop_assert!((index as f64 - exact).abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn prop_deterministic(len in 0usize..3000, max_events in 0usize..300) {
        prop_assert_eq!(sample_indices(len, max_events), sample_indices(len, max_events));
    }

    #[test]
    fn prop_resample_composes(len in 20usize..500, first in 5usize..19, second in 2usize..5) {
        let mut log = numbered_log(len);
        let mut sink = RecordingSink::new();
        sample(&mut log, first, &mut sink);
        let after_first = seqs(&log);

        sample(&mut log, second, &mut sink);
        let expected: Vec<usize> = sample_indices(first, second)
            .into_iter()
            .map(|i| after_first[i])
            .collect();

        prop_assert_eq!(seqs(&log), expected);
        prop_assert_eq!(log.original_count(), Some(first as u64));
    }
}

#[test]
fn test_ten_events_three_kept_pins_middle() {
    // 4.5 is an exact half and rounds down
    assert_eq!(sample_indices(10, 3), vec![0, 4, 9]);
}

#[test]
fn test_single_event_cap_keeps_first() {
    let mut log = numbered_log(7);
    sample(&mut log, 1, &mut RecordingSink::new());
    assert_eq!(seqs(&log), vec![0]);
    assert_eq!(log.original_count(), Some(7));
}
