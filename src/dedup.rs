//! Time-window deduplication of quote series.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::quote::QuoteEntry;

/// Inclusive range of match minutes whose quotes are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteWindow {
    pub min: i64,
    pub max: i64,
}

impl MinuteWindow {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, minute: i64) -> bool {
        self.min <= minute && minute <= self.max
    }
}

impl Default for MinuteWindow {
    fn default() -> Self {
        Self::new(2, 6)
    }
}

/// Collapse a series to at most one entry per minute inside `window`.
///
/// Entries outside the window or with an unparsable minute are dropped. Within
/// a minute the highest timestamp wins, and on equal timestamps the entry seen
/// last wins. A non-numeric timestamp ranks below every numeric one. Output is
/// ordered by minute.
pub fn dedup_by_minute(entries: &[QuoteEntry], window: MinuteWindow) -> Vec<QuoteEntry> {
    let mut buckets: BTreeMap<i64, &QuoteEntry> = BTreeMap::new();
    let mut unparsable = 0usize;
    let mut outside = 0usize;

    for entry in entries {
        let Some(minute) = entry.minute.as_integer() else {
            unparsable += 1;
            continue;
        };
        if !window.contains(minute) {
            outside += 1;
            continue;
        }

        match buckets.entry(minute) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(mut slot) => {
                if entry.timestamp_value() >= slot.get().timestamp_value() {
                    slot.insert(entry);
                }
            }
        }
    }

    if unparsable > 0 || outside > 0 {
        debug!(
            "Dedup kept {}/{} entries ({} outside minutes {}-{}, {} unparsable)",
            buckets.len(),
            entries.len(),
            outside,
            window.min,
            window.max,
            unparsable
        );
    }

    buckets.into_values().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::Scalar;
    use proptest::prelude::*;
    use serde_json::json;

    fn entry(timestamp: impl Into<serde_json::Value>, minute: serde_json::Value, price: f64) -> QuoteEntry {
        let timestamp: serde_json::Value = timestamp.into();
        QuoteEntry::from_json(&json!([timestamp, minute, price, 3.0, 4.0, 0, 0, "0-0"])).unwrap()
    }

    fn stamps(entries: &[QuoteEntry]) -> Vec<f64> {
        entries.iter().filter_map(QuoteEntry::timestamp_value).collect()
    }

    #[test]
    fn test_keeps_latest_per_minute() {
        let series = vec![
            entry(100, json!(3), 1.1),
            entry(300, json!(3), 1.3),
            entry(200, json!(3), 1.2),
            entry(150, json!(2), 2.0),
        ];
        let kept = dedup_by_minute(&series, MinuteWindow::default());
        assert_eq!(stamps(&kept), vec![150.0, 300.0]);
    }

    #[test]
    fn test_fractional_timestamps_compare_numerically() {
        let series = vec![
            entry(1717171717.5, json!(3), 1.1),
            entry(1717171717i64, json!(3), 1.2),
            entry(1717171716.9, json!(3), 1.3),
        ];
        let kept = dedup_by_minute(&series, MinuteWindow::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].timestamp, Scalar::Float(1717171717.5));
        assert_eq!(kept[0].values[0].as_f64(), Some(1.1));
    }

    #[test]
    fn test_non_numeric_timestamp_loses_to_numeric() {
        let series = vec![entry(5, json!(4), 1.1), entry("later", json!(4), 1.9)];
        let kept = dedup_by_minute(&series, MinuteWindow::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].values[0].as_f64(), Some(1.1));

        let lone = dedup_by_minute(&[entry("later", json!(4), 1.9)], MinuteWindow::default());
        assert_eq!(lone.len(), 1);
    }

    #[test]
    fn test_equal_timestamps_last_seen_wins() {
        let series = vec![entry(100, json!(4), 1.1), entry(100, json!(4), 1.9)];
        let kept = dedup_by_minute(&series, MinuteWindow::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].values[0].as_f64(), Some(1.9));
    }

    #[test]
    fn test_drops_out_of_window_and_unparsable() {
        let series = vec![
            entry(1, json!(1), 1.0),
            entry(2, json!(7), 1.0),
            entry(3, json!(""), 1.0),
            entry(4, json!("HT"), 1.0),
            entry(5, json!(null), 1.0),
            entry(6, json!("5"), 1.0),
            entry(7, json!(6), 1.0),
        ];
        let kept = dedup_by_minute(&series, MinuteWindow::default());
        assert_eq!(stamps(&kept), vec![6.0, 7.0]);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let series = vec![entry(1, json!(2), 1.0), entry(2, json!(6), 1.0)];
        assert_eq!(dedup_by_minute(&series, MinuteWindow::default()).len(), 2);
        assert!(dedup_by_minute(&series, MinuteWindow::new(3, 5)).is_empty());
    }

    #[test]
    fn test_output_ordered_by_minute_not_input() {
        let series = vec![entry(10, json!(5), 1.0), entry(20, json!(2), 1.0), entry(30, json!(4), 1.0)];
        let minutes: Vec<i64> = dedup_by_minute(&series, MinuteWindow::default())
            .iter()
            .filter_map(|e| e.minute.as_integer())
            .collect();
        assert_eq!(minutes, vec![2, 4, 5]);
    }

    proptest! {
        #[test]
        fn at_most_one_entry_per_minute_with_max_timestamp(
            raw in proptest::collection::vec((0i64..10_000, 0i64..10), 0..60)
        ) {
            let series: Vec<QuoteEntry> = raw
                .iter()
                .map(|(ts, minute)| entry(*ts, json!(minute), 2.0))
                .collect();
            let window = MinuteWindow::default();
            let kept = dedup_by_minute(&series, window);

            let mut last_minute = i64::MIN;
            for survivor in &kept {
                let minute = survivor.minute.as_integer().unwrap();
                prop_assert!(window.contains(minute));
                prop_assert!(minute > last_minute);
                last_minute = minute;

                let best = raw
                    .iter()
                    .filter(|(_, m)| *m == minute)
                    .map(|(ts, _)| *ts)
                    .max()
                    .unwrap();
                prop_assert_eq!(survivor.timestamp.clone(), Scalar::Int(best));
            }

            let distinct: std::collections::BTreeSet<i64> = raw
                .iter()
                .map(|(_, m)| *m)
                .filter(|m| window.contains(*m))
                .collect();
            prop_assert_eq!(kept.len(), distinct.len());
        }
    }
}
