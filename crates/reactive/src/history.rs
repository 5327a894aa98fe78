//! Per-row change history.
//!
//! The tracker compares each incoming row set with the previous one, keyed by
//! row identity. The first row set only establishes a baseline. When a row
//! changes for the first time its previous version is recorded as the
//! baseline entry (`changed_at == None`), then every change appends the new
//! version with a timestamp.

use crate::config::TrackerConfig;
use crate::highlight::Highlights;
use hashbrown::HashMap;
use serde_json::Value;
use std::time::{Instant, SystemTime};
use tablescope_core::schema::KeyPath;
use tablescope_core::value::values_equal;
use tablescope_core::{get_row_key, RowKey};
use tracing::debug;

/// One version of a row.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub data: Value,
    /// When the change was observed; `None` for the baseline.
    pub changed_at: Option<SystemTime>,
}

impl HistoryEntry {
    /// Returns true for the baseline entry.
    #[inline]
    pub fn is_baseline(&self) -> bool {
        self.changed_at.is_none()
    }
}

/// Tracks row changes across live emissions.
pub struct ChangeTracker {
    config: TrackerConfig,
    previous: Option<HashMap<RowKey, Value>>,
    history: HashMap<RowKey, Vec<HistoryEntry>>,
    highlights: Highlights,
}

impl ChangeTracker {
    /// Creates a tracker with no baseline.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            previous: None,
            history: HashMap::new(),
            highlights: Highlights::new(config.highlight_window),
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Ingests a row set observed now.
    pub fn ingest(&mut self, rows: &[Value], key_path: &KeyPath) -> Vec<RowKey> {
        self.ingest_at(rows, key_path, Instant::now(), SystemTime::now())
    }

    /// Ingests a row set and returns the identities that changed.
    ///
    /// `now` drives highlight expiry and `wall` is stamped on history entries.
    pub fn ingest_at(
        &mut self,
        rows: &[Value],
        key_path: &KeyPath,
        now: Instant,
        wall: SystemTime,
    ) -> Vec<RowKey> {
        if rows.len() > self.config.history_row_limit {
            debug!(
                rows = rows.len(),
                limit = self.config.history_row_limit,
                "row set too large, change tracking skipped"
            );
            self.previous = None;
            return Vec::new();
        }

        let current: HashMap<RowKey, Value> = rows
            .iter()
            .filter_map(|row| {
                let key = get_row_key(row, key_path);
                key.is_addressable().then(|| (key, row.clone()))
            })
            .collect();

        let Some(previous) = self.previous.replace(current) else {
            return Vec::new();
        };

        let mut changed = Vec::new();
        for row in rows {
            let key = get_row_key(row, key_path);
            if !key.is_addressable() {
                continue;
            }
            let Some(prior) = previous.get(&key) else {
                continue;
            };
            if values_equal(prior, row) {
                continue;
            }
            let entries = self.history.entry(key.clone()).or_default();
            if entries.is_empty() {
                entries.push(HistoryEntry {
                    data: prior.clone(),
                    changed_at: None,
                });
            }
            entries.push(HistoryEntry {
                data: row.clone(),
                changed_at: Some(wall),
            });
            if !changed.contains(&key) {
                changed.push(key);
            }
        }

        if !changed.is_empty() {
            self.highlights.replace(changed.iter().cloned(), now);
        }
        changed
    }

    /// Returns the recorded versions of a row, oldest first.
    pub fn history(&self, key: &RowKey) -> &[HistoryEntry] {
        self.history.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the number of rows with recorded changes.
    pub fn tracked_rows(&self) -> usize {
        self.history.len()
    }

    /// Returns the highlight state.
    #[inline]
    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    /// Drops the baseline, all history and highlights.
    pub fn reset(&mut self) {
        self.previous = None;
        self.history.clear();
        self.highlights.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn make_row(id: i64, price: i64) -> Value {
        json!({"id": id, "price": price})
    }

    fn id_path() -> KeyPath {
        KeyPath::single("id")
    }

    #[test]
    fn test_first_snapshot_is_baseline() {
        let mut tracker = ChangeTracker::new(TrackerConfig::default());
        let changed = tracker.ingest(&[make_row(1, 10)], &id_path());
        assert!(changed.is_empty());
        assert_eq!(tracker.tracked_rows(), 0);
    }

    #[test]
    fn test_baseline_added_once() {
        let mut tracker = ChangeTracker::new(TrackerConfig::default());
        let key = RowKey::Single(json!(1));
        tracker.ingest(&[make_row(1, 10)], &id_path());
        assert_eq!(tracker.ingest(&[make_row(1, 20)], &id_path()), vec![key.clone()]);
        tracker.ingest(&[make_row(1, 30)], &id_path());

        let history = tracker.history(&key);
        let prices: Vec<Value> = history.iter().map(|e| e.data["price"].clone()).collect();
        assert_eq!(prices, vec![json!(10), json!(20), json!(30)]);
        assert!(history[0].is_baseline());
        assert!(history[1..].iter().all(|e| e.changed_at.is_some()));
    }

    #[test]
    fn test_unchanged_new_and_removed_rows() {
        let mut tracker = ChangeTracker::new(TrackerConfig::default());
        tracker.ingest(&[make_row(1, 10), make_row(2, 5)], &id_path());
        let changed = tracker.ingest(&[make_row(1, 10), make_row(3, 1)], &id_path());
        assert!(changed.is_empty());
        assert_eq!(tracker.tracked_rows(), 0);
    }

    #[test]
    fn test_serialized_identities_not_tracked() {
        let mut tracker = ChangeTracker::new(TrackerConfig::default());
        tracker.ingest(&[json!({"v": 1})], &KeyPath::None);
        assert!(tracker.ingest(&[json!({"v": 2})], &KeyPath::None).is_empty());

        let outbound = |v: i64| json!({"v": v, "__outbound_key": 7});
        tracker.reset();
        tracker.ingest(&[outbound(1)], &KeyPath::None);
        assert_eq!(
            tracker.ingest(&[outbound(2)], &KeyPath::None),
            vec![RowKey::Outbound(json!(7))]
        );
    }

    #[test]
    fn test_integral_float_reemission_is_not_a_change() {
        let mut tracker = ChangeTracker::new(TrackerConfig::default());
        tracker.ingest(&[json!({"id": 1, "price": 10})], &id_path());
        let changed = tracker.ingest(&[json!({"id": 1.0, "price": 10.0})], &id_path());
        assert!(changed.is_empty());
        assert_eq!(tracker.tracked_rows(), 0);
    }

    #[test]
    fn test_row_limit_skips_tracking() {
        let config = TrackerConfig::default().with_history_row_limit(2);
        let mut tracker = ChangeTracker::new(config);
        let rows = vec![make_row(1, 1), make_row(2, 2)];
        tracker.ingest(&rows, &id_path());
        let big = vec![make_row(1, 9), make_row(2, 9), make_row(3, 9)];
        assert!(tracker.ingest(&big, &id_path()).is_empty());
        // The next small set is a fresh baseline.
        assert!(tracker.ingest(&rows, &id_path()).is_empty());
        assert_eq!(tracker.tracked_rows(), 0);
    }

    #[test]
    fn test_changes_highlight() {
        let config = TrackerConfig::default().with_highlight_window(Duration::from_millis(300));
        let mut tracker = ChangeTracker::new(config);
        let t0 = Instant::now();
        let wall = SystemTime::now();
        tracker.ingest_at(&[make_row(1, 1)], &id_path(), t0, wall);
        tracker.ingest_at(&[make_row(1, 2)], &id_path(), t0, wall);

        let key = RowKey::Single(json!(1));
        assert!(tracker.highlights().is_highlighted(&key, t0));
        assert!(!tracker
            .highlights()
            .is_highlighted(&key, t0 + Duration::from_millis(300)));
        assert_eq!(tracker.history(&key)[1].changed_at, Some(wall));

        tracker.reset();
        assert!(tracker.history(&key).is_empty());
        assert!(!tracker.highlights().is_highlighted(&key, t0));
    }
}
