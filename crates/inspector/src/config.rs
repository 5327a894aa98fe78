//! Inspector configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tablescope_core::Result;
use tablescope_reactive::config::{DEFAULT_HIGHLIGHT_WINDOW, DEFAULT_HISTORY_ROW_LIMIT};
use tablescope_reactive::TrackerConfig;

/// Default bound on concurrent per-row requests of bulk actions.
pub const DEFAULT_BULK_CONCURRENCY: usize = 16;

/// Settings threaded through an [`Inspector`](crate::Inspector).
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectorConfig {
    /// How long changed rows stay highlighted, in milliseconds.
    pub highlight_window_ms: u64,
    /// Live emissions with more rows than this are not diffed.
    pub history_row_limit: usize,
    /// Whether the database syncs with a cloud service; enables the
    /// classification of cloud system tables.
    pub cloud: bool,
    /// Maximum number of per-row requests a bulk action keeps in flight.
    pub bulk_concurrency: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            highlight_window_ms: DEFAULT_HIGHLIGHT_WINDOW.as_millis() as u64,
            history_row_limit: DEFAULT_HISTORY_ROW_LIMIT,
            cloud: false,
            bulk_concurrency: DEFAULT_BULK_CONCURRENCY,
        }
    }
}

impl InspectorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_highlight_window(mut self, window: Duration) -> Self {
        self.highlight_window_ms = window.as_millis() as u64;
        self
    }

    pub fn with_history_row_limit(mut self, limit: usize) -> Self {
        self.history_row_limit = limit;
        self
    }

    pub fn with_cloud(mut self, cloud: bool) -> Self {
        self.cloud = cloud;
        self
    }

    pub fn with_bulk_concurrency(mut self, concurrency: usize) -> Self {
        self.bulk_concurrency = concurrency;
        self
    }

    /// Returns the highlight window.
    #[inline]
    pub fn highlight_window(&self) -> Duration {
        Duration::from_millis(self.highlight_window_ms)
    }

    /// Returns the bulk concurrency, at least 1.
    #[inline]
    pub fn concurrency(&self) -> usize {
        self.bulk_concurrency.max(1)
    }

    /// Returns the settings of the change tracker.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig::default()
            .with_highlight_window(self.highlight_window())
            .with_history_row_limit(self.history_row_limit)
    }
}
