//! Change-tracking configuration.

use std::time::Duration;

/// Default time a changed row stays highlighted.
pub const DEFAULT_HIGHLIGHT_WINDOW: Duration = Duration::from_millis(300);

/// Default row count above which change tracking is skipped.
pub const DEFAULT_HISTORY_ROW_LIMIT: usize = 10_000;

/// Settings for change tracking in a live view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    /// How long a change batch stays highlighted.
    pub highlight_window: Duration,
    /// Emissions with more rows than this are not diffed.
    pub history_row_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            highlight_window: DEFAULT_HIGHLIGHT_WINDOW,
            history_row_limit: DEFAULT_HISTORY_ROW_LIMIT,
        }
    }
}

impl TrackerConfig {
    /// Sets the highlight window.
    pub fn with_highlight_window(mut self, window: Duration) -> Self {
        self.highlight_window = window;
        self
    }

    /// Sets the row limit for change tracking.
    pub fn with_history_row_limit(mut self, limit: usize) -> Self {
        self.history_row_limit = limit;
        self
    }
}
