//! Transient highlighting of changed rows.
//!
//! Each change batch replaces both the highlighted set and the deadline, so a
//! later batch is never cleared by an earlier batch's expiry and nothing stays
//! highlighted past the latest deadline.

use hashbrown::HashSet;
use std::time::{Duration, Instant};
use tablescope_core::RowKey;

/// The set of recently changed rows.
#[derive(Clone, Debug)]
pub struct Highlights {
    keys: HashSet<RowKey>,
    until: Option<Instant>,
    window: Duration,
}

impl Highlights {
    /// Creates an empty highlight set with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            keys: HashSet::new(),
            until: None,
            window,
        }
    }

    /// Returns the highlight window.
    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Highlights `keys` from `now` until `now + window`, replacing any
    /// earlier batch.
    pub fn replace<I>(&mut self, keys: I, now: Instant)
    where
        I: IntoIterator<Item = RowKey>,
    {
        self.keys = keys.into_iter().collect();
        self.until = Some(now + self.window);
    }

    /// Returns true if `key` is highlighted at `now`.
    pub fn is_highlighted(&self, key: &RowKey, now: Instant) -> bool {
        self.is_live(now) && self.keys.contains(key)
    }

    /// Returns the highlighted keys at `now`.
    pub fn active(&self, now: Instant) -> Vec<RowKey> {
        if self.is_live(now) {
            self.keys.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Returns the time the current batch expires.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.until
    }

    /// Clears all highlights.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.until = None;
    }

    fn is_live(&self, now: Instant) -> bool {
        self.until.map_or(false, |until| now < until)
    }
}
