//! Change notifications emitted by a live table view.

use std::time::Instant;
use tablescope_core::RowKey;

/// What a single emission did to a live view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewChange {
    /// Emission counter after this emission (1 for the first).
    pub emission: u64,
    /// Number of rows now visible.
    pub row_count: usize,
    /// Identities whose row value changed since the previous emission.
    pub changed: Vec<RowKey>,
    /// When the current highlight batch expires. Listeners that render
    /// highlights should refresh at this instant.
    pub highlight_until: Option<Instant>,
}

impl ViewChange {
    /// Returns true if this emission is the initial row set.
    #[inline]
    pub fn is_initial(&self) -> bool {
        self.emission == 1
    }

    /// Returns true if any row changed.
    #[inline]
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}
