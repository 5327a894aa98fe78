//! Live table observation.
//!
//! A live observation pushes a consistent [`TableSnapshot`] to its observer on
//! registration and after every committed write to the table. The
//! [`LiveHandle`] returned on registration owns the subscription: cancelling
//! or dropping it stops further notifications.

use crate::error::Error;
use serde_json::Value;
use std::fmt;

/// Primary keys and rows read from one transactional snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSnapshot {
    /// Primary keys, parallel to `rows`.
    pub primary_keys: Vec<Value>,
    /// Rows in primary-key order.
    pub rows: Vec<Value>,
}

impl TableSnapshot {
    /// Creates a snapshot from parallel key and row lists.
    pub fn new(primary_keys: Vec<Value>, rows: Vec<Value>) -> Self {
        Self { primary_keys, rows }
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the snapshot has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Receives live table snapshots.
pub trait LiveObserver {
    /// Called with each new snapshot.
    fn on_data(&self, snapshot: TableSnapshot);

    /// Called when the observation fails.
    fn on_error(&self, error: Error);
}

/// Owns a live observation. Cancels on [`cancel`](LiveHandle::cancel) or drop.
pub struct LiveHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl LiveHandle {
    /// Creates a handle that runs `cancel` once when cancelled or dropped.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Creates a handle that owns nothing.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Returns true until the handle is cancelled.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Cancels the observation. Calling this more than once is a no-op.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for LiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_cancel_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let mut handle = LiveHandle::new(move || c.set(c.get() + 1));
        assert!(handle.is_active());
        handle.cancel();
        handle.cancel();
        assert!(!handle.is_active());
        drop(handle);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        {
            let _handle = LiveHandle::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_snapshot_len() {
        let snapshot = TableSnapshot::new(vec![Value::from(1)], vec![Value::Null]);
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.is_empty());
        assert!(TableSnapshot::default().is_empty());
    }
}
