//! Shared, append-only operation log.
//!
//! Clones of an `OperationLog` share the same entries. Listeners registered
//! with [`OperationLog::subscribe`] are called after every append or clear with
//! the new log length.

use crate::filter::OperationFilter;
use crate::operation::Operation;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

/// Unique identifier for a log listener.
pub type ListenerId = u64;

type Listener = Rc<dyn Fn(usize)>;

#[derive(Default)]
struct LogState {
    entries: Vec<Operation>,
    next_seq: u64,
    version: u64,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
}

/// The operation log.
#[derive(Clone, Default)]
pub struct OperationLog {
    state: Rc<RefCell<LogState>>,
}

impl OperationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation and returns its sequence number.
    ///
    /// Returns `None` if the log is borrowed elsewhere (a listener appending
    /// re-entrantly); the entry is dropped and a warning logged.
    pub fn push(&self, mut op: Operation) -> Option<u64> {
        let (seq, len, listeners) = {
            let Ok(mut state) = self.state.try_borrow_mut() else {
                warn!(table = %op.table, kind = op.kind.as_str(), "operation log busy, entry dropped");
                return None;
            };
            state.next_seq += 1;
            state.version += 1;
            op.seq = state.next_seq;
            state.entries.push(op);
            (state.next_seq, state.entries.len(), state.listener_fns())
        };
        for listener in listeners {
            listener(len);
        }
        Some(seq)
    }

    /// Returns a copy of all entries, oldest first.
    pub fn snapshot(&self) -> Vec<Operation> {
        self.state.borrow().entries.clone()
    }

    /// Returns the entries that pass `filter`.
    pub fn filtered(&self, filter: &OperationFilter) -> Vec<Operation> {
        self.state
            .borrow()
            .entries
            .iter()
            .filter(|op| filter.matches(op))
            .cloned()
            .collect()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a counter that changes whenever the log changes.
    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    /// Removes all entries. Sequence numbers keep increasing.
    pub fn clear(&self) {
        let listeners = {
            let mut state = self.state.borrow_mut();
            state.entries.clear();
            state.version += 1;
            state.listener_fns()
        };
        for listener in listeners {
            listener(0);
        }
    }

    /// Registers a listener called with the log length after each change.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(usize) + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = state.next_listener;
        state.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(l, _)| *l != id);
        state.listeners.len() != before
    }
}

impl LogState {
    fn listener_fns(&self) -> Vec<Listener> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }
}
