//! Listeners of a live table view.

use crate::change::ViewChange;
use std::rc::Rc;

/// Identifies a listener.
pub type SubscriptionId = u64;

/// A listener, called once per accepted emission.
pub type ChangeCallback = Rc<dyn Fn(&ViewChange)>;

/// Manages the listeners of a live view.
///
/// Callbacks are handed out as cloned `Rc`s so the owner can release its
/// borrows before invoking them.
pub struct SubscriptionManager {
    subscriptions: Vec<(SubscriptionId, ChangeCallback)>,
    next_id: SubscriptionId,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    /// Creates a manager with no listeners.
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Adds a listener and returns its id.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&ViewChange) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.push((id, Rc::new(callback)));
        id
    }

    /// Removes a listener. Returns false if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(sid, _)| *sid != id);
        self.subscriptions.len() != before
    }

    /// Returns the callbacks to notify, in subscription order.
    pub fn callbacks(&self) -> Vec<ChangeCallback> {
        self.subscriptions.iter().map(|(_, cb)| cb.clone()).collect()
    }

    /// Returns the number of listeners.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if nobody listens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_subscribe_and_notify() {
        let mut manager = SubscriptionManager::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let id = manager.subscribe(move |change| s.borrow_mut().push(change.emission));
        assert_eq!(id, 1);

        let change = ViewChange {
            emission: 3,
            ..Default::default()
        };
        for cb in manager.callbacks() {
            cb(&change);
        }
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut manager = SubscriptionManager::new();
        let id1 = manager.subscribe(|_| {});
        let id2 = manager.subscribe(|_| {});
        assert_eq!(manager.len(), 2);
        assert!(manager.unsubscribe(id1));
        assert!(!manager.unsubscribe(id1));
        assert_eq!(manager.len(), 1);
        assert!(manager.unsubscribe(id2));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut manager = SubscriptionManager::new();
        manager.subscribe(|_| {});
        manager.clear();
        assert!(manager.callbacks().is_empty());
    }
}
