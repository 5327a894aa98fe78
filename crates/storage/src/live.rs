//! Live observer registry.
//!
//! Each table keeps a `LiveRegistry`. Observers are notified synchronously
//! after every committed write, in registration order. Cancelling a handle
//! removes its observer from the registry through a weak reference, so a
//! handle may outlive the database.

use hashbrown::HashMap;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tablescope_core::{Error, LiveHandle, LiveObserver, TableSnapshot};

/// Identifier of a registered observer.
pub type ObserverId = u64;

/// Observers of a single table.
#[derive(Default)]
pub struct LiveRegistry {
    observers: RefCell<HashMap<ObserverId, Rc<dyn LiveObserver>>>,
    order: RefCell<Vec<ObserverId>>,
    next_id: Cell<ObserverId>,
}

impl LiveRegistry {
    /// Creates an empty registry.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Registers an observer and returns a handle that unregisters it.
    pub fn register(self: &Rc<Self>, observer: Rc<dyn LiveObserver>) -> (ObserverId, LiveHandle) {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.observers.borrow_mut().insert(id, observer);
        self.order.borrow_mut().push(id);

        let weak: Weak<Self> = Rc::downgrade(self);
        let handle = LiveHandle::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.unregister(id);
            }
        });
        (id, handle)
    }

    /// Removes an observer. Returns whether it was registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        self.order.borrow_mut().retain(|&o| o != id);
        self.observers.borrow_mut().remove(&id).is_some()
    }

    /// Returns the number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Returns true if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends a snapshot to one observer, if it is still registered.
    pub fn notify_one(&self, id: ObserverId, snapshot: TableSnapshot) {
        let observer = self.observers.borrow().get(&id).cloned();
        if let Some(observer) = observer {
            observer.on_data(snapshot);
        }
    }

    /// Sends a snapshot to every registered observer.
    ///
    /// No borrow is held while observers run, so they may register, cancel
    /// or write to the store from inside the callback. Observers cancelled
    /// during the round are skipped.
    pub fn notify(&self, snapshot: &TableSnapshot) {
        let ids: Vec<ObserverId> = self.order.borrow().clone();
        for id in ids {
            self.notify_one(id, snapshot.clone());
        }
    }

    /// Reports an error to every registered observer.
    pub fn fail(&self, message: &str) {
        let observers: Vec<Rc<dyn LiveObserver>> = {
            let order = self.order.borrow();
            let map = self.observers.borrow();
            order.iter().filter_map(|id| map.get(id).cloned()).collect()
        };
        for observer in observers {
            observer.on_error(Error::subscription(message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        data: RefCell<Vec<TableSnapshot>>,
        errors: RefCell<Vec<String>>,
    }

    impl LiveObserver for Recorder {
        fn on_data(&self, snapshot: TableSnapshot) {
            self.data.borrow_mut().push(snapshot);
        }

        fn on_error(&self, error: Error) {
            self.errors.borrow_mut().push(error.to_string());
        }
    }

    fn snapshot(n: i64) -> TableSnapshot {
        TableSnapshot::new(vec![json!(n)], vec![json!({"id": n})])
    }

    #[test]
    fn test_notify_and_cancel() {
        let registry = LiveRegistry::new();
        let first = Rc::new(Recorder::default());
        let second = Rc::new(Recorder::default());
        let (_, mut h1) = registry.register(first.clone());
        let (_, _h2) = registry.register(second.clone());
        assert_eq!(registry.len(), 2);

        registry.notify(&snapshot(1));
        h1.cancel();
        registry.notify(&snapshot(2));

        assert_eq!(first.data.borrow().len(), 1);
        assert_eq!(second.data.borrow().len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_drop_unregisters() {
        let registry = LiveRegistry::new();
        {
            let (_, _handle) = registry.register(Rc::new(Recorder::default()));
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handle_outlives_registry() {
        let registry = LiveRegistry::new();
        let (_, mut handle) = registry.register(Rc::new(Recorder::default()));
        drop(registry);
        handle.cancel();
        assert!(!handle.is_active());
    }

    #[test]
    fn test_fail_reports_errors() {
        let registry = LiveRegistry::new();
        let observer = Rc::new(Recorder::default());
        let (_, _handle) = registry.register(observer.clone());
        registry.fail("table dropped");
        assert_eq!(
            observer.errors.borrow().as_slice(),
            ["Subscription error: table dropped".to_string()]
        );
    }
}
