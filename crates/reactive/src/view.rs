//! Live table view.
//!
//! `LiveTableView` keeps the displayed rows of one table in sync with the
//! store. Selecting a table cancels the previous observation before opening a
//! new one; every emission is tagged with the generation of the observation
//! that produced it, and emissions from an outgoing observation are dropped.
//! Each accepted emission runs through the change tracker before the visible
//! rows are replaced.

use crate::change::ViewChange;
use crate::config::TrackerConfig;
use crate::history::{ChangeTracker, HistoryEntry};
use crate::subscription::{SubscriptionId, SubscriptionManager};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;
use tablescope_core::schema::KeyPath;
use tablescope_core::store::DatabaseCore;
use tablescope_core::value::OUTBOUND_KEY_FIELD;
use tablescope_core::{Error, LiveHandle, LiveObserver, Result, RowKey, TableSnapshot};
use tracing::{debug, error};

/// Field holding the value of a non-object row of an outbound-key table.
pub const WRAPPED_VALUE_FIELD: &str = "__value";

/// Lifecycle of a live view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewStatus {
    /// No table observed.
    Idle,
    /// Observation opened, no data yet.
    Subscribing,
    /// Receiving data.
    Streaming,
    /// The observation failed; the last good rows are kept.
    Failed(String),
}

struct ViewState {
    table: Option<String>,
    key_path: KeyPath,
    rows: Vec<Value>,
    primary_keys: Vec<Value>,
    status: ViewStatus,
    generation: u64,
    emissions: u64,
    tracker: ChangeTracker,
    listeners: SubscriptionManager,
}

/// A live, change-tracked view of one table.
pub struct LiveTableView {
    db: Rc<dyn DatabaseCore>,
    state: Rc<RefCell<ViewState>>,
    handle: Option<LiveHandle>,
}

impl LiveTableView {
    /// Creates an idle view over `db`.
    pub fn new(db: Rc<dyn DatabaseCore>, config: TrackerConfig) -> Self {
        let state = ViewState {
            table: None,
            key_path: KeyPath::None,
            rows: Vec::new(),
            primary_keys: Vec::new(),
            status: ViewStatus::Idle,
            generation: 0,
            emissions: 0,
            tracker: ChangeTracker::new(config),
            listeners: SubscriptionManager::new(),
        };
        Self {
            db,
            state: Rc::new(RefCell::new(state)),
            handle: None,
        }
    }

    /// Observes `table`, replacing any previous observation.
    ///
    /// Rows, history and highlights are reset. The store usually delivers the
    /// first row set before this returns.
    pub fn select(&mut self, table: &str) -> Result<()> {
        self.handle = None;

        let key_path = self
            .db
            .schema()
            .get_table(table)
            .map(|t| t.key_path().clone())
            .ok_or_else(|| Error::table_not_found(table));
        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.rows.clear();
            state.primary_keys.clear();
            state.emissions = 0;
            state.tracker.reset();
            match &key_path {
                Ok(path) => {
                    state.table = Some(table.to_string());
                    state.key_path = path.clone();
                    state.status = ViewStatus::Subscribing;
                }
                Err(_) => {
                    state.table = None;
                    state.key_path = KeyPath::None;
                    state.status = ViewStatus::Idle;
                }
            }
            state.generation
        };
        let key_path = key_path?;

        let observer = Rc::new(ViewObserver {
            state: Rc::downgrade(&self.state),
            generation,
            table: table.to_string(),
            key_path,
        });
        match self.db.observe_table(table, observer) {
            Ok(handle) => {
                debug!(table = %table, generation, "live view subscribed");
                self.handle = Some(handle);
                Ok(())
            }
            Err(err) => {
                error!(table = %table, error = %err, "live query failed to start");
                self.state.borrow_mut().status = ViewStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Cancels the observation. Rows stay visible; the view becomes idle.
    pub fn unsubscribe(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.cancel();
        }
        let mut state = self.state.borrow_mut();
        state.generation += 1;
        state.status = ViewStatus::Idle;
    }

    /// Returns true while an observation is open.
    pub fn is_subscribed(&self) -> bool {
        self.handle.as_ref().map_or(false, LiveHandle::is_active)
    }

    /// Returns the observed table.
    pub fn table(&self) -> Option<String> {
        self.state.borrow().table.clone()
    }

    /// Returns the key path of the observed table.
    pub fn key_path(&self) -> KeyPath {
        self.state.borrow().key_path.clone()
    }

    /// Returns the visible rows.
    ///
    /// Rows of outbound-key tables carry their key under `__outbound_key`.
    pub fn rows(&self) -> Vec<Value> {
        self.state.borrow().rows.clone()
    }

    /// Returns the primary keys of the visible rows.
    pub fn primary_keys(&self) -> Vec<Value> {
        self.state.borrow().primary_keys.clone()
    }

    /// Returns the status.
    pub fn status(&self) -> ViewStatus {
        self.state.borrow().status.clone()
    }

    /// Returns the number of emissions accepted since the last select.
    pub fn emissions(&self) -> u64 {
        self.state.borrow().emissions
    }

    /// Returns the recorded versions of a row.
    pub fn history(&self, key: &RowKey) -> Vec<HistoryEntry> {
        self.state.borrow().tracker.history(key).to_vec()
    }

    /// Returns the identities highlighted at `now`.
    pub fn highlighted(&self, now: Instant) -> Vec<RowKey> {
        self.state.borrow().tracker.highlights().active(now)
    }

    /// Returns true if `key` is highlighted at `now`.
    pub fn is_highlighted(&self, key: &RowKey, now: Instant) -> bool {
        self.state.borrow().tracker.highlights().is_highlighted(key, now)
    }

    /// Returns when the current highlight batch expires, if one was set.
    pub fn highlight_deadline(&self) -> Option<Instant> {
        self.state.borrow().tracker.highlights().deadline()
    }

    /// Registers a listener called after every accepted emission.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ViewChange) + 'static,
    {
        self.state.borrow_mut().listeners.subscribe(callback)
    }

    /// Removes a listener.
    pub fn unsubscribe_listener(&self, id: SubscriptionId) -> bool {
        self.state.borrow_mut().listeners.unsubscribe(id)
    }
}

struct ViewObserver {
    state: Weak<RefCell<ViewState>>,
    generation: u64,
    table: String,
    key_path: KeyPath,
}

impl LiveObserver for ViewObserver {
    fn on_data(&self, snapshot: TableSnapshot) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let (change, callbacks) = {
            let Ok(mut state) = state.try_borrow_mut() else {
                error!(table = %self.table, "live view busy, emission dropped");
                return;
            };
            if state.generation != self.generation {
                return;
            }
            let TableSnapshot { primary_keys, rows } = snapshot;
            let rows = if self.key_path.is_none() {
                zip_outbound(&primary_keys, rows)
            } else {
                rows
            };
            let changed = state.tracker.ingest(&rows, &self.key_path);
            state.emissions += 1;
            state.status = ViewStatus::Streaming;
            let change = ViewChange {
                emission: state.emissions,
                row_count: rows.len(),
                changed,
                highlight_until: state.tracker.highlights().deadline(),
            };
            state.rows = rows;
            state.primary_keys = primary_keys;
            (change, state.listeners.callbacks())
        };
        for callback in callbacks {
            callback(&change);
        }
    }

    fn on_error(&self, err: Error) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let Ok(mut state) = state.try_borrow_mut() else {
            return;
        };
        if state.generation != self.generation {
            return;
        }
        error!(table = %self.table, error = %err, "live query error");
        state.status = ViewStatus::Failed(err.to_string());
    }
}

/// Zips outbound keys into rows under `__outbound_key`.
///
/// Non-object rows are wrapped as `{__outbound_key, __value}`.
pub fn zip_outbound(keys: &[Value], rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter()
        .zip(keys.iter())
        .map(|(row, key)| match row {
            Value::Object(mut map) => {
                map.insert(OUTBOUND_KEY_FIELD.to_string(), key.clone());
                Value::Object(map)
            }
            other => {
                let mut map = Map::new();
                map.insert(OUTBOUND_KEY_FIELD.to_string(), key.clone());
                map.insert(WRAPPED_VALUE_FIELD.to_string(), other);
                Value::Object(map)
            }
        })
        .collect()
}

/// Reverses [`zip_outbound`]: removes the zipped key and unwraps wrapped values.
pub fn unzip_outbound(row: &Value) -> Value {
    let Value::Object(map) = row else {
        return row.clone();
    };
    if !map.contains_key(OUTBOUND_KEY_FIELD) {
        return row.clone();
    }
    let mut map = map.clone();
    map.remove(OUTBOUND_KEY_FIELD);
    if map.len() == 1 {
        if let Some(inner) = map.remove(WRAPPED_VALUE_FIELD) {
            return inner;
        }
    }
    Value::Object(map)
}
