//! The table browser: a live view of one table plus the actions on its rows.

use crate::batch::run_batch;
use serde_json::Value;
use std::rc::Rc;
use std::time::Instant;
use tablescope_core::store::DatabaseCore;
use tablescope_core::{Error, Result, RowKey, Table};
use tablescope_reactive::{rollback, HistoryEntry, LiveTableView, TrackerConfig, ViewStatus};
use tracing::debug;

/// A live view of the selected table and the actions on its rows.
pub struct TableBrowser {
    db: Rc<dyn DatabaseCore>,
    view: LiveTableView,
    table: Option<Table>,
    concurrency: usize,
}

impl TableBrowser {
    /// Creates a browser with no table selected.
    pub fn new(db: Rc<dyn DatabaseCore>, tracker: TrackerConfig, concurrency: usize) -> Self {
        Self {
            view: LiveTableView::new(db.clone(), tracker),
            db,
            table: None,
            concurrency: concurrency.max(1),
        }
    }

    /// Selects a table, replacing the previous live view.
    pub fn select(&mut self, name: &str) -> Result<()> {
        self.table = None;
        let table = Table::open(self.db.clone(), name)?;
        self.view.select(name)?;
        self.table = Some(table);
        Ok(())
    }

    /// Stops observing the selected table.
    pub fn close(&mut self) {
        self.view.unsubscribe();
        self.table = None;
    }

    /// Returns the selected table.
    pub fn table(&self) -> Result<&Table> {
        self.table
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("no table selected"))
    }

    /// Returns the live view.
    pub fn view(&self) -> &LiveTableView {
        &self.view
    }

    /// Returns the visible rows.
    pub fn rows(&self) -> Vec<Value> {
        self.view.rows()
    }

    pub fn status(&self) -> ViewStatus {
        self.view.status()
    }

    /// Returns the identity of a visible row.
    pub fn row_key(&self, row: &Value) -> RowKey {
        tablescope_core::get_row_key(row, &self.view.key_path())
    }

    /// Inserts a row; `key` is required for outbound-key tables without
    /// auto-increment.
    pub async fn add_row(&self, row: Value, key: Option<Value>) -> Result<Value> {
        let table = self.table()?;
        match key {
            Some(key) => table.add_with_key(row, key).await,
            None => table.add(row).await,
        }
    }

    /// Saves an edited row, overwriting the row addressed by `key` if given.
    pub async fn save_row(&self, row: Value, key: Option<Value>) -> Result<Value> {
        let table = self.table()?;
        match key {
            Some(key) => table.put_with_key(row, key).await,
            None => table.put(row).await,
        }
    }

    /// Sets one field of a row. Returns false if the row no longer exists.
    pub async fn update_field(&self, key: &RowKey, field: &str, value: Value) -> Result<bool> {
        let table = self.table()?;
        let mut changes = serde_json::Map::new();
        changes.insert(field.to_string(), value);
        table
            .update(addressable(key)?.to_queryable_key(), Value::Object(changes))
            .await
    }

    /// Deletes one row.
    pub async fn delete_row(&self, key: &RowKey) -> Result<()> {
        let table = self.table()?;
        table.delete(addressable(key)?.to_delete_key()).await
    }

    /// Deletes rows concurrently.
    ///
    /// All deletes run even if some fail; failures are reported as one
    /// [`Error::Batch`] and the successful deletes stay applied.
    pub async fn bulk_delete(&self, keys: Vec<RowKey>) -> Result<usize> {
        let table = self.table()?;
        debug!(table = %table.name(), rows = keys.len(), "bulk delete");
        run_batch("bulk delete", keys, self.concurrency, |key| async move {
            table.delete(addressable(&key)?.to_delete_key()).await
        })
        .await
    }

    /// Deletes every row of the selected table.
    pub async fn truncate(&self) -> Result<()> {
        self.table()?.clear().await
    }

    /// Restores a row to a recorded version.
    pub async fn rollback(&self, entry: &HistoryEntry) -> Result<Value> {
        rollback(self.table()?, &entry.data).await
    }

    /// Returns the recorded versions of a row.
    pub fn history(&self, key: &RowKey) -> Vec<HistoryEntry> {
        self.view.history(key)
    }

    /// Returns the rows highlighted now.
    pub fn highlighted(&self) -> Vec<RowKey> {
        self.view.highlighted(Instant::now())
    }

    /// Returns when the current highlights expire.
    pub fn highlight_deadline(&self) -> Option<Instant> {
        self.view.highlight_deadline()
    }
}

fn addressable(key: &RowKey) -> Result<&RowKey> {
    if key.is_addressable() {
        Ok(key)
    } else {
        Err(Error::invalid_key(format!("row {key} has no usable primary key")))
    }
}
