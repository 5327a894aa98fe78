//! High-level table handle.
//!
//! [`Table`] wraps a [`TableCore`] with the row-oriented calls the inspector's
//! actions need. Every call runs in its own transaction.

use crate::error::{Error, Result};
use crate::live::TableSnapshot;
use crate::range::KeyRange;
use crate::schema::{KeyPath, TableSchema};
use crate::store::{
    CountRequest, DatabaseCore, GetRequest, MutateRequest, Mutation, QueryRequest, QueryResponse,
    TableCore, TransactionMode,
};
use crate::value::assign;
use serde_json::Value;
use std::rc::Rc;

/// A table of an attached database.
#[derive(Clone)]
pub struct Table {
    db: Rc<dyn DatabaseCore>,
    core: Rc<dyn TableCore>,
}

impl Table {
    /// Opens a table of `db` by name.
    pub fn open(db: Rc<dyn DatabaseCore>, name: &str) -> Result<Self> {
        let core = db.table(name)?;
        Ok(Self { db, core })
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Returns the table schema.
    #[inline]
    pub fn schema(&self) -> &TableSchema {
        self.core.schema()
    }

    /// Returns the primary key path.
    #[inline]
    pub fn key_path(&self) -> &KeyPath {
        self.core.schema().key_path()
    }

    /// Returns the underlying table.
    pub fn core(&self) -> &Rc<dyn TableCore> {
        &self.core
    }

    /// Inserts a row and returns its primary key.
    pub async fn add(&self, row: Value) -> Result<Value> {
        self.write_one(Mutation::Add {
            values: vec![row],
            keys: None,
        })
        .await
    }

    /// Inserts or overwrites a row and returns its primary key.
    pub async fn put(&self, row: Value) -> Result<Value> {
        self.write_one(Mutation::Put {
            values: vec![row],
            keys: None,
            change_spec: None,
        })
        .await
    }

    /// Inserts a row under an explicit key.
    ///
    /// See [`Table::put_with_key`] for how the key is applied.
    pub async fn add_with_key(&self, row: Value, key: Value) -> Result<Value> {
        let (row, keys) = self.keyed_row(row, key)?;
        self.write_one(Mutation::Add {
            values: vec![row],
            keys,
        })
        .await
    }

    /// Overwrites the row addressed by `key` with `row`.
    ///
    /// Inbound keys are written into the row's key fields; a compound key may
    /// be given as an object or a positional array. Outbound keys travel
    /// beside the row.
    pub async fn put_with_key(&self, row: Value, key: Value) -> Result<Value> {
        let (row, keys) = self.keyed_row(row, key)?;
        self.write_one(Mutation::Put {
            values: vec![row],
            keys,
            change_spec: None,
        })
        .await
    }

    /// Applies field changes to the row addressed by `key`.
    ///
    /// `changes` maps field paths to new values. Returns false when no row
    /// has that key.
    pub async fn update(&self, key: Value, changes: Value) -> Result<bool> {
        let Value::Object(fields) = &changes else {
            return Err(Error::invalid_operation("update changes must be an object"));
        };
        let key = self.store_key(key)?;
        let trans = self.db.begin(TransactionMode::ReadWrite);
        let current = self
            .core
            .query(QueryRequest::new(trans, KeyRange::only(key.clone())))
            .await?;
        let Some(mut row) = current.values.and_then(|v| v.into_iter().next()) else {
            return Ok(false);
        };
        for (path, value) in fields {
            if !assign(&mut row, path, value.clone()) {
                return Err(Error::invalid_operation(format!(
                    "cannot set {path} on table {}",
                    self.name()
                )));
            }
        }
        let keys = self.key_path().is_none().then(|| vec![key]);
        self.core
            .mutate(MutateRequest {
                trans,
                mutation: Mutation::Put {
                    values: vec![row],
                    keys,
                    change_spec: Some(changes.clone()),
                },
            })
            .await?;
        Ok(true)
    }

    /// Deletes the row addressed by `key`.
    pub async fn delete(&self, key: Value) -> Result<()> {
        let key = self.store_key(key)?;
        let trans = self.db.begin(TransactionMode::ReadWrite);
        self.core
            .mutate(MutateRequest {
                trans,
                mutation: Mutation::Delete { keys: vec![key] },
            })
            .await?;
        Ok(())
    }

    /// Deletes every row.
    pub async fn clear(&self) -> Result<()> {
        let trans = self.db.begin(TransactionMode::ReadWrite);
        self.core
            .mutate(MutateRequest {
                trans,
                mutation: Mutation::DeleteRange {
                    range: KeyRange::all(),
                },
            })
            .await?;
        Ok(())
    }

    /// Reads the row addressed by `key`.
    pub async fn get(&self, key: Value) -> Result<Option<Value>> {
        let key = self.store_key(key)?;
        let trans = self.db.begin(TransactionMode::ReadOnly);
        self.core.get(GetRequest { trans, key }).await
    }

    /// Reads all rows in primary-key order.
    pub async fn to_array(&self) -> Result<Vec<Value>> {
        let trans = self.db.begin(TransactionMode::ReadOnly);
        let resp = self
            .core
            .query(QueryRequest::new(trans, KeyRange::all()))
            .await?;
        Ok(resp.values.unwrap_or_default())
    }

    /// Reads all primary keys in order.
    pub async fn primary_keys(&self) -> Result<Vec<Value>> {
        let trans = self.db.begin(TransactionMode::ReadOnly);
        let resp = self
            .core
            .query(QueryRequest::new(trans, KeyRange::all()).with_values(false))
            .await?;
        Ok(resp.keys)
    }

    /// Reads primary keys and rows in one transaction.
    pub async fn snapshot(&self) -> Result<TableSnapshot> {
        let trans = self.db.begin(TransactionMode::ReadOnly);
        let resp = self
            .core
            .query(QueryRequest::new(trans, KeyRange::all()))
            .await?;
        Ok(TableSnapshot::new(resp.keys, resp.values.unwrap_or_default()))
    }

    /// Counts all rows.
    pub async fn count(&self) -> Result<usize> {
        let trans = self.db.begin(TransactionMode::ReadOnly);
        self.core
            .count(CountRequest {
                trans,
                index: None,
                range: KeyRange::all(),
            })
            .await
    }

    /// Queries an index (`None` = primary key) for rows in range.
    pub async fn query_index(&self, index: Option<&str>, range: KeyRange) -> Result<QueryResponse> {
        let trans = self.db.begin(TransactionMode::ReadOnly);
        let mut req = QueryRequest::new(trans, range);
        if let Some(index) = index {
            req = req.with_index(index);
        }
        self.core.query(req).await
    }

    fn keyed_row(&self, mut row: Value, key: Value) -> Result<(Value, Option<Vec<Value>>)> {
        let fields: Vec<(String, Value)> = match self.key_path() {
            KeyPath::None => return Ok((row, Some(vec![key]))),
            KeyPath::Single(field) => vec![(field.clone(), key)],
            KeyPath::Compound(fields) => fields
                .iter()
                .cloned()
                .zip(compound_parts(fields, key)?)
                .collect(),
        };
        for (field, part) in fields {
            if !assign(&mut row, &field, part) {
                return Err(Error::invalid_key(format!(
                    "cannot write key field {field} into a non-object row"
                )));
            }
        }
        Ok((row, None))
    }

    async fn write_one(&self, mutation: Mutation) -> Result<Value> {
        let trans = self.db.begin(TransactionMode::ReadWrite);
        let resp = self.core.mutate(MutateRequest { trans, mutation }).await?;
        resp.results
            .into_iter()
            .next()
            .ok_or_else(|| Error::invalid_operation(format!("no key returned by {}", self.name())))
    }

    /// Converts a queryable key into the form the store keys rows by.
    fn store_key(&self, key: Value) -> Result<Value> {
        match self.key_path() {
            KeyPath::Compound(fields) => compound_parts(fields, key).map(Value::Array),
            _ => Ok(key),
        }
    }
}

/// Splits a compound key given as object or positional array into parts.
fn compound_parts(fields: &[String], key: Value) -> Result<Vec<Value>> {
    match key {
        Value::Object(mut map) => Ok(fields
            .iter()
            .map(|f| map.remove(f).unwrap_or(Value::Null))
            .collect()),
        Value::Array(parts) if parts.len() == fields.len() => Ok(parts),
        other => Err(Error::invalid_key(format!(
            "expected a key with {} parts, got {other}",
            fields.len()
        ))),
    }
}
