//! Row storage for the in-memory store.
//!
//! This module provides the `RowStore` struct which holds the rows of a single
//! table ordered by primary key, generates auto-increment keys and serves
//! primary-key and secondary-index range scans.

use std::collections::BTreeMap;
use serde_json::Value;
use tablescope_core::schema::{IndexSpec, KeyPath, TableSchema};
use tablescope_core::value::{assign, compare_keys, is_valid_key, lookup, OrderedKey};
use tablescope_core::{Error, KeyRange, Result, TableSnapshot};

/// Row storage for a single table.
#[derive(Clone)]
pub struct RowStore {
    schema: TableSchema,
    rows: BTreeMap<OrderedKey, Value>,
    next_key: i64,
}

impl RowStore {
    /// Creates a new row store for the given table schema.
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
            next_key: 1,
        }
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inserts a new row. Fails if the key or a unique index value exists.
    pub fn insert(&mut self, mut row: Value, key: Option<Value>) -> Result<Value> {
        let pk = self.resolve_key(&mut row, key)?;
        let ordered = OrderedKey(pk.clone());
        if self.rows.contains_key(&ordered) {
            return Err(Error::constraint(format!(
                "Key {pk} already exists in table {}",
                self.schema.name
            )));
        }
        self.check_unique(&row, &pk)?;
        self.bump_next_key(&pk);
        self.rows.insert(ordered, row);
        Ok(pk)
    }

    /// Inserts or replaces a row.
    pub fn upsert(&mut self, mut row: Value, key: Option<Value>) -> Result<Value> {
        let pk = self.resolve_key(&mut row, key)?;
        self.check_unique(&row, &pk)?;
        self.bump_next_key(&pk);
        self.rows.insert(OrderedKey(pk.clone()), row);
        Ok(pk)
    }

    /// Deletes a row by primary key. Returns whether a row was removed.
    pub fn delete(&mut self, key: &Value) -> bool {
        self.rows.remove(&OrderedKey(key.clone())).is_some()
    }

    /// Deletes all rows whose primary key is in range. Returns removed keys.
    pub fn delete_range(&mut self, range: &KeyRange) -> Vec<Value> {
        let keys: Vec<OrderedKey> = self
            .rows
            .keys()
            .filter(|k| range.contains(&k.0))
            .cloned()
            .collect();
        for key in &keys {
            self.rows.remove(key);
        }
        keys.into_iter().map(|k| k.0).collect()
    }

    /// Clears all rows. Auto-increment state is kept.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Gets a row by primary key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.rows.get(&OrderedKey(key.clone()))
    }

    /// Scans the primary key in order, returning `(key, row)` pairs in range.
    pub fn scan(&self, range: &KeyRange, limit: Option<usize>, offset: usize) -> Vec<(Value, Value)> {
        self.rows
            .iter()
            .filter(|(k, _)| range.contains(&k.0))
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|(k, row)| (k.0.clone(), row.clone()))
            .collect()
    }

    /// Scans a secondary index in `(index key, primary key)` order.
    ///
    /// Rows whose index value is not a valid key are not indexed. Multi-entry
    /// indexes yield one entry per array element, so a row may appear more
    /// than once.
    pub fn index_scan(
        &self,
        index_name: &str,
        range: &KeyRange,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<(Value, Value)>> {
        let index = self
            .schema
            .get_index(index_name)
            .ok_or_else(|| Error::index_not_found(&self.schema.name, index_name))?;
        let mut entries: Vec<(Value, &OrderedKey, &Value)> = Vec::new();
        for (pk, row) in &self.rows {
            for key in index_keys(index, row) {
                if range.contains(&key) {
                    entries.push((key, pk, row));
                }
            }
        }
        entries.sort_by(|a, b| compare_keys(&a.0, &b.0).then_with(|| a.1.cmp(b.1)));
        Ok(entries
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|(_, pk, row)| (pk.0.clone(), row.clone()))
            .collect())
    }

    /// Counts rows in range of the primary key or an index.
    pub fn count(&self, index: Option<&str>, range: &KeyRange) -> Result<usize> {
        match index {
            None => Ok(self.rows.keys().filter(|k| range.contains(&k.0)).count()),
            Some(name) => Ok(self.index_scan(name, range, None, 0)?.len()),
        }
    }

    /// Returns a consistent snapshot of all keys and rows.
    pub fn snapshot(&self) -> TableSnapshot {
        let (primary_keys, rows) = self
            .rows
            .iter()
            .map(|(k, row)| (k.0.clone(), row.clone()))
            .unzip();
        TableSnapshot::new(primary_keys, rows)
    }

    /// Determines the primary key of `row`, generating one when allowed.
    fn resolve_key(&self, row: &mut Value, key: Option<Value>) -> Result<Value> {
        let primary = &self.schema.primary_key;
        let pk = match &primary.key_path {
            KeyPath::None => match key {
                Some(key) => key,
                None if primary.auto_increment => Value::from(self.next_key),
                None => {
                    return Err(Error::invalid_key(format!(
                        "table {} has no key path and no key was given",
                        self.schema.name
                    )))
                }
            },
            KeyPath::Single(field) => match lookup(row, field).filter(|v| !v.is_null()).cloned() {
                Some(value) => value,
                None if primary.auto_increment => {
                    let generated = Value::from(self.next_key);
                    if !assign(row, field, generated.clone()) {
                        return Err(Error::invalid_key("cannot assign a key to a non-object row"));
                    }
                    generated
                }
                None => {
                    return Err(Error::invalid_key(format!(
                        "row is missing key field {field}"
                    )))
                }
            },
            KeyPath::Compound(fields) => Value::Array(
                fields
                    .iter()
                    .map(|f| lookup(row, f).cloned().unwrap_or(Value::Null))
                    .collect(),
            ),
        };
        if !is_valid_key(&pk) {
            return Err(Error::invalid_key(format!(
                "{pk} is not a valid key for table {}",
                self.schema.name
            )));
        }
        Ok(pk)
    }

    fn check_unique(&self, row: &Value, pk: &Value) -> Result<()> {
        for index in self.schema.indexes.iter().filter(|i| i.unique) {
            for key in index_keys(index, row) {
                let taken = self.rows.iter().any(|(other_pk, other)| {
                    compare_keys(&other_pk.0, pk).is_ne()
                        && index_keys(index, other)
                            .iter()
                            .any(|k| compare_keys(k, &key).is_eq())
                });
                if taken {
                    return Err(Error::constraint(format!(
                        "Unique index {} already contains {key}",
                        index.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn bump_next_key(&mut self, pk: &Value) {
        if let Some(n) = pk.as_f64() {
            let floor = n.floor();
            if floor >= self.next_key as f64 {
                self.next_key = floor as i64 + 1;
            }
        }
    }
}

/// Extracts the index keys of a row.
fn index_keys(index: &IndexSpec, row: &Value) -> Vec<Value> {
    let value = match &index.key_path {
        KeyPath::None => return Vec::new(),
        KeyPath::Single(field) => match lookup(row, field) {
            Some(v) => v.clone(),
            None => return Vec::new(),
        },
        KeyPath::Compound(fields) => {
            let mut parts = Vec::with_capacity(fields.len());
            for field in fields {
                match lookup(row, field) {
                    Some(v) => parts.push(v.clone()),
                    None => return Vec::new(),
                }
            }
            Value::Array(parts)
        }
    };
    if index.multi_entry {
        if let Value::Array(items) = value {
            let mut keys: Vec<Value> = Vec::new();
            for item in items.into_iter().filter(is_valid_key) {
                if !keys.iter().any(|k| compare_keys(k, &item).is_eq()) {
                    keys.push(item);
                }
            }
            return keys;
        }
    }
    if is_valid_key(&value) {
        vec![value]
    } else {
        Vec::new()
    }
}
