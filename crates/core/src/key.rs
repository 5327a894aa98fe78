//! Row-key codec.
//!
//! A row's identity is derived from its primary-key path and never stored.
//! Compound identities are JSON object text with fields in the schema's
//! declared order, so the same row always yields the same identity across
//! re-fetches. The identity can be turned back into a key the store accepts
//! for lookups (`to_queryable_key`) and deletes (`to_delete_key`).

use crate::schema::KeyPath;
use crate::value::{lookup, normalize_numbers, OUTBOUND_KEY_FIELD};
use core::fmt;
use core::hash::{Hash, Hasher};
use serde_json::{Map, Value};

/// The identity of a row.
#[derive(Clone, Debug)]
pub enum RowKey {
    /// Raw value of a single key field, type preserved.
    Single(Value),
    /// JSON object text of a compound key, fields in declared order.
    Composite(String),
    /// Surrogate key supplied by the store for tables without a key path.
    Outbound(Value),
    /// JSON text of the whole row. Not guaranteed unique.
    Serialized(String),
}

impl RowKey {
    /// Returns the canonical text this identity compares and hashes by.
    pub fn canonical(&self) -> String {
        match self {
            RowKey::Single(v) | RowKey::Outbound(v) => v.to_string(),
            RowKey::Composite(text) | RowKey::Serialized(text) => text.clone(),
        }
    }

    /// Returns true if this identity can address a row in the store.
    #[inline]
    pub fn is_addressable(&self) -> bool {
        !matches!(self, RowKey::Serialized(_))
    }

    /// Converts the identity into a key usable in get/put calls.
    ///
    /// Compound identities parse back into the key object; text that does not
    /// parse is returned as a string.
    pub fn to_queryable_key(&self) -> Value {
        match self {
            RowKey::Single(v) | RowKey::Outbound(v) => v.clone(),
            RowKey::Composite(text) | RowKey::Serialized(text) => {
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
            }
        }
    }

    /// Converts the identity into a key usable in delete calls.
    ///
    /// Object keys become positional arrays, matching compound primary keys.
    pub fn to_delete_key(&self) -> Value {
        match self.to_queryable_key() {
            Value::Object(map) => Value::Array(map.into_iter().map(|(_, v)| v).collect()),
            other => other,
        }
    }
}

impl PartialEq for RowKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind_tag() == other.kind_tag() && self.canonical() == other.canonical()
    }
}

impl Eq for RowKey {}

impl Hash for RowKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_tag().hash(state);
        self.canonical().hash(state);
    }
}

impl RowKey {
    fn kind_tag(&self) -> u8 {
        match self {
            RowKey::Single(_) => 0,
            RowKey::Composite(_) => 1,
            RowKey::Outbound(_) => 2,
            RowKey::Serialized(_) => 3,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Single(Value::String(s)) | RowKey::Outbound(Value::String(s)) => {
                f.write_str(s)
            }
            other => f.write_str(&other.canonical()),
        }
    }
}

/// Derives the identity of `row` under `key_path`.
pub fn get_row_key(row: &Value, key_path: &KeyPath) -> RowKey {
    match key_path {
        KeyPath::None => match row.get(OUTBOUND_KEY_FIELD) {
            Some(key) if !key.is_null() => RowKey::Outbound(normalize_numbers(key.clone())),
            _ => RowKey::Serialized(normalize_numbers(row.clone()).to_string()),
        },
        KeyPath::Single(field) => RowKey::Single(field_key(row, field)),
        KeyPath::Compound(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for field in fields {
                let value = field_key(row, field);
                map.insert(field.clone(), value);
            }
            RowKey::Composite(Value::Object(map).to_string())
        }
    }
}

fn field_key(row: &Value, field: &str) -> Value {
    lookup(row, field)
        .cloned()
        .map(normalize_numbers)
        .unwrap_or(Value::Null)
}

/// Recovers a key from identity text that travelled as a plain string.
///
/// Numeric text is returned unchanged, as a string. Anything else is parsed
/// as JSON, falling back to the raw string.
pub fn parse_identity(text: &str) -> Value {
    let trimmed = text.trim();
    let numeric = trimmed.is_empty() || trimmed.parse::<f64>().map_or(false, |n| !n.is_nan());
    if numeric {
        return Value::String(text.to_string());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
