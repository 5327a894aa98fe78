//! Operation records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime};
use tablescope_core::KeyRange;

/// Classification of a recorded operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
    Unknown,
}

impl OperationKind {
    /// All kinds, in display order.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Read,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::Unknown,
    ];

    /// Maps a write primitive name to its kind.
    pub fn from_primitive(name: &str) -> Self {
        match name {
            "add" => OperationKind::Create,
            "put" => OperationKind::Update,
            "delete" | "deleteRange" => OperationKind::Delete,
            _ => OperationKind::Unknown,
        }
    }

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Read => "read",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Unknown => "unknown",
        }
    }
}

/// Parameters of a recorded range query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDetails {
    pub index: Option<String>,
    pub range: KeyRange,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// One entry of the operation log. Immutable once logged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Position in the log, assigned on append.
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifications: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_details: Option<QueryDetails>,
    pub timestamp: SystemTime,
    /// Wall time spent in the store, in milliseconds.
    pub duration_ms: f64,
    pub results: Value,
}

impl Operation {
    /// Creates a record stamped with the current time.
    pub fn new(kind: OperationKind, table: impl Into<String>) -> Self {
        Self {
            seq: 0,
            kind,
            table: table.into(),
            key: None,
            keys: None,
            values: None,
            modifications: None,
            query_details: None,
            timestamp: SystemTime::now(),
            duration_ms: 0.0,
            results: Value::Null,
        }
    }

    /// Sets the affected keys. A single key is also stored as `key`.
    pub fn with_keys(mut self, keys: Vec<Value>) -> Self {
        if keys.len() == 1 {
            self.key = keys.first().cloned();
        }
        self.keys = Some(keys);
        self
    }

    /// Sets the written values.
    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.values = Some(values);
        self
    }

    /// Sets the field changes of an update.
    pub fn with_modifications(mut self, modifications: Value) -> Self {
        self.modifications = Some(modifications);
        self
    }

    /// Sets the query parameters.
    pub fn with_query_details(mut self, details: QueryDetails) -> Self {
        self.query_details = Some(details);
        self
    }

    /// Sets the elapsed time.
    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = elapsed.as_secs_f64() * 1000.0;
        self
    }

    /// Sets the result payload.
    pub fn with_results(mut self, results: Value) -> Self {
        self.results = results;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_primitive() {
        assert_eq!(OperationKind::from_primitive("add"), OperationKind::Create);
        assert_eq!(OperationKind::from_primitive("put"), OperationKind::Update);
        assert_eq!(OperationKind::from_primitive("delete"), OperationKind::Delete);
        assert_eq!(OperationKind::from_primitive("deleteRange"), OperationKind::Delete);
        assert_eq!(OperationKind::from_primitive("openCursor"), OperationKind::Unknown);
    }

    #[test]
    fn test_single_key_sets_key() {
        let op = Operation::new(OperationKind::Delete, "t").with_keys(vec![json!(1)]);
        assert_eq!(op.key, Some(json!(1)));
        let op = Operation::new(OperationKind::Delete, "t").with_keys(vec![json!(1), json!(2)]);
        assert_eq!(op.key, None);
        assert_eq!(op.keys.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_duration_ms() {
        let op = Operation::new(OperationKind::Read, "t").with_duration(Duration::from_micros(1500));
        assert!((op.duration_ms - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_serialized_shape() {
        let op = Operation::new(OperationKind::Update, "products")
            .with_keys(vec![json!(1)])
            .with_results(json!({"changeSpec": null}));
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["type"], json!("update"));
        assert_eq!(value["key"], json!(1));
        assert!(value.get("queryDetails").is_none());
        assert!(value.get("durationMs").is_some());
    }
}
