//! Store interface consumed by the inspector.
//!
//! The inspector never owns data. It drives an embedded, transactional,
//! multi-table object store through [`DatabaseCore`] and [`TableCore`], and
//! decorates those traits to record what passes through them.

use crate::error::Result;
use crate::live::{LiveHandle, LiveObserver};
use crate::range::KeyRange;
use crate::schema::{DatabaseSchema, TableSchema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// Transaction mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// Read-only transaction.
    ReadOnly,
    /// Read-write transaction.
    ReadWrite,
}

/// Transaction identifier used to tie requests together.
pub type TransactionId = u64;

/// A transaction a request runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction id, unique per database.
    pub id: TransactionId,
    /// Transaction mode.
    pub mode: TransactionMode,
}

impl Transaction {
    /// Creates a transaction descriptor.
    pub fn new(id: TransactionId, mode: TransactionMode) -> Self {
        Self { id, mode }
    }

    /// Returns true for read-write transactions.
    #[inline]
    pub fn is_read_write(&self) -> bool {
        self.mode == TransactionMode::ReadWrite
    }
}

/// A write primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Insert new rows; fails on duplicate keys.
    Add {
        values: Vec<Value>,
        keys: Option<Vec<Value>>,
    },
    /// Insert or overwrite rows.
    Put {
        values: Vec<Value>,
        keys: Option<Vec<Value>>,
        /// Field changes that produced `values`, when the put is an update.
        change_spec: Option<Value>,
    },
    /// Delete rows by primary key.
    Delete { keys: Vec<Value> },
    /// Delete all rows whose primary key is in range.
    DeleteRange { range: KeyRange },
}

impl Mutation {
    /// Returns the primitive's name (`add`, `put`, `delete`, `deleteRange`).
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Add { .. } => "add",
            Mutation::Put { .. } => "put",
            Mutation::Delete { .. } => "delete",
            Mutation::DeleteRange { .. } => "deleteRange",
        }
    }

    /// Returns the explicit keys carried by the request, if any.
    pub fn keys(&self) -> Option<&[Value]> {
        match self {
            Mutation::Add { keys, .. } | Mutation::Put { keys, .. } => keys.as_deref(),
            Mutation::Delete { keys } => Some(keys),
            Mutation::DeleteRange { .. } => None,
        }
    }

    /// Returns the row values carried by the request, if any.
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Mutation::Add { values, .. } | Mutation::Put { values, .. } => Some(values),
            _ => None,
        }
    }
}

/// A mutate request.
#[derive(Clone, Debug, PartialEq)]
pub struct MutateRequest {
    pub trans: Transaction,
    pub mutation: Mutation,
}

/// Result of a mutate request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MutateResponse {
    /// Primary keys of the written rows, in request order.
    pub results: Vec<Value>,
    /// Number of rows that failed.
    pub failures: usize,
}

/// A point read.
#[derive(Clone, Debug, PartialEq)]
pub struct GetRequest {
    pub trans: Transaction,
    pub key: Value,
}

/// A batch point read.
#[derive(Clone, Debug, PartialEq)]
pub struct GetManyRequest {
    pub trans: Transaction,
    pub keys: Vec<Value>,
}

/// A range query over the primary key or a secondary index.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryRequest {
    pub trans: Transaction,
    /// Index name; `None` queries the primary key.
    pub index: Option<String>,
    pub range: KeyRange,
    /// Whether to return row values in addition to primary keys.
    pub values: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QueryRequest {
    /// Creates a request returning all values in `range` of the primary key.
    pub fn new(trans: Transaction, range: KeyRange) -> Self {
        Self {
            trans,
            index: None,
            range,
            values: true,
            limit: None,
            offset: 0,
        }
    }

    /// Queries a secondary index instead of the primary key.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Sets whether values are returned.
    pub fn with_values(mut self, values: bool) -> Self {
        self.values = values;
        self
    }

    /// Sets limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Result of a query request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResponse {
    /// Primary keys of matching rows, in index order.
    pub keys: Vec<Value>,
    /// Matching rows when values were requested.
    pub values: Option<Vec<Value>>,
}

/// A count request.
#[derive(Clone, Debug, PartialEq)]
pub struct CountRequest {
    pub trans: Transaction,
    pub index: Option<String>,
    pub range: KeyRange,
}

/// A table of the underlying store.
#[async_trait(?Send)]
pub trait TableCore {
    /// Returns the table name.
    fn name(&self) -> &str;

    /// Returns the table schema.
    fn schema(&self) -> &TableSchema;

    /// Applies a write primitive.
    async fn mutate(&self, req: MutateRequest) -> Result<MutateResponse>;

    /// Reads a row by primary key.
    async fn get(&self, req: GetRequest) -> Result<Option<Value>>;

    /// Reads several rows by primary key.
    async fn get_many(&self, req: GetManyRequest) -> Result<Vec<Option<Value>>>;

    /// Runs a range query.
    async fn query(&self, req: QueryRequest) -> Result<QueryResponse>;

    /// Counts rows in range.
    async fn count(&self, req: CountRequest) -> Result<usize>;
}

/// The underlying database.
pub trait DatabaseCore {
    /// Returns the database name.
    fn name(&self) -> &str;

    /// Returns the schema version.
    fn version(&self) -> u32;

    /// Returns the database schema.
    fn schema(&self) -> &DatabaseSchema;

    /// Returns a table by name.
    fn table(&self, name: &str) -> Result<Rc<dyn TableCore>>;

    /// Starts a transaction.
    fn begin(&self, mode: TransactionMode) -> Transaction;

    /// Observes a table. The observer receives a snapshot now and after each
    /// committed write until the returned handle is cancelled or dropped.
    fn observe_table(&self, table: &str, observer: Rc<dyn LiveObserver>) -> Result<LiveHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mutation_accessors() {
        let add = Mutation::Add {
            values: vec![json!({"id": 1})],
            keys: None,
        };
        assert_eq!(add.name(), "add");
        assert!(add.keys().is_none());
        assert_eq!(add.values().map(<[Value]>::len), Some(1));

        let delete = Mutation::Delete {
            keys: vec![json!(1), json!(2)],
        };
        assert_eq!(delete.name(), "delete");
        assert_eq!(delete.keys().map(<[Value]>::len), Some(2));
        assert!(delete.values().is_none());

        let range = Mutation::DeleteRange {
            range: KeyRange::all(),
        };
        assert_eq!(range.name(), "deleteRange");
    }

    #[test]
    fn test_query_request_builder() {
        let trans = Transaction::new(1, TransactionMode::ReadOnly);
        let req = QueryRequest::new(trans, KeyRange::all())
            .with_index("age")
            .with_limit(10)
            .with_offset(5);
        assert_eq!(req.index.as_deref(), Some("age"));
        assert_eq!(req.limit, Some(10));
        assert_eq!(req.offset, 5);
        assert!(req.values);
        assert!(!trans.is_read_write());
    }
}
