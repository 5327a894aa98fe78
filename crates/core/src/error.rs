//! Error types for Tablescope.

use thiserror::Error;

/// Result type alias for Tablescope operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for inspector and store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Table not found.
    #[error("Table not found: {name}")]
    TableNotFound { name: String },
    /// Index not found, or the field is not indexed.
    #[error("Index {index} not found in table {table}")]
    IndexNotFound { table: String, index: String },
    /// Row not found.
    #[error("Not found in table {table}: {key}")]
    NotFound { table: String, key: String },
    /// A write was rejected by the store (duplicate key, unique index, ...).
    #[error("Constraint violation: {message}")]
    Constraint { message: String },
    /// A key could not be derived or applied.
    #[error("Invalid key: {message}")]
    InvalidKey { message: String },
    /// A query could not be built from user input.
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },
    /// Invalid operation.
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },
    /// A live subscription failed.
    #[error("Subscription error: {message}")]
    Subscription { message: String },
    /// One or more per-row requests of a batch failed.
    #[error("{failed} of {total} requests failed, first error: {first}")]
    Batch {
        failed: usize,
        total: usize,
        first: Box<Error>,
    },
    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates an index not found error.
    pub fn index_not_found(table: impl Into<String>, index: impl Into<String>) -> Self {
        Error::IndexNotFound {
            table: table.into(),
            index: index.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(table: impl Into<String>, key: impl Into<String>) -> Self {
        Error::NotFound {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Creates a constraint error.
    pub fn constraint(message: impl Into<String>) -> Self {
        Error::Constraint {
            message: message.into(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Error::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a subscription error.
    pub fn subscription(message: impl Into<String>) -> Self {
        Error::Subscription {
            message: message.into(),
        }
    }

    /// Creates a batch error from the first failure.
    pub fn batch(failed: usize, total: usize, first: Error) -> Self {
        Error::Batch {
            failed,
            total,
            first: Box::new(first),
        }
    }
}
