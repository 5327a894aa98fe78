//! Tablescope Core - Core types and store interface for the Tablescope inspector.
//!
//! This crate provides the foundations shared by every other Tablescope crate:
//!
//! - `value`: Key ordering over JSON values and field lookup
//! - `schema`: Table schemas, key paths and index declarations
//! - `key`: The row-key codec (`get_row_key`, `RowKey::to_queryable_key`, ...)
//! - `range`: Key ranges for primary-key and index queries
//! - `store`: The `DatabaseCore`/`TableCore` traits the inspector drives
//! - `live`: Live table observation (`LiveObserver`, `LiveHandle`)
//! - `Table`: A row-oriented handle over a `TableCore`
//! - `Error`: Error types for inspector operations
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tablescope_core::key::get_row_key;
//! use tablescope_core::schema::{IndexSpec, KeyPath, TableSchema};
//!
//! let schema = TableSchema::new("friends")
//!     .primary_key(KeyPath::compound(["first", "last"]), false)
//!     .index(IndexSpec::new("age"));
//! assert_eq!(schema.schema_string(), "[first+last], age");
//!
//! let row = json!({"last": "Doe", "age": 30, "first": "Jane"});
//! let key = get_row_key(&row, schema.key_path());
//! assert_eq!(key.canonical(), r#"{"first":"Jane","last":"Doe"}"#);
//! assert_eq!(key.to_delete_key(), json!(["Jane", "Doe"]));
//! ```

mod error;
mod handle;
pub mod key;
pub mod live;
pub mod range;
pub mod schema;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use handle::Table;
pub use key::{get_row_key, parse_identity, RowKey};
pub use live::{LiveHandle, LiveObserver, TableSnapshot};
pub use range::KeyRange;
pub use serde_json::Value;
