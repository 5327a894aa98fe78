//! Tablescope Storage - In-memory reference store for the Tablescope inspector.
//!
//! This crate provides a small embedded object store implementing the
//! `DatabaseCore`/`TableCore` traits, so the inspector can be exercised end to
//! end without a browser database:
//!
//! - `RowStore`: Rows of one table ordered by primary key, with index scans
//! - `MemoryDatabase`: Tables, transactions and live observation
//! - `LiveRegistry`: Synchronous fan-out of committed snapshots
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tablescope_core::schema::{DatabaseSchema, KeyPath, TableSchema};
//! use tablescope_storage::RowStore;
//!
//! let schema = TableSchema::new("users").primary_key(KeyPath::single("id"), true);
//! let mut store = RowStore::new(schema);
//! let key = store.insert(json!({"name": "Alice"}), None).unwrap();
//!
//! assert_eq!(key, json!(1));
//! assert_eq!(store.get(&key).unwrap()["id"], json!(1));
//! ```

pub mod database;
pub mod live;
pub mod row_store;

pub use database::{MemoryDatabase, MemoryTable};
pub use live::{LiveRegistry, ObserverId};
pub use row_store::RowStore;
