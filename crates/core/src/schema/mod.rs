//! Schema module for Tablescope.
//!
//! Describes what the inspector learns about an attached database: tables,
//! primary key paths (none, single or compound) and declared indexes.

mod index;
mod table;

pub use index::{IndexSpec, KeyPath, PrimaryKey};
pub use table::{DatabaseSchema, IndexTarget, TableSchema};
