//! Tablescope Inspector - Developer tooling core for embedded object stores.
//!
//! This crate ties the Tablescope crates together behind one context:
//!
//! - `Inspector`: Attaches to a database, records its operations and runs queries
//! - `TableBrowser`: A live, change-tracked view of one table with row actions
//! - `InspectorConfig`: Highlight timing, tracking limits, cloud mode, bulk concurrency
//! - `DatabaseInfo`: Schema introspection

mod batch;
mod browser;
pub mod config;
pub mod info;
mod inspector;

pub use batch::run_batch;
pub use browser::TableBrowser;
pub use config::InspectorConfig;
pub use info::{DatabaseInfo, TableInfo};
pub use inspector::Inspector;
