//! Tablescope Recorder - Operation recording for the Tablescope inspector.
//!
//! This crate decorates a database so that every operation passing through
//! its tables lands in an audit log:
//!
//! - `Operation`: A logged operation with kind, keys, timing and results
//! - `OperationLog`: Shared, append-only log with change listeners
//! - `RecordingDatabase` / `RecordingTable`: The recording decorators
//! - `OperationFilter`: Log filtering by kind, table and cloud classification
//!
//! # Example
//!
//! ```rust
//! use tablescope_recorder::{Operation, OperationKind, OperationLog, OperationFilter};
//!
//! let log = OperationLog::new();
//! log.push(Operation::new(OperationKind::Create, "todos"));
//! log.push(Operation::new(OperationKind::Read, "$jobs"));
//!
//! let filter = OperationFilter::new().cloud(true);
//! assert_eq!(log.filtered(&filter).len(), 1);
//! ```

pub mod filter;
pub mod log;
pub mod middleware;
pub mod operation;

pub use filter::{is_cloud_table, OperationFilter, CLOUD_TABLES};
pub use log::{ListenerId, OperationLog};
pub use middleware::{RecordingDatabase, RecordingTable};
pub use operation::{Operation, OperationKind, QueryDetails};
