//! Tablescope Reactive - Live table views for the Tablescope inspector.
//!
//! This crate keeps a displayed row set in sync with the store and tracks
//! how rows change while they are on screen.
//!
//! # Core Concepts
//!
//! - `LiveTableView`: A cancellable live observation of one table
//! - `ChangeTracker`: Per-row change history across emissions
//! - `Highlights`: Rows changed by the latest batch, with a single deadline
//! - `SubscriptionManager`: Listeners of a live view
//! - `rollback`: Restores a row from a history entry
//! - `browse`: Search and sort helpers for the row grid
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use std::time::Instant;
//! use tablescope_core::schema::KeyPath;
//! use tablescope_core::RowKey;
//! use tablescope_reactive::{ChangeTracker, TrackerConfig};
//!
//! let mut tracker = ChangeTracker::new(TrackerConfig::default());
//! let path = KeyPath::single("id");
//! tracker.ingest(&[json!({"id": 1, "price": 10})], &path);
//! let changed = tracker.ingest(&[json!({"id": 1, "price": 12})], &path);
//!
//! let key = RowKey::Single(json!(1));
//! assert_eq!(changed, vec![key.clone()]);
//! assert_eq!(tracker.history(&key).len(), 2);
//! assert!(tracker.highlights().is_highlighted(&key, Instant::now()));
//! ```

pub mod browse;
pub mod change;
pub mod config;
pub mod highlight;
pub mod history;
mod rollback;
pub mod subscription;
pub mod view;

pub use browse::{column_names, search_rows, sort_rows, SortDirection, SortState};
pub use change::ViewChange;
pub use config::TrackerConfig;
pub use highlight::Highlights;
pub use history::{ChangeTracker, HistoryEntry};
pub use rollback::rollback;
pub use subscription::{ChangeCallback, SubscriptionId, SubscriptionManager};
pub use view::{LiveTableView, ViewStatus, WRAPPED_VALUE_FIELD};
