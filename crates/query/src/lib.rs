//! Tablescope Query - Predicate-tree queries for the Tablescope inspector.
//!
//! This crate provides the query builder's engine:
//!
//! - `ast`: The AND/OR predicate tree, its operators and path-based editing
//! - `parse`: Parsing of typed condition values
//! - `eval`: In-memory evaluation of compiled trees
//! - `planner`: The single-condition index fast path
//! - `executor`: Running a tree against a table, index first, scan as fallback

pub mod ast;
pub mod eval;
pub mod executor;
pub mod parse;
pub mod planner;

pub use ast::{Condition, Group, Logic, Node, NodePath, Operator, QueryTree};
pub use eval::{evaluate, CompiledTree};
pub use executor::{run_query, QueryExecutor, QueryOutcome, Strategy};
pub use parse::{parse_token, parse_value, ParsedValue};
pub use planner::{plan, IndexedLookup, QueryPlan, ScanReason};
