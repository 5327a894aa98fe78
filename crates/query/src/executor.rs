//! Query execution against a table.

use crate::ast::QueryTree;
use crate::eval::CompiledTree;
use crate::planner::{plan, IndexedLookup, QueryPlan};
use serde_json::Value;
use std::collections::BTreeMap;
use tablescope_core::value::OrderedKey;
use tablescope_core::{Error, Result, Table};
use tracing::debug;

/// How a query was answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Key-range lookups on an index.
    Indexed,
    /// All rows read and filtered in memory.
    FullScan,
}

/// Rows produced by a query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryOutcome {
    /// Matching rows in primary-key order.
    pub rows: Vec<Value>,
    pub strategy: Strategy,
}

/// Runs predicate trees against one table.
///
/// Index lookups return the same rows in the same order as the full scan;
/// when a lookup fails the executor quietly scans instead.
#[derive(Clone)]
pub struct QueryExecutor {
    table: Table,
}

impl QueryExecutor {
    /// Creates an executor for `table`.
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Returns the table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Runs `tree` and returns the matching rows.
    pub async fn run(&self, tree: &QueryTree) -> Result<QueryOutcome> {
        match plan(tree, self.table.schema()) {
            QueryPlan::Indexed(lookup) => match self.run_indexed(&lookup).await {
                Ok(rows) => {
                    return Ok(QueryOutcome {
                        rows,
                        strategy: Strategy::Indexed,
                    })
                }
                Err(err) => debug!(
                    table = %self.table.name(),
                    field = %lookup.condition.field,
                    error = %err,
                    "index lookup failed, scanning"
                ),
            },
            QueryPlan::FullScan(reason) => debug!(
                table = %self.table.name(),
                reason = ?reason,
                "full scan"
            ),
        }
        let rows = self.table.to_array().await?;
        Ok(QueryOutcome {
            rows: CompiledTree::compile(tree).filter(rows),
            strategy: Strategy::FullScan,
        })
    }

    async fn run_indexed(&self, lookup: &IndexedLookup) -> Result<Vec<Value>> {
        let index = lookup.target.index_name();
        let mut found: BTreeMap<OrderedKey, Value> = BTreeMap::new();
        for range in &lookup.ranges {
            let resp = self.table.query_index(index, range.clone()).await?;
            let values = resp
                .values
                .ok_or_else(|| Error::invalid_query("index lookup returned no rows"))?;
            for (key, row) in resp.keys.into_iter().zip(values) {
                found.entry(OrderedKey(key)).or_insert(row);
            }
        }
        let check = CompiledTree::condition(&lookup.condition);
        Ok(found.into_values().filter(|row| check.matches(row)).collect())
    }
}

/// Runs `tree` against `table` once.
pub async fn run_query(table: &Table, tree: &QueryTree) -> Result<QueryOutcome> {
    QueryExecutor::new(table.clone()).run(tree).await
}
