//! Row search and sorting for the table grid.

use serde_json::Value;
use std::cmp::Ordering;
use tablescope_core::value::{compare_keys, lookup};

/// Keeps the rows where some non-null field contains `needle`, ignoring case.
///
/// Fields are matched by their JSON text, so `"al"` matches `"Alice"` and
/// `"4"` matches `42`. An empty needle keeps every row.
pub fn search_rows(rows: &[Value], needle: &str) -> Vec<Value> {
    if needle.is_empty() {
        return rows.to_vec();
    }
    let needle = needle.to_lowercase();
    rows.iter()
        .filter(|row| row_matches(row, &needle))
        .cloned()
        .collect()
}

fn row_matches(row: &Value, needle: &str) -> bool {
    match row {
        Value::Object(map) => map
            .values()
            .filter(|v| !v.is_null())
            .any(|v| field_text(v).to_lowercase().contains(needle)),
        Value::Null => false,
        other => field_text(other).to_lowercase().contains(needle),
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Sort direction of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The grid's sort column and direction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortState {
    column: Option<String>,
    direction: Option<SortDirection>,
}

impl SortState {
    /// Returns an unsorted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active column and direction.
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match (&self.column, self.direction) {
            (Some(column), Some(direction)) => Some((column.as_str(), direction)),
            _ => None,
        }
    }

    /// Advances the sort for a clicked column.
    ///
    /// The same column cycles ascending, descending, unsorted. Another column
    /// starts ascending.
    pub fn toggle(&mut self, column: &str) {
        let same = self.column.as_deref() == Some(column);
        self.direction = match (same, self.direction) {
            (true, Some(SortDirection::Ascending)) => Some(SortDirection::Descending),
            (true, Some(SortDirection::Descending)) => None,
            _ => Some(SortDirection::Ascending),
        };
        self.column = self.direction.map(|_| column.to_string());
    }

    /// Returns `rows` in this state's order. Sorting is stable.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        match self.active() {
            Some((column, direction)) => sort_rows(rows, column, direction),
            None => rows.to_vec(),
        }
    }
}

/// Sorts rows by a field using key ordering. Missing fields sort as null.
pub fn sort_rows(rows: &[Value], column: &str, direction: SortDirection) -> Vec<Value> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ord = compare_field(a, b, column);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    sorted
}

fn compare_field(a: &Value, b: &Value, column: &str) -> Ordering {
    let a = lookup(a, column).unwrap_or(&Value::Null);
    let b = lookup(b, column).unwrap_or(&Value::Null);
    compare_keys(a, b)
}

/// Returns the union of the rows' field names in first-seen order.
pub fn column_names(rows: &[Value]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for name in map.keys() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
        }
    }
    names
}
