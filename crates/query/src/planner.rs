//! Index planning for predicate trees.
//!
//! A tree is answered from an index only when it holds exactly one condition
//! whose operator maps onto key ranges, whose value parses, and whose field
//! is the primary key or a single-field, non-multi-entry index. Every other
//! tree is a full scan.

use crate::ast::{Condition, Operator, QueryTree};
use crate::parse::{parse_value, ParsedValue};
use serde_json::Value;
use tablescope_core::schema::{IndexTarget, TableSchema};
use tablescope_core::KeyRange;

/// Why a tree is not answered from an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanReason {
    /// The tree has no conditions.
    NoConditions,
    /// The tree has more than one condition.
    MultipleConditions,
    /// The operator has no key-range equivalent.
    Operator,
    /// The value did not parse.
    Value,
    /// The field is not indexed.
    Unindexed,
}

/// Key ranges over one index.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedLookup {
    pub target: IndexTarget,
    /// Ranges whose union answers the condition.
    pub ranges: Vec<KeyRange>,
    /// The condition, rechecked against every fetched row.
    pub condition: Condition,
}

/// How a tree will be executed.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryPlan {
    FullScan(ScanReason),
    Indexed(IndexedLookup),
}

impl QueryPlan {
    /// Returns true for index plans.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        matches!(self, QueryPlan::Indexed(_))
    }
}

/// Plans `tree` against `schema`.
pub fn plan(tree: &QueryTree, schema: &TableSchema) -> QueryPlan {
    let condition = match tree.condition_count() {
        0 => return QueryPlan::FullScan(ScanReason::NoConditions),
        1 => match tree.single_condition() {
            Some(cond) => cond,
            None => return QueryPlan::FullScan(ScanReason::NoConditions),
        },
        _ => return QueryPlan::FullScan(ScanReason::MultipleConditions),
    };
    if !condition.operator.is_indexable() {
        return QueryPlan::FullScan(ScanReason::Operator);
    }
    let Ok(parsed) = parse_value(condition) else {
        return QueryPlan::FullScan(ScanReason::Value);
    };
    let Some(ranges) = ranges_for(condition.operator, parsed) else {
        return QueryPlan::FullScan(ScanReason::Value);
    };
    match schema.index_for_field(&condition.field) {
        Some(target) => QueryPlan::Indexed(IndexedLookup {
            target,
            ranges,
            condition: condition.clone(),
        }),
        None => QueryPlan::FullScan(ScanReason::Unindexed),
    }
}

fn ranges_for(operator: Operator, parsed: ParsedValue) -> Option<Vec<KeyRange>> {
    let range = match (operator, parsed) {
        (Operator::Equals, ParsedValue::Single(v)) => KeyRange::only(v),
        (Operator::Above, ParsedValue::Single(v)) => KeyRange::lower_bound(v, true),
        (Operator::AboveOrEqual, ParsedValue::Single(v)) => KeyRange::lower_bound(v, false),
        (Operator::Below, ParsedValue::Single(v)) => KeyRange::upper_bound(v, true),
        (Operator::BelowOrEqual, ParsedValue::Single(v)) => KeyRange::upper_bound(v, false),
        (Operator::Between, ParsedValue::Range(lower, upper)) => {
            KeyRange::bound(lower, upper, false, false)
        }
        (Operator::StartsWith, ParsedValue::Single(Value::String(prefix))) => {
            match prefix_successor(&prefix) {
                Some(upper) => {
                    KeyRange::bound(Value::String(prefix), Value::String(upper), false, true)
                }
                None => KeyRange::lower_bound(Value::String(prefix), false),
            }
        }
        (Operator::AnyOf, ParsedValue::List(items)) => {
            return Some(items.into_iter().map(KeyRange::only).collect());
        }
        _ => return None,
    };
    Some(vec![range])
}

/// Returns the smallest string greater than every string starting with
/// `prefix`, or `None` when no such string exists.
///
/// UTF-8 byte order follows scalar value order, so bumping the last char that
/// has a successor bounds every extension.
fn prefix_successor(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = next_char(last) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn next_char(c: char) -> Option<char> {
    match c as u32 {
        0xD7FF => char::from_u32(0xE000),
        n => char::from_u32(n + 1),
    }
}
