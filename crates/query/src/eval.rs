//! In-memory evaluation of predicate trees.
//!
//! Conditions are parsed once when the tree is compiled. A condition whose
//! value does not parse matches no row. Equality and ordering only hold
//! between valid keys of the same class (number with number, string with
//! string, array with array), compared under key ordering.

use crate::ast::{Condition, Group, Logic, Node, Operator, QueryTree};
use crate::parse::{parse_value, ParsedValue};
use core::cmp::Ordering;
use serde_json::Value;
use tablescope_core::value::{compare_keys, is_valid_key, lookup};

#[derive(Clone, Debug)]
struct CompiledCondition {
    field: String,
    operator: Operator,
    value: Option<ParsedValue>,
}

impl CompiledCondition {
    fn compile(cond: &Condition) -> Self {
        Self {
            field: cond.field.clone(),
            operator: cond.operator,
            value: parse_value(cond).ok(),
        }
    }

    fn matches(&self, row: &Value) -> bool {
        let field = lookup(row, &self.field).filter(|v| !v.is_null());
        match self.operator {
            Operator::IsNull => return field.is_none(),
            Operator::IsNotNull => return field.is_some(),
            _ => {}
        }
        let Some(parsed) = &self.value else {
            return false;
        };
        let row_value = field.unwrap_or(&Value::Null);
        match (self.operator, parsed) {
            (Operator::Equals, ParsedValue::Single(v)) => key_cmp(row_value, v) == Some(Ordering::Equal),
            (Operator::NotEquals, ParsedValue::Single(v)) => key_cmp(row_value, v) != Some(Ordering::Equal),
            (Operator::Above, ParsedValue::Single(v)) => key_cmp(row_value, v) == Some(Ordering::Greater),
            (Operator::AboveOrEqual, ParsedValue::Single(v)) => {
                matches!(key_cmp(row_value, v), Some(Ordering::Greater | Ordering::Equal))
            }
            (Operator::Below, ParsedValue::Single(v)) => key_cmp(row_value, v) == Some(Ordering::Less),
            (Operator::BelowOrEqual, ParsedValue::Single(v)) => {
                matches!(key_cmp(row_value, v), Some(Ordering::Less | Ordering::Equal))
            }
            (Operator::AnyOf, ParsedValue::List(items)) => {
                items.iter().any(|v| key_cmp(row_value, v) == Some(Ordering::Equal))
            }
            (Operator::NoneOf, ParsedValue::List(items)) => {
                !items.iter().any(|v| key_cmp(row_value, v) == Some(Ordering::Equal))
            }
            (Operator::Between, ParsedValue::Range(lower, upper)) => {
                matches!(key_cmp(row_value, lower), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(key_cmp(row_value, upper), Some(Ordering::Less | Ordering::Equal))
            }
            (Operator::StartsWith, ParsedValue::Single(v)) => match row_value {
                Value::String(s) => s.starts_with(&needle(v)),
                _ => false,
            },
            (Operator::StartsWithIgnoreCase, ParsedValue::Single(v)) => match row_value {
                Value::String(s) => s.to_lowercase().starts_with(&needle(v).to_lowercase()),
                _ => false,
            },
            (Operator::EqualsIgnoreCase, ParsedValue::Single(v)) => match row_value {
                Value::String(s) => s.to_lowercase() == needle(v).to_lowercase(),
                _ => false,
            },
            _ => false,
        }
    }
}

/// Compares two values if both are valid keys of the same class.
fn key_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    let same_class = matches!(
        (a, b),
        (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
    );
    (same_class && is_valid_key(a) && is_valid_key(b)).then(|| compare_keys(a, b))
}

/// Text a string operator matches against.
fn needle(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug)]
enum CompiledNode {
    Condition(CompiledCondition),
    Group(Logic, Vec<CompiledNode>),
}

impl CompiledNode {
    fn compile(node: &Node) -> Self {
        match node {
            Node::Condition(cond) => CompiledNode::Condition(CompiledCondition::compile(cond)),
            Node::Group(group) => Self::compile_group(group),
        }
    }

    fn compile_group(group: &Group) -> Self {
        CompiledNode::Group(group.logic, group.children.iter().map(Self::compile).collect())
    }

    fn matches(&self, row: &Value) -> bool {
        match self {
            CompiledNode::Condition(cond) => cond.matches(row),
            // An empty group matches every row under either logic.
            CompiledNode::Group(_, children) if children.is_empty() => true,
            CompiledNode::Group(Logic::And, children) => children.iter().all(|c| c.matches(row)),
            CompiledNode::Group(Logic::Or, children) => children.iter().any(|c| c.matches(row)),
        }
    }
}

/// A predicate tree ready for evaluation.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tablescope_query::{CompiledTree, Condition, Group, Logic, Operator, QueryTree};
///
/// let tree = QueryTree::from_root(
///     Group::new(Logic::Or)
///         .with(Condition::new("age", Operator::Below, "18"))
///         .with(Condition::new("name", Operator::EqualsIgnoreCase, "bob")),
/// );
/// let compiled = CompiledTree::compile(&tree);
/// assert!(compiled.matches(&json!({"name": "BOB", "age": 40})));
/// assert!(!compiled.matches(&json!({"name": "Al", "age": 40})));
/// ```
#[derive(Clone, Debug)]
pub struct CompiledTree {
    root: CompiledNode,
}

impl CompiledTree {
    /// Compiles a tree.
    pub fn compile(tree: &QueryTree) -> Self {
        Self {
            root: CompiledNode::compile_group(&tree.root),
        }
    }

    /// Compiles a single condition.
    pub fn condition(cond: &Condition) -> Self {
        Self {
            root: CompiledNode::Condition(CompiledCondition::compile(cond)),
        }
    }

    /// Evaluates the tree against a row.
    #[inline]
    pub fn matches(&self, row: &Value) -> bool {
        self.root.matches(row)
    }

    /// Keeps the rows that match, in order.
    pub fn filter(&self, rows: Vec<Value>) -> Vec<Value> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Evaluates `tree` against `row` without keeping the compiled form.
pub fn evaluate(tree: &QueryTree, row: &Value) -> bool {
    CompiledTree::compile(tree).matches(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(op: Operator, raw: &str, row: Value) -> bool {
        CompiledTree::condition(&Condition::new("f", op, raw)).matches(&row)
    }

    #[test]
    fn test_equality_is_type_strict() {
        assert!(check(Operator::Equals, "10", json!({"f": 10})));
        assert!(check(Operator::Equals, "10", json!({"f": 10.0})));
        assert!(!check(Operator::Equals, "10", json!({"f": "10"})));
        assert!(check(Operator::Equals, "\"10\"", json!({"f": "10"})));
        assert!(!check(Operator::Equals, "true", json!({"f": true})));
        assert!(check(Operator::NotEquals, "10", json!({"f": "10"})));
        assert!(check(Operator::NotEquals, "10", json!({})));
    }

    #[test]
    fn test_ordering_operators() {
        let row = json!({"f": 15});
        assert!(check(Operator::Above, "10", row.clone()));
        assert!(!check(Operator::Above, "15", row.clone()));
        assert!(check(Operator::AboveOrEqual, "15", row.clone()));
        assert!(check(Operator::Below, "20", row.clone()));
        assert!(check(Operator::BelowOrEqual, "15", row.clone()));
        assert!(!check(Operator::Below, "\"z\"", row));
        assert!(check(Operator::Above, "\"a\"", json!({"f": "b"})));
        assert!(!check(Operator::Above, "1", json!({"f": null})));
    }

    #[test]
    fn test_list_operators() {
        assert!(check(Operator::AnyOf, "1, 2, \"x\"", json!({"f": "x"})));
        assert!(!check(Operator::AnyOf, "1,2", json!({"f": 3})));
        assert!(check(Operator::NoneOf, "1,2", json!({"f": 3})));
        assert!(!check(Operator::NoneOf, "1,2", json!({"f": 2})));
        assert!(check(Operator::Between, "10,20", json!({"f": 10})));
        assert!(check(Operator::Between, "10,20", json!({"f": 20})));
        assert!(!check(Operator::Between, "10,20", json!({"f": 21})));
        assert!(!check(Operator::Between, "10", json!({"f": 10})));
    }

    #[test]
    fn test_string_operators() {
        assert!(check(Operator::StartsWith, "Al", json!({"f": "Alice"})));
        assert!(!check(Operator::StartsWith, "al", json!({"f": "Alice"})));
        assert!(check(Operator::StartsWithIgnoreCase, "al", json!({"f": "Alice"})));
        assert!(check(Operator::EqualsIgnoreCase, "ALICE", json!({"f": "alice"})));
        assert!(check(Operator::StartsWith, "4", json!({"f": "42"})));
        assert!(!check(Operator::StartsWith, "4", json!({"f": 42})));
    }

    #[test]
    fn test_null_checks() {
        assert!(check(Operator::IsNull, "", json!({})));
        assert!(check(Operator::IsNull, "", json!({"f": null})));
        assert!(!check(Operator::IsNull, "", json!({"f": 0})));
        assert!(check(Operator::IsNotNull, "", json!({"f": false})));
    }

    #[test]
    fn test_dotted_fields() {
        let cond = Condition::new("address.city", Operator::Equals, "\"Oslo\"");
        assert!(CompiledTree::condition(&cond).matches(&json!({"address": {"city": "Oslo"}})));
    }

    #[test]
    fn test_groups() {
        let row = json!({"a": 1, "b": 2});
        let and = QueryTree::from_root(
            Group::new(Logic::And)
                .with(Condition::new("a", Operator::Equals, "1"))
                .with(Condition::new("b", Operator::Equals, "3")),
        );
        assert!(!evaluate(&and, &row));

        let or = QueryTree::from_root(
            Group::new(Logic::Or)
                .with(Condition::new("a", Operator::Equals, "1"))
                .with(Condition::new("b", Operator::Equals, "3")),
        );
        assert!(evaluate(&or, &row));

        assert!(evaluate(&QueryTree::new(Logic::And), &row));
        assert!(evaluate(&QueryTree::new(Logic::Or), &row));
        let nested_empty = QueryTree::from_root(
            Group::new(Logic::And)
                .with(Group::new(Logic::Or))
                .with(Condition::new("a", Operator::Equals, "1")),
        );
        assert!(evaluate(&nested_empty, &row));
    }
}
