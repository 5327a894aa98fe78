//! Key ranges for index and primary-key queries.

use crate::value::compare_keys;
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A range of keys, ordered by [`compare_keys`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum KeyRange {
    /// All keys
    #[default]
    All,
    /// A single key (equality)
    Only { value: Value },
    /// Keys >= lower bound
    LowerBound { value: Value, exclusive: bool },
    /// Keys <= upper bound
    UpperBound { value: Value, exclusive: bool },
    /// Keys between lower and upper bounds
    Bound {
        lower: Value,
        upper: Value,
        lower_exclusive: bool,
        upper_exclusive: bool,
    },
}

impl KeyRange {
    /// Creates a range for all keys.
    pub fn all() -> Self {
        KeyRange::All
    }

    /// Creates a range for a single key.
    pub fn only(value: Value) -> Self {
        KeyRange::Only { value }
    }

    /// Creates a range with a lower bound.
    pub fn lower_bound(value: Value, exclusive: bool) -> Self {
        KeyRange::LowerBound { value, exclusive }
    }

    /// Creates a range with an upper bound.
    pub fn upper_bound(value: Value, exclusive: bool) -> Self {
        KeyRange::UpperBound { value, exclusive }
    }

    /// Creates a range with both bounds.
    pub fn bound(lower: Value, upper: Value, lower_exclusive: bool, upper_exclusive: bool) -> Self {
        KeyRange::Bound {
            lower,
            upper,
            lower_exclusive,
            upper_exclusive,
        }
    }

    /// Returns true if this range represents a single value (equality).
    pub fn is_only(&self) -> bool {
        matches!(self, KeyRange::Only { .. })
    }

    /// Returns true if this range represents all values (unbounded).
    pub fn is_all(&self) -> bool {
        matches!(self, KeyRange::All)
    }

    /// Returns true if no key can fall into this range.
    pub fn is_empty_range(&self) -> bool {
        match self {
            KeyRange::Bound {
                lower,
                upper,
                lower_exclusive,
                upper_exclusive,
            } => match compare_keys(lower, upper) {
                Ordering::Greater => true,
                Ordering::Equal => *lower_exclusive || *upper_exclusive,
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// Checks if a key is within this range.
    pub fn contains(&self, key: &Value) -> bool {
        match self {
            KeyRange::All => true,
            KeyRange::Only { value } => compare_keys(key, value) == Ordering::Equal,
            KeyRange::LowerBound { value, exclusive } => above(key, value, *exclusive),
            KeyRange::UpperBound { value, exclusive } => below(key, value, *exclusive),
            KeyRange::Bound {
                lower,
                upper,
                lower_exclusive,
                upper_exclusive,
            } => above(key, lower, *lower_exclusive) && below(key, upper, *upper_exclusive),
        }
    }
}

fn above(key: &Value, bound: &Value, exclusive: bool) -> bool {
    match compare_keys(key, bound) {
        Ordering::Greater => true,
        Ordering::Equal => !exclusive,
        Ordering::Less => false,
    }
}

fn below(key: &Value, bound: &Value, exclusive: bool) -> bool {
    match compare_keys(key, bound) {
        Ordering::Less => true,
        Ordering::Equal => !exclusive,
        Ordering::Greater => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contains() {
        assert!(KeyRange::all().contains(&json!("x")));
        assert!(KeyRange::only(json!(5)).contains(&json!(5.0)));
        assert!(!KeyRange::only(json!(5)).contains(&json!("5")));

        let lower = KeyRange::lower_bound(json!(10), true);
        assert!(!lower.contains(&json!(10)));
        assert!(lower.contains(&json!(11)));

        let upper = KeyRange::upper_bound(json!(10), false);
        assert!(upper.contains(&json!(10)));
        assert!(!upper.contains(&json!(10.5)));
    }

    #[test]
    fn test_bound_inclusive() {
        let range = KeyRange::bound(json!(10), json!(20), false, false);
        assert!(range.contains(&json!(10)));
        assert!(range.contains(&json!(20)));
        assert!(!range.contains(&json!(21)));
        assert!(!range.contains(&json!("15")));
        assert!(!range.is_empty_range());
        assert!(KeyRange::bound(json!(20), json!(10), false, false).is_empty_range());
        assert!(KeyRange::bound(json!(5), json!(5), true, false).is_empty_range());
    }

    #[test]
    fn test_prefix_bound() {
        let range = KeyRange::bound(json!("ab"), json!("ab\u{10FFFF}"), false, false);
        assert!(range.contains(&json!("ab")));
        assert!(range.contains(&json!("abc")));
        assert!(!range.contains(&json!("ac")));
    }

    #[test]
    fn test_serde() {
        let range = KeyRange::lower_bound(json!(1), false);
        let text = serde_json::to_string(&range).unwrap();
        assert_eq!(text, r#"{"type":"lowerBound","value":1,"exclusive":false}"#);
        let back: KeyRange = serde_json::from_str(&text).unwrap();
        assert_eq!(back, range);
    }
}
