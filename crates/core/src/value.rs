//! Value helpers and key ordering.
//!
//! Rows are JSON documents (`serde_json::Value`). The store orders keys the way
//! embedded object stores do: numbers before strings before arrays. Null,
//! booleans and objects are not valid keys but still get a place in the total
//! order so rows can be sorted by any field.

use core::cmp::Ordering;
use serde_json::{Number, Value};

/// Field name under which outbound keys are zipped into displayed rows.
pub const OUTBOUND_KEY_FIELD: &str = "__outbound_key";

/// Returns true if the value can be stored in an index.
pub fn is_valid_key(value: &Value) -> bool {
    match value {
        Value::Number(_) | Value::String(_) => true,
        Value::Array(items) => items.iter().all(is_valid_key),
        _ => false,
    }
}

/// Compares two numbers numerically, independent of their JSON representation.
pub fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or(f64::NAN);
    let y = b.as_f64().unwrap_or(f64::NAN);
    x.total_cmp(&y)
}

/// Total ordering over JSON values used for keys and sorting.
pub fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ord = compare_keys(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => type_order(a).cmp(&type_order(b)),
    }
}

/// Returns true if both values are equal under key ordering.
#[inline]
pub fn keys_equal(a: &Value, b: &Value) -> bool {
    compare_keys(a, b) == Ordering::Equal
}

fn type_order(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Looks up a field by key path. Dotted paths walk nested objects.
pub fn lookup<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = row.get(path) {
        return Some(direct);
    }
    if !path.contains('.') {
        return None;
    }
    path.split('.').try_fold(row, |current, part| current.get(part))
}

/// Writes a field by key path, creating intermediate objects as needed.
///
/// Returns false if a non-object value sits on the path.
pub fn assign(row: &mut Value, path: &str, value: Value) -> bool {
    let mut current = row;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let Some(map) = current.as_object_mut() else {
            return false;
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return true;
        }
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
    }
    false
}

/// Converts a parsed float into a JSON number, keeping integral values as integers.
pub fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

/// Rewrites integral floats as integers, recursively.
///
/// `10.0` and `10` render as the same text afterwards.
pub fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .and_then(number_value)
            .unwrap_or(Value::Number(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Structural equality where numbers compare by value, not representation.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Ordering::Equal,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).map_or(false, |w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

/// A value wrapper ordered by [`compare_keys`].
#[derive(Clone, Debug)]
pub struct OrderedKey(pub Value);

impl PartialEq for OrderedKey {
    fn eq(&self, other: &Self) -> bool {
        keys_equal(&self.0, &other.0)
    }
}

impl Eq for OrderedKey {}

impl PartialOrd for OrderedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(&self.0, &other.0)
    }
}
