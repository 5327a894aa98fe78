//! Parsing of typed condition values.
//!
//! A token wrapped in double quotes is a string literal. Otherwise a token
//! that reads as a finite number is a number (integral values stay
//! integers), and anything else is taken literally as a string.

use crate::ast::{Condition, Operator};
use serde_json::Value;
use tablescope_core::value::number_value;
use tablescope_core::{Error, Result};

/// A parsed condition value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedValue {
    /// Null checks take no value.
    None,
    Single(Value),
    /// `anyOf` / `noneOf` candidates.
    List(Vec<Value>),
    /// Inclusive `between` bounds.
    Range(Value, Value),
}

/// Parses one token.
pub fn parse_token(token: &str) -> Value {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return Value::String(token[1..token.len() - 1].to_string());
    }
    let trimmed = token.trim();
    if !trimmed.is_empty() {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                if let Some(value) = number_value(n) {
                    return value;
                }
            }
        }
    }
    Value::String(token.to_string())
}

/// Parses the value of `condition` according to its operator.
pub fn parse_value(condition: &Condition) -> Result<ParsedValue> {
    let raw = condition.raw_value.as_str();
    match condition.operator {
        Operator::IsNull | Operator::IsNotNull => Ok(ParsedValue::None),
        Operator::AnyOf | Operator::NoneOf => Ok(ParsedValue::List(
            raw.split(',').map(|t| parse_token(t.trim())).collect(),
        )),
        Operator::Between => {
            let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
            match parts.as_slice() {
                [lower, upper] => Ok(ParsedValue::Range(parse_token(lower), parse_token(upper))),
                _ => Err(Error::invalid_query(format!(
                    "between on {} needs two values, e.g. 10,20",
                    condition.field
                ))),
            }
        }
        _ => Ok(ParsedValue::Single(parse_token(raw))),
    }
}
