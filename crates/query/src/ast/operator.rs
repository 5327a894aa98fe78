//! Condition operators and group logic.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Comparison operator of a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    Above,
    AboveOrEqual,
    Below,
    BelowOrEqual,
    AnyOf,
    NoneOf,
    Between,
    StartsWith,
    StartsWithIgnoreCase,
    EqualsIgnoreCase,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Every operator, in menu order.
    pub const ALL: [Operator; 14] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Above,
        Operator::AboveOrEqual,
        Operator::Below,
        Operator::BelowOrEqual,
        Operator::AnyOf,
        Operator::NoneOf,
        Operator::Between,
        Operator::StartsWith,
        Operator::StartsWithIgnoreCase,
        Operator::EqualsIgnoreCase,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    /// Returns the operator's name.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::Above => "above",
            Operator::AboveOrEqual => "aboveOrEqual",
            Operator::Below => "below",
            Operator::BelowOrEqual => "belowOrEqual",
            Operator::AnyOf => "anyOf",
            Operator::NoneOf => "noneOf",
            Operator::Between => "between",
            Operator::StartsWith => "startsWith",
            Operator::StartsWithIgnoreCase => "startsWithIgnoreCase",
            Operator::EqualsIgnoreCase => "equalsIgnoreCase",
            Operator::IsNull => "isNull",
            Operator::IsNotNull => "isNotNull",
        }
    }

    /// Looks an operator up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Returns true if the operator reads the condition's value.
    #[inline]
    pub fn takes_value(self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Returns true if the operator takes a comma-separated list.
    #[inline]
    pub fn takes_list(self) -> bool {
        matches!(self, Operator::AnyOf | Operator::NoneOf | Operator::Between)
    }

    /// Returns true if a key-range lookup can answer the operator.
    #[inline]
    pub fn is_indexable(self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::Above
                | Operator::AboveOrEqual
                | Operator::Below
                | Operator::BelowOrEqual
                | Operator::Between
                | Operator::AnyOf
                | Operator::StartsWith
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a group combines its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logic {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}
