//! Predicate tree definitions.

mod operator;
mod tree;

pub use operator::{Logic, Operator};
pub use tree::{Condition, Group, Node, NodePath, QueryTree};
