//! The predicate tree.
//!
//! A tree is a root group of conditions and nested groups. Nodes are
//! addressed by [`NodePath`], the child indices walked from the root. The
//! root is always a group: it can be replaced by another group but never
//! removed.

use super::operator::{Logic, Operator};
use serde::{Deserialize, Serialize};
use tablescope_core::{Error, Result};

/// A single field comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    /// The value as typed, parsed when the tree is evaluated.
    #[serde(rename = "value", default)]
    pub raw_value: String,
}

impl Condition {
    /// Creates a condition.
    pub fn new(field: impl Into<String>, operator: Operator, raw_value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            raw_value: raw_value.into(),
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::new("", Operator::Equals, "")
    }
}

/// A group of nodes combined with AND or OR.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub logic: Logic,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Group {
    /// Creates an empty group.
    pub fn new(logic: Logic) -> Self {
        Self {
            logic,
            children: Vec::new(),
        }
    }

    /// Appends a child.
    pub fn with(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// A node of the predicate tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Condition(Condition),
    Group(Group),
}

impl Node {
    /// Counts the conditions in this subtree.
    pub fn condition_count(&self) -> usize {
        match self {
            Node::Condition(_) => 1,
            Node::Group(group) => group.children.iter().map(Node::condition_count).sum(),
        }
    }

    /// Returns the first condition in this subtree, depth first.
    pub fn first_condition(&self) -> Option<&Condition> {
        match self {
            Node::Condition(cond) => Some(cond),
            Node::Group(group) => group.children.iter().find_map(Node::first_condition),
        }
    }
}

impl From<Condition> for Node {
    fn from(cond: Condition) -> Self {
        Node::Condition(cond)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

/// Address of a node: child indices from the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root group.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path of this node's `index`-th child.
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// Returns true for the root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the parent path and the index within it.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), *last))
    }

    /// Returns the child indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

/// A predicate tree.
///
/// # Example
///
/// ```rust
/// use tablescope_query::{Condition, Logic, NodePath, Operator, QueryTree};
///
/// let mut tree = QueryTree::new(Logic::And);
/// tree.add_condition(&NodePath::root(), Condition::new("age", Operator::Above, "18"))
///     .unwrap();
/// let group = tree.add_group(&NodePath::root(), Logic::Or).unwrap();
/// tree.add_condition(&group, Condition::new("name", Operator::StartsWith, "\"A\""))
///     .unwrap();
/// assert_eq!(tree.condition_count(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTree {
    pub root: Group,
}

impl QueryTree {
    /// Creates a tree with an empty root group.
    pub fn new(logic: Logic) -> Self {
        Self {
            root: Group::new(logic),
        }
    }

    /// Creates a tree from a root group.
    pub fn from_root(root: Group) -> Self {
        Self { root }
    }

    /// Counts all conditions.
    pub fn condition_count(&self) -> usize {
        self.root.children.iter().map(Node::condition_count).sum()
    }

    /// Returns the only condition, if the tree has exactly one.
    pub fn single_condition(&self) -> Option<&Condition> {
        if self.condition_count() != 1 {
            return None;
        }
        self.root.children.iter().find_map(Node::first_condition)
    }

    /// Returns true if the tree has no conditions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.condition_count() == 0
    }

    /// Returns the node at `path`. The root is returned as a group node.
    pub fn get(&self, path: &NodePath) -> Option<Node> {
        if path.is_root() {
            return Some(Node::Group(self.root.clone()));
        }
        let (parent, index) = path.split_last()?;
        self.group(&parent)?.children.get(index).cloned()
    }

    /// Appends a condition to the group at `parent` and returns its path.
    pub fn add_condition(&mut self, parent: &NodePath, condition: Condition) -> Result<NodePath> {
        self.push_child(parent, Node::Condition(condition))
    }

    /// Appends an empty group to the group at `parent` and returns its path.
    pub fn add_group(&mut self, parent: &NodePath, logic: Logic) -> Result<NodePath> {
        self.push_child(parent, Node::Group(Group::new(logic)))
    }

    /// Replaces the node at `path`. The root can only be replaced by a group.
    pub fn replace(&mut self, path: &NodePath, node: Node) -> Result<()> {
        if path.is_root() {
            return match node {
                Node::Group(group) => {
                    self.root = group;
                    Ok(())
                }
                Node::Condition(_) => Err(Error::invalid_query("the root must be a group")),
            };
        }
        *self.node_mut(path)? = node;
        Ok(())
    }

    /// Changes the logic of the group at `path`.
    pub fn set_logic(&mut self, path: &NodePath, logic: Logic) -> Result<()> {
        self.group_mut(path)?.logic = logic;
        Ok(())
    }

    /// Removes the node at `path` and returns it. The root cannot be removed.
    pub fn remove(&mut self, path: &NodePath) -> Result<Node> {
        let (parent, index) = path
            .split_last()
            .ok_or_else(|| Error::invalid_query("the root group cannot be removed"))?;
        let group = self.group_mut(&parent)?;
        if index >= group.children.len() {
            return Err(missing(path));
        }
        Ok(group.children.remove(index))
    }

    fn push_child(&mut self, parent: &NodePath, node: Node) -> Result<NodePath> {
        let group = self.group_mut(parent)?;
        group.children.push(node);
        Ok(parent.child(group.children.len() - 1))
    }

    fn group(&self, path: &NodePath) -> Option<&Group> {
        let mut current = &self.root;
        for &index in path.indices() {
            match current.children.get(index)? {
                Node::Group(group) => current = group,
                Node::Condition(_) => return None,
            }
        }
        Some(current)
    }

    fn group_mut(&mut self, path: &NodePath) -> Result<&mut Group> {
        if path.is_root() {
            return Ok(&mut self.root);
        }
        match self.node_mut(path)? {
            Node::Group(group) => Ok(group),
            Node::Condition(_) => Err(Error::invalid_query("node is not a group")),
        }
    }

    fn node_mut(&mut self, path: &NodePath) -> Result<&mut Node> {
        let (first, rest) = path.indices().split_first().ok_or_else(|| missing(path))?;
        let mut node = self.root.children.get_mut(*first).ok_or_else(|| missing(path))?;
        for &index in rest {
            node = match node {
                Node::Group(group) => group.children.get_mut(index).ok_or_else(|| missing(path))?,
                Node::Condition(_) => return Err(missing(path)),
            };
        }
        Ok(node)
    }
}

fn missing(path: &NodePath) -> Error {
    Error::invalid_query(format!("no node at {:?}", path.indices()))
}
