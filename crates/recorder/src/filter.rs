//! Operation log filters.
//!
//! Databases synced by a cloud add system tables of their own. With `cloud`
//! enabled, operations on those tables are shown only when `show_cloud` is set
//! and operations on user tables only when `show_user` is set.

use crate::operation::{Operation, OperationKind};
use hashbrown::HashSet;

/// System tables a cloud-synced database adds beside user tables.
pub const CLOUD_TABLES: &[&str] = &[
    "members",
    "roles",
    "realms",
    "$jobs",
    "$syncState",
    "$baseRevs",
    "$logins",
];

/// Returns true if `name` is a cloud system table.
pub fn is_cloud_table(name: &str) -> bool {
    CLOUD_TABLES.contains(&name) || (name.starts_with('$') && name.ends_with("_mutations"))
}

/// Selects operations from the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationFilter {
    /// Kinds to keep; `None` keeps all.
    pub kinds: Option<HashSet<OperationKind>>,
    /// Tables to keep; `None` keeps all.
    pub tables: Option<HashSet<String>>,
    pub show_user: bool,
    pub show_cloud: bool,
    /// Whether the database is cloud-synced.
    pub cloud: bool,
}

impl Default for OperationFilter {
    fn default() -> Self {
        Self {
            kinds: None,
            tables: None,
            show_user: true,
            show_cloud: false,
            cloud: false,
        }
    }
}

impl OperationFilter {
    /// Creates a filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the given kinds.
    pub fn kinds<I: IntoIterator<Item = OperationKind>>(mut self, kinds: I) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Keeps only the given tables.
    pub fn tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Enables cloud classification.
    pub fn cloud(mut self, cloud: bool) -> Self {
        self.cloud = cloud;
        self
    }

    /// Sets which table classes are shown.
    pub fn show(mut self, user: bool, cloud: bool) -> Self {
        self.show_user = user;
        self.show_cloud = cloud;
        self
    }

    /// Returns true if the operation passes the filter.
    pub fn matches(&self, op: &Operation) -> bool {
        if self.cloud {
            let visible = if is_cloud_table(&op.table) {
                self.show_cloud
            } else {
                self.show_user
            };
            if !visible {
                return false;
            }
        }
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&op.kind) {
                return false;
            }
        }
        match &self.tables {
            Some(tables) => tables.contains(&op.table),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(kind: OperationKind, table: &str) -> Operation {
        Operation::new(kind, table)
    }

    #[test]
    fn test_is_cloud_table() {
        assert!(is_cloud_table("members"));
        assert!(is_cloud_table("$syncState"));
        assert!(is_cloud_table("$todos_mutations"));
        assert!(!is_cloud_table("todos"));
        assert!(!is_cloud_table("$todos"));
        assert!(!is_cloud_table("todo_mutations"));
    }

    #[test]
    fn test_default_keeps_everything() {
        let filter = OperationFilter::new();
        assert!(filter.matches(&op(OperationKind::Read, "members")));
        assert!(filter.matches(&op(OperationKind::Unknown, "todos")));
    }

    #[test]
    fn test_cloud_visibility() {
        let filter = OperationFilter::new().cloud(true);
        assert!(filter.matches(&op(OperationKind::Read, "todos")));
        assert!(!filter.matches(&op(OperationKind::Read, "$jobs")));

        let filter = filter.show(false, true);
        assert!(!filter.matches(&op(OperationKind::Read, "todos")));
        assert!(filter.matches(&op(OperationKind::Read, "$jobs")));
    }

    #[test]
    fn test_kind_and_table_filters() {
        let filter = OperationFilter::new()
            .kinds([OperationKind::Create, OperationKind::Delete])
            .tables(["todos"]);
        assert!(filter.matches(&op(OperationKind::Create, "todos")));
        assert!(!filter.matches(&op(OperationKind::Read, "todos")));
        assert!(!filter.matches(&op(OperationKind::Delete, "lists")));
    }
}
