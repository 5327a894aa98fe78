//! Table and database schema descriptions.

use super::index::{IndexSpec, KeyPath, PrimaryKey};
use serde::{Deserialize, Serialize};

/// Where a field lookup can be served from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexTarget {
    /// The primary key.
    PrimaryKey,
    /// A named secondary index.
    Index(String),
}

impl IndexTarget {
    /// Returns the index name to put in a query request (`None` = primary key).
    pub fn index_name(&self) -> Option<&str> {
        match self {
            IndexTarget::PrimaryKey => None,
            IndexTarget::Index(name) => Some(name),
        }
    }
}

/// Schema of a single table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Primary key declaration.
    pub primary_key: PrimaryKey,
    /// Secondary indexes.
    pub indexes: Vec<IndexSpec>,
}

impl TableSchema {
    /// Creates a table with an outbound primary key and no indexes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: PrimaryKey::outbound(),
            indexes: Vec::new(),
        }
    }

    /// Sets the primary key.
    pub fn primary_key(mut self, key_path: KeyPath, auto_increment: bool) -> Self {
        self.primary_key = PrimaryKey::new(key_path).auto_increment(auto_increment);
        self
    }

    /// Marks the table as outbound-keyed, optionally auto-incrementing.
    pub fn outbound(mut self, auto_increment: bool) -> Self {
        self.primary_key = PrimaryKey::outbound().auto_increment(auto_increment);
        self
    }

    /// Adds a secondary index.
    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    /// Returns the primary key path.
    #[inline]
    pub fn key_path(&self) -> &KeyPath {
        &self.primary_key.key_path
    }

    /// Gets an index by name.
    pub fn get_index(&self, name: &str) -> Option<&IndexSpec> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Finds the primary key or single-field index that can serve range
    /// lookups on `field`. Multi-entry indexes are skipped since they match
    /// array elements rather than the field value.
    pub fn index_for_field(&self, field: &str) -> Option<IndexTarget> {
        if self.primary_key.key_path.as_single() == Some(field) {
            return Some(IndexTarget::PrimaryKey);
        }
        self.indexes
            .iter()
            .find(|i| !i.multi_entry && i.key_path.as_single() == Some(field))
            .map(|i| IndexTarget::Index(i.name.clone()))
    }

    /// Renders the compact schema declaration, e.g. `"++id, name, &email"`.
    ///
    /// The first slot is the primary key; it is empty (or `++`) for
    /// outbound-key tables.
    pub fn schema_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.indexes.len() + 1);
        let mut primary = String::new();
        if self.primary_key.auto_increment {
            primary.push_str("++");
        }
        primary.push_str(&self.primary_key.key_path.declaration());
        parts.push(primary);
        parts.extend(self.indexes.iter().map(IndexSpec::declaration));
        parts.join(", ")
    }
}

/// Schema of a whole database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Database name.
    pub name: String,
    /// Schema version.
    pub version: u32,
    /// Tables in declaration order.
    pub tables: Vec<TableSchema>,
}

impl DatabaseSchema {
    /// Creates an empty database schema.
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            tables: Vec::new(),
        }
    }

    /// Adds a table.
    pub fn table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    /// Gets a table by name.
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns all table names.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}
