//! Database and schema introspection.

use serde::Serialize;
use tablescope_core::schema::{DatabaseSchema, IndexSpec, PrimaryKey, TableSchema};
use tablescope_recorder::is_cloud_table;

/// Schema summary of one table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub name: String,
    pub primary_key: PrimaryKey,
    pub indexes: Vec<IndexSpec>,
    /// Compact declaration, e.g. `"++id, name, &email"`.
    pub schema_string: String,
    /// Whether this is a cloud system table.
    pub cloud: bool,
}

impl TableInfo {
    /// Summarizes a table schema.
    pub fn from_schema(schema: &TableSchema) -> Self {
        Self {
            name: schema.name.clone(),
            primary_key: schema.primary_key.clone(),
            indexes: schema.indexes.clone(),
            schema_string: schema.schema_string(),
            cloud: is_cloud_table(&schema.name),
        }
    }
}

/// Summary of an attached database.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub name: String,
    pub version: u32,
    pub table_count: usize,
    pub tables: Vec<TableInfo>,
}

impl DatabaseInfo {
    /// Summarizes a database schema.
    pub fn from_schema(schema: &DatabaseSchema) -> Self {
        Self {
            name: schema.name.clone(),
            version: schema.version,
            table_count: schema.tables.len(),
            tables: schema.tables.iter().map(TableInfo::from_schema).collect(),
        }
    }

    /// Returns the info of a table by name.
    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns the tables that are not cloud system tables.
    pub fn user_tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.iter().filter(|t| !t.cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tablescope_core::schema::KeyPath;

    #[test]
    fn test_database_info() {
        let schema = DatabaseSchema::new("app", 3)
            .table(
                TableSchema::new("todos")
                    .primary_key(KeyPath::single("id"), true)
                    .index(IndexSpec::new("email").unique(true)),
            )
            .table(TableSchema::new("$jobs").primary_key(KeyPath::single("name"), false));
        let info = DatabaseInfo::from_schema(&schema);
        assert_eq!(info.table_count, 2);
        assert_eq!(info.table("todos").map(|t| t.schema_string.as_str()), Some("++id, &email"));
        assert!(info.table("$jobs").map_or(false, |t| t.cloud));
        assert_eq!(info.user_tables().count(), 1);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["tableCount"], json!(2));
        assert_eq!(json["tables"][0]["schemaString"], json!("++id, &email"));
    }
}
