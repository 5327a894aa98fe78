//! The inspector context.

use crate::batch::run_batch;
use crate::browser::TableBrowser;
use crate::config::InspectorConfig;
use crate::info::DatabaseInfo;
use serde_json::Value;
use std::rc::Rc;
use tablescope_core::store::DatabaseCore;
use tablescope_core::{get_row_key, Error, Result, Table};
use tablescope_query::{QueryExecutor, QueryOutcome, QueryTree};
use tablescope_recorder::{Operation, OperationFilter, OperationLog, RecordingDatabase};
use tracing::debug;

/// An inspector attached to one database.
///
/// Every table reached through the inspector records into its operation
/// log. The configuration is fixed at attach time.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use std::rc::Rc;
/// use tablescope_core::schema::{DatabaseSchema, KeyPath, TableSchema};
/// use tablescope_inspector::{Inspector, InspectorConfig};
/// use tablescope_storage::MemoryDatabase;
///
/// let schema = DatabaseSchema::new("shop", 1)
///     .table(TableSchema::new("products").primary_key(KeyPath::single("id"), true));
/// let inspector = Inspector::attach(
///     Rc::new(MemoryDatabase::new(schema)),
///     InspectorConfig::default(),
/// );
/// assert_eq!(inspector.database_info().tables[0].schema_string, "++id");
/// assert!(inspector.operations().is_empty());
/// ```
pub struct Inspector {
    db: Rc<RecordingDatabase>,
    config: InspectorConfig,
}

impl Inspector {
    /// Attaches to `db`, recording into a fresh operation log.
    pub fn attach(db: Rc<dyn DatabaseCore>, config: InspectorConfig) -> Self {
        Self::attach_with_log(db, config, OperationLog::new())
    }

    /// Attaches to `db`, recording into `log`.
    pub fn attach_with_log(db: Rc<dyn DatabaseCore>, config: InspectorConfig, log: OperationLog) -> Self {
        debug!(database = %db.name(), cloud = config.cloud, "inspector attached");
        Self {
            db: Rc::new(RecordingDatabase::new(db, log)),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Returns the recording database.
    pub fn database(&self) -> Rc<dyn DatabaseCore> {
        self.db.clone()
    }

    /// Returns the operation log.
    pub fn log(&self) -> &OperationLog {
        self.db.log()
    }

    /// Returns every logged operation, oldest first.
    pub fn operations(&self) -> Vec<Operation> {
        self.log().snapshot()
    }

    /// Clears the operation log.
    pub fn clear_operations(&self) {
        self.log().clear();
    }

    /// Returns the logged operations passing `filter`.
    ///
    /// Cloud classification follows the inspector's configuration.
    pub fn filtered_operations(&self, filter: OperationFilter) -> Vec<Operation> {
        self.log().filtered(&filter.cloud(self.config.cloud))
    }

    /// Opens a recording table handle.
    pub fn table(&self, name: &str) -> Result<Table> {
        Table::open(self.database(), name)
    }

    /// Creates a table browser.
    pub fn browser(&self) -> TableBrowser {
        TableBrowser::new(
            self.database(),
            self.config.tracker_config(),
            self.config.concurrency(),
        )
    }

    /// Runs a predicate tree against a table.
    pub async fn run_query(&self, table: &str, tree: &QueryTree) -> Result<QueryOutcome> {
        QueryExecutor::new(self.table(table)?).run(tree).await
    }

    /// Applies `changes` to every row in `rows`, addressing each by its
    /// primary key.
    ///
    /// Updates run concurrently; failures are reported as one
    /// [`Error::Batch`] and applied updates stay applied. Rows that no
    /// longer exist are skipped.
    pub async fn mass_update(&self, table: &str, rows: &[Value], changes: Value) -> Result<usize> {
        if !changes.is_object() {
            return Err(Error::invalid_operation("mass update changes must be an object"));
        }
        let table = self.table(table)?;
        let key_path = table.key_path().clone();
        debug!(table = %table.name(), rows = rows.len(), "mass update");
        run_batch("mass update", rows.iter().collect(), self.config.concurrency(), |row| {
            let key = get_row_key(row, &key_path);
            let table = &table;
            let changes = changes.clone();
            async move {
                if !key.is_addressable() {
                    return Err(Error::invalid_key(format!(
                        "row of table {} has no usable primary key",
                        table.name()
                    )));
                }
                table.update(key.to_queryable_key(), changes).await.map(|_| ())
            }
        })
        .await
    }

    /// Summarizes the database schema.
    pub fn database_info(&self) -> DatabaseInfo {
        DatabaseInfo::from_schema(self.db.schema())
    }
}
