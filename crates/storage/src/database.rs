//! In-memory database implementing the store interface.
//!
//! `MemoryDatabase` keeps one [`RowStore`] per table. Every successful
//! mutation commits immediately and pushes a fresh snapshot to the table's
//! live observers before the mutate call returns.

use crate::live::LiveRegistry;
use crate::row_store::RowStore;
use async_trait::async_trait;
use hashbrown::HashMap;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tablescope_core::schema::{DatabaseSchema, TableSchema};
use tablescope_core::store::{
    CountRequest, DatabaseCore, GetManyRequest, GetRequest, MutateRequest, MutateResponse,
    Mutation, QueryRequest, QueryResponse, TableCore, Transaction, TransactionId, TransactionMode,
};
use tablescope_core::{Error, LiveHandle, LiveObserver, Result};
use tracing::debug;

/// A table of a [`MemoryDatabase`].
pub struct MemoryTable {
    schema: TableSchema,
    store: RefCell<RowStore>,
    live: Rc<LiveRegistry>,
}

impl MemoryTable {
    fn new(schema: TableSchema) -> Self {
        Self {
            store: RefCell::new(RowStore::new(schema.clone())),
            schema,
            live: LiveRegistry::new(),
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of live observers.
    pub fn observer_count(&self) -> usize {
        self.live.len()
    }

    fn apply(&self, mutation: Mutation) -> Result<MutateResponse> {
        let mut store = self.store.try_borrow_mut().map_err(|_| {
            Error::invalid_operation(format!("table {} is busy", self.schema.name))
        })?;
        let results = match mutation {
            Mutation::Add { values, keys } => {
                let keys = split_keys(keys, values.len())?;
                write_all(&mut store, values, keys, RowStore::insert)?
            }
            Mutation::Put { values, keys, .. } => {
                let keys = split_keys(keys, values.len())?;
                write_all(&mut store, values, keys, RowStore::upsert)?
            }
            Mutation::Delete { keys } => {
                for key in &keys {
                    store.delete(key);
                }
                keys
            }
            Mutation::DeleteRange { range } => store.delete_range(&range),
        };
        Ok(MutateResponse {
            results,
            failures: 0,
        })
    }

    fn commit(&self) {
        let snapshot = self.store.borrow().snapshot();
        debug!(
            table = %self.schema.name,
            rows = snapshot.len(),
            observers = self.live.len(),
            "committed"
        );
        self.live.notify(&snapshot);
    }
}

/// Writes every row or none of them.
fn write_all<F>(
    store: &mut RowStore,
    values: Vec<Value>,
    keys: Vec<Option<Value>>,
    mut write: F,
) -> Result<Vec<Value>>
where
    F: FnMut(&mut RowStore, Value, Option<Value>) -> Result<Value>,
{
    let saved = (values.len() > 1).then(|| store.clone());
    let mut results = Vec::with_capacity(values.len());
    for (row, key) in values.into_iter().zip(keys) {
        match write(store, row, key) {
            Ok(pk) => results.push(pk),
            Err(err) => {
                if let Some(saved) = saved {
                    *store = saved;
                }
                return Err(err);
            }
        }
    }
    Ok(results)
}

fn split_keys(keys: Option<Vec<Value>>, len: usize) -> Result<Vec<Option<Value>>> {
    match keys {
        None => Ok(vec![None; len]),
        Some(keys) if keys.len() == len => Ok(keys.into_iter().map(Some).collect()),
        Some(keys) => Err(Error::invalid_operation(format!(
            "{} keys given for {len} values",
            keys.len()
        ))),
    }
}

fn check_writable(trans: &Transaction) -> Result<()> {
    if trans.is_read_write() {
        Ok(())
    } else {
        Err(Error::invalid_operation("write in a read-only transaction"))
    }
}

#[async_trait(?Send)]
impl TableCore for MemoryTable {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    async fn mutate(&self, req: MutateRequest) -> Result<MutateResponse> {
        check_writable(&req.trans)?;
        let resp = self.apply(req.mutation)?;
        self.commit();
        Ok(resp)
    }

    async fn get(&self, req: GetRequest) -> Result<Option<Value>> {
        Ok(self.store.borrow().get(&req.key).cloned())
    }

    async fn get_many(&self, req: GetManyRequest) -> Result<Vec<Option<Value>>> {
        let store = self.store.borrow();
        Ok(req.keys.iter().map(|k| store.get(k).cloned()).collect())
    }

    async fn query(&self, req: QueryRequest) -> Result<QueryResponse> {
        let store = self.store.borrow();
        let pairs = match &req.index {
            None => store.scan(&req.range, req.limit, req.offset),
            Some(index) => store.index_scan(index, &req.range, req.limit, req.offset)?,
        };
        let (keys, values): (Vec<Value>, Vec<Value>) = pairs.into_iter().unzip();
        Ok(QueryResponse {
            keys,
            values: req.values.then_some(values),
        })
    }

    async fn count(&self, req: CountRequest) -> Result<usize> {
        self.store.borrow().count(req.index.as_deref(), &req.range)
    }
}

/// An in-memory database.
///
/// # Example
///
/// ```rust
/// use tablescope_core::schema::{DatabaseSchema, KeyPath, TableSchema};
/// use tablescope_core::store::DatabaseCore;
/// use tablescope_storage::MemoryDatabase;
///
/// let schema = DatabaseSchema::new("shop", 1)
///     .table(TableSchema::new("products").primary_key(KeyPath::single("id"), true));
/// let db = MemoryDatabase::new(schema);
/// assert_eq!(db.name(), "shop");
/// assert!(db.table("products").is_ok());
/// assert!(db.table("orders").is_err());
/// ```
pub struct MemoryDatabase {
    schema: DatabaseSchema,
    tables: HashMap<String, Rc<MemoryTable>>,
    next_tx: Cell<TransactionId>,
}

impl MemoryDatabase {
    /// Creates a database with empty tables for every table in `schema`.
    pub fn new(schema: DatabaseSchema) -> Self {
        let tables = schema
            .tables
            .iter()
            .map(|t| (t.name.clone(), Rc::new(MemoryTable::new(t.clone()))))
            .collect();
        Self {
            schema,
            tables,
            next_tx: Cell::new(0),
        }
    }

    /// Returns the concrete table, for inspection in tests and demos.
    pub fn memory_table(&self, name: &str) -> Result<Rc<MemoryTable>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::table_not_found(name))
    }

    /// Reports a failure to every live observer of `table`.
    pub fn fail_observers(&self, table: &str, message: &str) -> Result<()> {
        self.memory_table(table)?.live.fail(message);
        Ok(())
    }
}

impl DatabaseCore for MemoryDatabase {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn version(&self) -> u32 {
        self.schema.version
    }

    fn schema(&self) -> &DatabaseSchema {
        &self.schema
    }

    fn table(&self, name: &str) -> Result<Rc<dyn TableCore>> {
        let table: Rc<dyn TableCore> = self.memory_table(name)?;
        Ok(table)
    }

    fn begin(&self, mode: TransactionMode) -> Transaction {
        let id = self.next_tx.get() + 1;
        self.next_tx.set(id);
        Transaction::new(id, mode)
    }

    fn observe_table(&self, table: &str, observer: Rc<dyn LiveObserver>) -> Result<LiveHandle> {
        let table = self.memory_table(table)?;
        let (id, handle) = table.live.register(observer);
        let snapshot = table.store.borrow().snapshot();
        table.live.notify_one(id, snapshot);
        Ok(handle)
    }
}
