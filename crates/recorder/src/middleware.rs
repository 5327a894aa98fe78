//! Recording decorators.
//!
//! [`RecordingDatabase`] wraps a [`DatabaseCore`] and hands out
//! [`RecordingTable`]s, which forward every call to the wrapped table and
//! append what happened to an [`OperationLog`]. Results and errors pass
//! through untouched; a failure to record never fails the call.
//!
//! Reads issued by the store on behalf of a write would show up as spurious
//! `read` entries. A mutation therefore marks its table with its transaction
//! id, and the next `get`, `get_many` or `query` on the table consumes the
//! mark: it is not logged if it runs in the marked transaction. Queries in
//! read-write transactions are never logged.

use crate::log::OperationLog;
use crate::operation::{Operation, OperationKind, QueryDetails};
use async_trait::async_trait;
use hashbrown::HashMap;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;
use tablescope_core::schema::{DatabaseSchema, TableSchema};
use tablescope_core::store::{
    CountRequest, DatabaseCore, GetManyRequest, GetRequest, MutateRequest, MutateResponse,
    Mutation, QueryRequest, QueryResponse, TableCore, Transaction, TransactionId,
    TransactionMode,
};
use tablescope_core::{LiveHandle, LiveObserver, Result};
use tracing::warn;

/// A table that records the operations passing through it.
pub struct RecordingTable {
    inner: Rc<dyn TableCore>,
    log: OperationLog,
    mark: Cell<Option<TransactionId>>,
}

impl RecordingTable {
    /// Wraps `inner`, recording into `log`.
    pub fn new(inner: Rc<dyn TableCore>, log: OperationLog) -> Self {
        Self {
            inner,
            log,
            mark: Cell::new(None),
        }
    }

    /// Returns the wrapped table.
    pub fn inner(&self) -> &Rc<dyn TableCore> {
        &self.inner
    }

    /// Consumes the mutation mark. Returns true if `trans` is the marked one.
    fn take_mark(&self, trans: &Transaction) -> bool {
        self.mark.take() == Some(trans.id)
    }

    fn record(&self, op: Operation) {
        self.log.push(op);
    }

    fn record_mutation(&self, mutation: Mutation, resp: &MutateResponse, started: Instant) {
        let kind = OperationKind::from_primitive(mutation.name());
        let keys = match mutation.keys() {
            Some(keys) => keys.to_vec(),
            None => resp.results.clone(),
        };
        let mut op = Operation::new(kind, self.inner.name())
            .with_duration(started.elapsed())
            .with_keys(keys);
        op = match mutation {
            Mutation::Add { values, .. } => {
                let results = json!({ "changeSpec": Value::Null, "results": values.clone() });
                op.with_values(values).with_results(results)
            }
            Mutation::Put {
                values,
                change_spec,
                ..
            } => {
                let results = json!({ "changeSpec": change_spec.clone(), "results": values.clone() });
                let op = op.with_values(values).with_results(results);
                match change_spec {
                    Some(spec) => op.with_modifications(spec),
                    None => op,
                }
            }
            Mutation::Delete { .. } | Mutation::DeleteRange { .. } => {
                match serde_json::to_value(resp) {
                    Ok(results) => op.with_results(results),
                    Err(err) => {
                        warn!(table = %self.inner.name(), error = %err, "cannot record delete results");
                        op
                    }
                }
            }
        };
        self.record(op);
    }
}

#[async_trait(?Send)]
impl TableCore for RecordingTable {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn schema(&self) -> &TableSchema {
        self.inner.schema()
    }

    async fn mutate(&self, req: MutateRequest) -> Result<MutateResponse> {
        let started = Instant::now();
        let mutation = req.mutation.clone();
        self.mark.set(Some(req.trans.id));
        match self.inner.mutate(req).await {
            Ok(resp) => {
                self.record_mutation(mutation, &resp, started);
                Ok(resp)
            }
            Err(err) => {
                self.mark.set(None);
                Err(err)
            }
        }
    }

    async fn get(&self, req: GetRequest) -> Result<Option<Value>> {
        let started = Instant::now();
        let suppressed = self.take_mark(&req.trans);
        let key = req.key.clone();
        let result = self.inner.get(req).await?;
        if !suppressed {
            self.record(
                Operation::new(OperationKind::Read, self.inner.name())
                    .with_duration(started.elapsed())
                    .with_keys(vec![key])
                    .with_results(result.clone().unwrap_or(Value::Null)),
            );
        }
        Ok(result)
    }

    async fn get_many(&self, req: GetManyRequest) -> Result<Vec<Option<Value>>> {
        let started = Instant::now();
        let suppressed = self.take_mark(&req.trans) || req.trans.is_read_write();
        let keys = req.keys.clone();
        let result = self.inner.get_many(req).await?;
        if !suppressed {
            let results = Value::Array(
                result
                    .iter()
                    .map(|v| v.clone().unwrap_or(Value::Null))
                    .collect(),
            );
            self.record(
                Operation::new(OperationKind::Read, self.inner.name())
                    .with_duration(started.elapsed())
                    .with_keys(keys)
                    .with_results(results),
            );
        }
        Ok(result)
    }

    async fn query(&self, req: QueryRequest) -> Result<QueryResponse> {
        let started = Instant::now();
        let suppressed = self.take_mark(&req.trans) || req.trans.is_read_write();
        let details = QueryDetails {
            index: req.index.clone(),
            range: req.range.clone(),
            limit: req.limit,
            offset: req.offset,
        };
        let result = self.inner.query(req).await?;
        if !suppressed {
            self.record(
                Operation::new(OperationKind::Read, self.inner.name())
                    .with_duration(started.elapsed())
                    .with_query_details(details)
                    .with_results(json!({ "count": result.keys.len() })),
            );
        }
        Ok(result)
    }

    async fn count(&self, req: CountRequest) -> Result<usize> {
        self.inner.count(req).await
    }
}

/// A database whose tables record into a shared [`OperationLog`].
pub struct RecordingDatabase {
    inner: Rc<dyn DatabaseCore>,
    log: OperationLog,
    tables: RefCell<HashMap<String, Rc<RecordingTable>>>,
}

impl RecordingDatabase {
    /// Wraps `inner`, recording into `log`.
    pub fn new(inner: Rc<dyn DatabaseCore>, log: OperationLog) -> Self {
        Self {
            inner,
            log,
            tables: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the log.
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// Returns the wrapped database.
    pub fn inner(&self) -> &Rc<dyn DatabaseCore> {
        &self.inner
    }
}

impl DatabaseCore for RecordingDatabase {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> u32 {
        self.inner.version()
    }

    fn schema(&self) -> &DatabaseSchema {
        self.inner.schema()
    }

    fn table(&self, name: &str) -> Result<Rc<dyn TableCore>> {
        if let Some(table) = self.tables.borrow().get(name) {
            let table: Rc<dyn TableCore> = table.clone();
            return Ok(table);
        }
        let table = Rc::new(RecordingTable::new(self.inner.table(name)?, self.log.clone()));
        self.tables
            .borrow_mut()
            .insert(name.to_string(), table.clone());
        Ok(table)
    }

    fn begin(&self, mode: TransactionMode) -> Transaction {
        self.inner.begin(mode)
    }

    fn observe_table(&self, table: &str, observer: Rc<dyn LiveObserver>) -> Result<LiveHandle> {
        self.inner.observe_table(table, observer)
    }
}
