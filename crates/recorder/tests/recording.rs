//! Integration tests for the recording decorators over the in-memory store.

use serde_json::json;
use std::rc::Rc;
use tablescope_core::schema::{DatabaseSchema, IndexSpec, KeyPath, TableSchema};
use tablescope_core::store::{
    DatabaseCore, GetManyRequest, GetRequest, MutateRequest, Mutation, QueryRequest,
    TransactionMode,
};
use tablescope_core::{KeyRange, Table};
use tablescope_recorder::{OperationKind, OperationLog, RecordingDatabase};
use tablescope_storage::MemoryDatabase;

fn recording_db() -> (Rc<RecordingDatabase>, OperationLog) {
    let schema = DatabaseSchema::new("shop", 1).table(
        TableSchema::new("products")
            .primary_key(KeyPath::single("id"), false)
            .index(IndexSpec::new("price")),
    );
    let log = OperationLog::new();
    let db = Rc::new(RecordingDatabase::new(
        Rc::new(MemoryDatabase::new(schema)),
        log.clone(),
    ));
    (db, log)
}

#[tokio::test]
async fn test_puts_are_logged_as_updates() {
    let (db, log) = recording_db();
    let products = Table::open(db, "products").unwrap();
    products.put(json!({"id": 1, "price": 10})).await.unwrap();
    products.put(json!({"id": 1, "price": 20})).await.unwrap();

    let ops = log.snapshot();
    assert_eq!(ops.len(), 2);
    for op in &ops {
        assert_eq!(op.kind, OperationKind::Update);
        assert_eq!(op.table, "products");
        assert_eq!(op.key, Some(json!(1)));
        assert!(op.duration_ms >= 0.0);
    }
    assert_eq!(
        ops[1].results,
        json!({"changeSpec": null, "results": [{"id": 1, "price": 20}]})
    );
}

#[tokio::test]
async fn test_add_update_delete_kinds() {
    let (db, log) = recording_db();
    let products = Table::open(db, "products").unwrap();
    products.add(json!({"id": 1, "price": 10})).await.unwrap();
    products.update(json!(1), json!({"price": 12})).await.unwrap();
    products.delete(json!(1)).await.unwrap();

    let ops = log.snapshot();
    let kinds: Vec<OperationKind> = ops.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![OperationKind::Create, OperationKind::Update, OperationKind::Delete]
    );
    assert_eq!(ops[1].modifications, Some(json!({"price": 12})));
    assert_eq!(ops[2].results, json!({"results": [1], "failures": 0}));
}

#[tokio::test]
async fn test_failed_mutation_is_not_logged() {
    let (db, log) = recording_db();
    let products = Table::open(db, "products").unwrap();
    products.add(json!({"id": 1})).await.unwrap();
    assert!(products.add(json!({"id": 1})).await.is_err());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_reads_are_logged() {
    let (db, log) = recording_db();
    let products = Table::open(db, "products").unwrap();
    products.add(json!({"id": 1, "price": 10})).await.unwrap();
    products.add(json!({"id": 2, "price": 5})).await.unwrap();
    log.clear();

    products.get(json!(2)).await.unwrap();
    products
        .query_index(Some("price"), KeyRange::upper_bound(json!(7), false))
        .await
        .unwrap();

    let ops = log.snapshot();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].kind, OperationKind::Read);
    assert_eq!(ops[0].keys, Some(vec![json!(2)]));
    assert_eq!(ops[0].results, json!({"id": 2, "price": 5}));

    let details = ops[1].query_details.as_ref().unwrap();
    assert_eq!(details.index.as_deref(), Some("price"));
    assert_eq!(details.range, KeyRange::upper_bound(json!(7), false));
    assert_eq!(ops[1].results, json!({"count": 1}));
}

#[tokio::test]
async fn test_read_in_mutating_transaction_is_suppressed() {
    let (db, log) = recording_db();
    let table = db.table("products").unwrap();

    let trans = db.begin(TransactionMode::ReadWrite);
    table
        .mutate(MutateRequest {
            trans,
            mutation: Mutation::Put {
                values: vec![json!({"id": 1})],
                keys: None,
                change_spec: None,
            },
        })
        .await
        .unwrap();
    let read_back = GetRequest {
        trans,
        key: json!(1),
    };
    table.get(read_back.clone()).await.unwrap();
    assert_eq!(log.len(), 1);

    // The mark is consumed: a second read in the same transaction is logged.
    table.get(read_back).await.unwrap();
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn test_read_in_other_transaction_is_logged() {
    let (db, log) = recording_db();
    let table = db.table("products").unwrap();
    let trans = db.begin(TransactionMode::ReadWrite);
    table
        .mutate(MutateRequest {
            trans,
            mutation: Mutation::Add {
                values: vec![json!({"id": 1})],
                keys: None,
            },
        })
        .await
        .unwrap();

    let other = db.begin(TransactionMode::ReadOnly);
    table
        .get_many(GetManyRequest {
            trans: other,
            keys: vec![json!(1), json!(9)],
        })
        .await
        .unwrap();
    let ops = log.snapshot();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[1].results, json!([{"id": 1}, null]));
    assert_eq!(ops[1].key, None);
}

#[tokio::test]
async fn test_readwrite_queries_are_not_logged() {
    let (db, log) = recording_db();
    let table = db.table("products").unwrap();
    let trans = db.begin(TransactionMode::ReadWrite);
    table
        .query(QueryRequest::new(trans, KeyRange::all()))
        .await
        .unwrap();
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_clear_and_truncate() {
    let (db, log) = recording_db();
    let products = Table::open(db.clone(), "products").unwrap();
    for id in 1..=3 {
        products.add(json!({"id": id})).await.unwrap();
    }
    products.clear().await.unwrap();
    let ops = log.snapshot();
    let last = ops.last().unwrap();
    assert_eq!(last.kind, OperationKind::Delete);
    assert_eq!(last.keys, Some(vec![json!(1), json!(2), json!(3)]));

    // Tables are cached per name.
    let a = db.table("products").unwrap();
    let b = db.table("products").unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    let count: usize = products.count().await.unwrap();
    assert_eq!(count, 0);
}
