//! Tests for the high-level `Table` handle against the in-memory store.

use serde_json::{json, Value};
use std::rc::Rc;
use tablescope_core::schema::{DatabaseSchema, IndexSpec, KeyPath, TableSchema};
use tablescope_core::store::DatabaseCore;
use tablescope_core::{get_row_key, Error, KeyRange, Table};
use tablescope_storage::MemoryDatabase;

fn test_db() -> Rc<dyn DatabaseCore> {
    let schema = DatabaseSchema::new("shop", 1)
        .table(
            TableSchema::new("products")
                .primary_key(KeyPath::single("id"), true)
                .index(IndexSpec::new("price")),
        )
        .table(TableSchema::new("pairs").primary_key(KeyPath::compound(["a", "b"]), false))
        .table(TableSchema::new("logs").outbound(true));
    Rc::new(MemoryDatabase::new(schema))
}

#[tokio::test]
async fn test_add_put_get() {
    let db = test_db();
    let products = Table::open(db, "products").unwrap();

    let key = products.add(json!({"name": "pen", "price": 2})).await.unwrap();
    assert_eq!(key, json!(1));
    products.put(json!({"id": 1, "name": "pen", "price": 3})).await.unwrap();

    let row = products.get(json!(1)).await.unwrap().unwrap();
    assert_eq!(row["price"], json!(3));
    assert_eq!(products.count().await.unwrap(), 1);

    let err = products.add(json!({"id": 1})).await.unwrap_err();
    assert!(matches!(err, Error::Constraint { .. }));
}

#[tokio::test]
async fn test_update_merges_changes() {
    let db = test_db();
    let products = Table::open(db, "products").unwrap();
    products.add(json!({"id": 5, "name": "ink", "price": 9})).await.unwrap();

    assert!(products
        .update(json!(5), json!({"price": 4, "meta.color": "blue"}))
        .await
        .unwrap());
    let row = products.get(json!(5)).await.unwrap().unwrap();
    assert_eq!(row, json!({"id": 5, "name": "ink", "price": 4, "meta": {"color": "blue"}}));

    assert!(!products.update(json!(99), json!({"price": 1})).await.unwrap());
    assert!(products.update(json!(5), json!([1])).await.is_err());
}

#[tokio::test]
async fn test_compound_keys() {
    let db = test_db();
    let pairs = Table::open(db, "pairs").unwrap();
    pairs.add(json!({"b": "x", "a": 1, "v": 0})).await.unwrap();

    let row = pairs.to_array().await.unwrap().remove(0);
    let key = get_row_key(&row, pairs.key_path());
    assert!(pairs.get(key.to_queryable_key()).await.unwrap().is_some());

    pairs
        .put_with_key(json!({"v": 7}), key.to_queryable_key())
        .await
        .unwrap();
    let row = pairs.get(json!([1, "x"])).await.unwrap().unwrap();
    assert_eq!(row["v"], json!(7));

    pairs.delete(key.to_delete_key()).await.unwrap();
    assert_eq!(pairs.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_outbound_keys() {
    let db = test_db();
    let logs = Table::open(db, "logs").unwrap();
    let first = logs.add(json!({"msg": "a"})).await.unwrap();
    logs.add(json!("plain")).await.unwrap();

    logs.put_with_key(json!({"msg": "b"}), first.clone()).await.unwrap();
    let snapshot = logs.snapshot().await.unwrap();
    assert_eq!(snapshot.primary_keys, vec![json!(1), json!(2)]);
    assert_eq!(snapshot.rows[0], json!({"msg": "b"}));

    logs.update(first, json!({"level": "info"})).await.unwrap();
    assert_eq!(
        logs.get(json!(1)).await.unwrap().unwrap(),
        json!({"msg": "b", "level": "info"})
    );
}

#[tokio::test]
async fn test_query_index_and_clear() {
    let db = test_db();
    let products = Table::open(db, "products").unwrap();
    for price in [30, 10, 20] {
        products.add(json!({"price": price})).await.unwrap();
    }
    let resp = products
        .query_index(Some("price"), KeyRange::lower_bound(json!(20), false))
        .await
        .unwrap();
    assert_eq!(resp.keys, vec![json!(3), json!(1)]);
    assert_eq!(
        products.primary_keys().await.unwrap(),
        vec![json!(1), json!(2), json!(3)]
    );

    products.clear().await.unwrap();
    assert!(products.to_array().await.unwrap().is_empty());
    let next: Value = products.add(json!({"price": 1})).await.unwrap();
    assert_eq!(next, json!(4));
}

#[test]
fn test_open_missing_table() {
    let db = test_db();
    assert!(matches!(
        Table::open(db, "orders"),
        Err(Error::TableNotFound { .. })
    ));
}
