//! Property-based tests for query evaluation.
//!
//! The index path must be observationally identical to scanning and
//! filtering, and an empty group must match every row.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::rc::Rc;
use tablescope_core::schema::{DatabaseSchema, IndexSpec, KeyPath, TableSchema};
use tablescope_core::store::DatabaseCore;
use tablescope_core::Table;
use tablescope_query::Strategy as ExecStrategy;
use tablescope_query::{
    plan, CompiledTree, Condition, Group, Logic, Operator, QueryExecutor, QueryTree,
};
use tablescope_storage::MemoryDatabase;

/// Short strings over ASCII, the top of the BMP and the supplementary planes.
const TEXT: &str = "[a-c\u{ffff}\u{1F600}\u{10ffff}]{0,2}";

/// Strategy for field values, mixing numbers, strings and gaps.
fn field_value() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        (-5i64..5).prop_map(|n| Some(json!(n))),
        (-5i64..5).prop_map(|n| Some(json!(n as f64 + 0.5))),
        TEXT.prop_map(|s| Some(json!(s))),
        Just(Some(Value::Null)),
        Just(Some(json!(true))),
        Just(None),
    ]
}

fn rows_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec((field_value(), field_value()), 0..25).prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(i, (age, name))| {
                let mut row = json!({"id": i as i64});
                if let Some(age) = age {
                    row["age"] = age;
                }
                if let Some(name) = name {
                    row["name"] = name;
                }
                row
            })
            .collect()
    })
}

fn indexable_operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(
        Operator::ALL
            .into_iter()
            .filter(|op| op.is_indexable())
            .collect::<Vec<_>>(),
    )
}

fn raw_value() -> impl Strategy<Value = String> {
    prop_oneof![
        (-6i64..6).prop_map(|n| n.to_string()),
        TEXT.prop_map(|s| format!("\"{s}\"")),
        "[a-c]{0,2}",
        ((-6i64..6), (-6i64..6)).prop_map(|(a, b)| format!("{a},{b}")),
        ((-6i64..6), "[a-c]{1,2}").prop_map(|(a, b)| format!("{a}, \"{b}\"")),
        Just("1,2,3".to_string()),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn people_db() -> Rc<MemoryDatabase> {
    Rc::new(MemoryDatabase::new(DatabaseSchema::new("test", 1).table(
        TableSchema::new("people")
            .primary_key(KeyPath::single("id"), false)
            .index(IndexSpec::new("age"))
            .index(IndexSpec::new("name")),
    )))
}

proptest! {
    /// Property: a single indexable condition yields the same rows, in the
    /// same order, whether answered from an index or by a full scan.
    #[test]
    fn index_path_matches_full_scan(
        rows in rows_strategy(),
        field in prop::sample::select(vec!["id", "age", "name"]),
        operator in indexable_operator(),
        raw in raw_value(),
    ) {
        let db = people_db();
        let core: Rc<dyn DatabaseCore> = db.clone();
        let table = Table::open(core, "people").unwrap();
        let tree = QueryTree::from_root(
            Group::new(Logic::And).with(Condition::new(field, operator, raw)),
        );

        let (outcome, all) = block_on(async {
            for row in &rows {
                table.put(row.clone()).await.unwrap();
            }
            let outcome = QueryExecutor::new(table.clone()).run(&tree).await.unwrap();
            (outcome, table.to_array().await.unwrap())
        });

        let expected = CompiledTree::compile(&tree).filter(all);
        prop_assert_eq!(&outcome.rows, &expected);
        if plan(&tree, table.schema()).is_indexed() {
            prop_assert_eq!(outcome.strategy, ExecStrategy::Indexed);
        }
    }

    /// Property: an empty group matches every row, under either logic.
    #[test]
    fn empty_group_is_vacuously_true(
        rows in rows_strategy(),
        or in any::<bool>(),
    ) {
        let logic = if or { Logic::Or } else { Logic::And };
        let compiled = CompiledTree::compile(&QueryTree::new(logic));
        for row in &rows {
            prop_assert!(compiled.matches(row));
        }
    }
}
