//! Benchmarks for predicate evaluation.
//!
//! Rows are generated in shuffled order so no benchmark profits from
//! sorted input. Compilation is measured separately from evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use tablescope_query::{CompiledTree, Condition, Group, Logic, Operator, QueryTree};

/// Simple LCG for reproducible pseudo-random shuffling
fn shuffle_indices(count: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..count).collect();
    let mut s = seed;
    for i in (1..count).rev() {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        let j = (s as usize) % (i + 1);
        indices.swap(i, j);
    }
    indices
}

fn create_rows(count: usize) -> Vec<Value> {
    shuffle_indices(count, 12345)
        .into_iter()
        .map(|i| {
            json!({
                "id": i,
                "name": format!("name_{i}"),
                "age": i % 100,
                "address": {"city": if i % 3 == 0 { "Oslo" } else { "Lima" }},
            })
        })
        .collect()
}

fn single_tree() -> QueryTree {
    QueryTree::from_root(
        Group::new(Logic::And).with(Condition::new("age", Operator::Between, "20,40")),
    )
}

fn nested_tree() -> QueryTree {
    QueryTree::from_root(
        Group::new(Logic::And)
            .with(Condition::new("age", Operator::AboveOrEqual, "18"))
            .with(
                Group::new(Logic::Or)
                    .with(Condition::new("name", Operator::StartsWithIgnoreCase, "NAME_1"))
                    .with(Condition::new("address.city", Operator::Equals, "\"Oslo\""))
                    .with(Condition::new("id", Operator::AnyOf, "1,2,3,5,8,13,21")),
            ),
    )
}

fn bench_compile(c: &mut Criterion) {
    let tree = nested_tree();
    c.bench_function("compile_nested", |b| {
        b.iter(|| black_box(CompiledTree::compile(black_box(&tree))))
    });
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [100, 1000, 10000].iter() {
        let rows = create_rows(*size);
        let single = CompiledTree::compile(&single_tree());
        let nested = CompiledTree::compile(&nested_tree());

        group.bench_with_input(BenchmarkId::new("single", size), size, |b, _| {
            b.iter(|| black_box(rows.iter().filter(|r| single.matches(r)).count()))
        });
        group.bench_with_input(BenchmarkId::new("nested", size), size, |b, _| {
            b.iter(|| black_box(rows.iter().filter(|r| nested.matches(r)).count()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_filter);
criterion_main!(benches);
