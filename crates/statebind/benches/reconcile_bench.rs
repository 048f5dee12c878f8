//! Benchmarks for reconciliation cycles.
//!
//! Run with: cargo bench -p statebind --bench reconcile_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use statebind::{Binding, Engine};
use statebind_tree::{Value, tree};
use std::hint::black_box;

fn make_engine(pattern: &str) -> Engine {
    Engine::builder().bind(pattern, Binding::new).build()
}

fn seed_items(engine: &mut Engine, n: usize) {
    engine
        .apply(|draft| {
            let items: Value = (0..n).map(Value::from).collect();
            *draft = tree!({ "state": { "items": items } });
        })
        .unwrap();
}

fn bench_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile/steady_state");

    for n in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("noop_cycle", n), &n, |b, &n| {
            let mut engine = make_engine("state.items[*]");
            seed_items(&mut engine, n);
            b.iter(|| {
                engine.apply(|_| {}).unwrap();
                black_box(engine.active_bindings())
            });
        });
    }

    group.finish();
}

fn bench_single_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile/single_edit");

    for n in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("one_update", n), &n, |b, &n| {
            let mut engine = make_engine("state.items[*]");
            seed_items(&mut engine, n);
            let mut tick = 0i64;
            b.iter(|| {
                tick += 1;
                engine
                    .apply(|draft| draft.set_at("state.items[0]", tick + 1_000_000).unwrap())
                    .unwrap();
                black_box(engine.active_bindings())
            });
        });
    }

    group.finish();
}

fn bench_full_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile/full_churn");

    for n in [10usize, 100] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("rebuild_all", n), &n, |b, &n| {
            let mut engine = make_engine("state.items[*]");
            let mut tick = 0i64;
            b.iter(|| {
                tick += 1;
                let base = tick * n as i64;
                engine
                    .apply(move |draft| {
                        let items: Value = (0..n as i64).map(|i| Value::Int(base + i)).collect();
                        *draft = tree!({ "state": { "items": items } });
                    })
                    .unwrap();
                black_box(engine.active_bindings())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_steady_state, bench_single_edit, bench_full_churn);
criterion_main!(benches);
