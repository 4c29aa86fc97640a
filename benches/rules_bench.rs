//! Benchmarks for snapshot evaluation.
//!
//! Evaluation runs once per trigger press and is never on a hot path, so
//! these numbers mostly guard against accidental regressions in the rule
//! tables (e.g. an allocation sneaking into predicate matching).
//!
//! ```sh
//! cargo bench --bench rules_bench
//! cargo bench --bench rules_bench -- evaluate
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use puzzlebox_core::{Category, GateSnapshot, Level};
use puzzlebox_engine::{CategoryTally, evaluate, is_legal_topology};
use std::hint::black_box;

const E: Category = Category::Empty;

fn scenarios() -> Vec<(&'static str, u8, GateSnapshot)> {
    vec![
        (
            "stage0_advance",
            0,
            GateSnapshot::new([
                Category::LineStraight,
                Category::LineCorner,
                Category::LineTJunction,
                E,
                E,
                E,
            ]),
        ),
        (
            "stage1_hint",
            1,
            GateSnapshot::new([
                Category::LineStraight,
                Category::ResistorCorner,
                Category::LineCorner,
                E,
                E,
                E,
            ]),
        ),
        (
            "stage4_generic",
            4,
            GateSnapshot::new([
                Category::LedStraight,
                Category::LedCornerLeft,
                Category::LedCornerRight,
                Category::ResistorStraight,
                Category::LineCorner,
                Category::LineStraight,
            ]),
        ),
        (
            "stage5_advance",
            5,
            GateSnapshot::new([
                Category::Photodiode,
                Category::ResistorStraight,
                Category::PushSwitchCorner,
                Category::LedStraight,
                Category::LineTJunction,
                E,
            ]),
        ),
        (
            "illegal_topology",
            3,
            GateSnapshot::new([Category::LedStraight, E, Category::ResistorCorner, E, E, E]),
        ),
    ]
}

/// Full evaluation including the tally.
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(1));

    for (name, level, snapshot) in scenarios() {
        let level = Level::from_raw(level);
        group.bench_with_input(BenchmarkId::from_parameter(name), &snapshot, |b, snapshot| {
            b.iter(|| {
                let tally = CategoryTally::of(black_box(snapshot));
                black_box(evaluate(black_box(level), snapshot, &tally))
            });
        });
    }

    group.finish();
}

/// Topology lookup over every occupancy pattern.
fn bench_topology(c: &mut Criterion) {
    let snapshots: Vec<GateSnapshot> = (0u8..64)
        .map(|mask| {
            let mut gates = [E; 6];
            for (index, gate) in gates.iter_mut().enumerate() {
                if mask & (1 << index) != 0 {
                    *gate = Category::LineStraight;
                }
            }
            GateSnapshot::new(gates)
        })
        .collect();

    let mut group = c.benchmark_group("topology");
    group.throughput(Throughput::Elements(snapshots.len() as u64));
    group.bench_function("all_masks", |b| {
        b.iter(|| {
            snapshots
                .iter()
                .filter(|snapshot| is_legal_topology(black_box(snapshot)))
                .count()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_topology);
criterion_main!(benches);
