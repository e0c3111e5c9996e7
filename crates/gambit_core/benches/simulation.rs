//! Battle benchmarks for gambit_core.
//!
//! Run with: `cargo bench -p gambit_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gambit_core::battle::{Battle, DEFAULT_MAX_TURN};
use gambit_core::gambit::{Gambit, TemplateRanker};
use gambit_core::rng::seeded;
use gambit_core::status::{Roster, Side};
use gambit_test_utils::fixtures::standard_teams;

fn run(gambits: &[Gambit], seed: u64) -> usize {
    let mut teams = standard_teams();
    let mut gambits = gambits.to_vec();
    let mut logs = Vec::new();
    Battle::new(seed)
        .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(seed), DEFAULT_MAX_TURN)
        .map(|_| logs.len())
        .unwrap_or_default()
}

/// Full standard battles under each gambit pairing.
pub fn simulation_benchmark(c: &mut Criterion) {
    let naive = [Gambit::Naive, Gambit::Naive];
    let cunning = [Gambit::Cunning, Gambit::Naive];
    let learned = [
        Gambit::learned(TemplateRanker::new(Roster::standard(), Side::Monster)),
        Gambit::Naive,
    ];

    let mut seed = 0u64;
    c.bench_function("battle_naive_vs_naive", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(run(&naive, seed))
        })
    });
    c.bench_function("battle_cunning_vs_naive", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(run(&cunning, seed))
        })
    });
    c.bench_function("battle_learned_vs_naive", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(run(&learned, seed))
        })
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
