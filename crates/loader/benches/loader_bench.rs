//! Benchmarks for truck loading strategies.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use truckpack_core::{Carton, PackOptions, PackingStrategy, Problem, StrategyParams, Truck};
use truckpack_loader::{ExtremePointPacker, GaPacker, SkylinePacker};

fn mixed_load() -> Problem {
    let cartons = vec![
        Carton::new("A", 50.0, 30.0, 40.0).with_weight(15.0).with_quantity(20),
        Carton::new("B", 80.0, 60.0, 50.0).with_weight(40.0).with_quantity(8),
        Carton::new("C", 30.0, 30.0, 30.0).with_weight(5.0).with_quantity(12),
    ];
    Problem::new(cartons, Truck::new(600.0, 240.0, 240.0, 20_000.0)).expect("valid problem")
}

fn heuristic_benchmark(c: &mut Criterion) {
    let problem = mixed_load();
    let options = PackOptions::default();

    c.bench_function("skyline_40_cartons", |b| {
        b.iter(|| black_box(SkylinePacker.pack(black_box(&problem), &options)))
    });
    c.bench_function("extreme_points_40_cartons", |b| {
        b.iter(|| black_box(ExtremePointPacker.pack(black_box(&problem), &options)))
    });
}

fn genetic_benchmark(c: &mut Criterion) {
    let problem = mixed_load();
    let options = PackOptions::new().with_seed(7).with_params(StrategyParams {
        population_size: 16,
        generations: 10,
        ..StrategyParams::default()
    });

    c.bench_function("genetic_40_cartons", |b| {
        b.iter(|| black_box(GaPacker.pack(black_box(&problem), &options)))
    });
}

criterion_group!(benches, heuristic_benchmark, genetic_benchmark);
criterion_main!(benches);
