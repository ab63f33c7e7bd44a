use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use transflow_api::{TransportModel, TransportSolver};
use transflow_benches::square_instance;
use transflow_core::distance::DistanceMatrix;
use transflow_core::options::SolveOptions;

fn distance_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_matrix");
    for size in [10, 50, 200] {
        let instance = square_instance(size, 42);
        group.bench_function(format!("{size}x{size}"), |b| {
            b.iter(|| DistanceMatrix::between(black_box(&instance.facilities), &instance.customers))
        });
    }
    group.finish();
}

fn build_benchmark(c: &mut Criterion) {
    let instance = square_instance(50, 7);
    let options = SolveOptions::default();
    c.bench_function("build_model_50x50", |b| {
        b.iter(|| TransportModel::build(black_box(&instance), &options).unwrap())
    });
}

fn solve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("clarabel_transport_solve");
    group.sample_size(20);
    for size in [10, 30] {
        group.bench_function(format!("{size}x{size}"), |b| {
            b.iter_batched(
                || square_instance(size, 42),
                |instance| {
                    let solver = TransportSolver::new().options(SolveOptions::default());
                    let _ = solver.solve(&instance).unwrap();
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, distance_benchmark, build_benchmark, solve_benchmark);
criterion_main!(benches);
