//! Benchmarks for batched Lloyd k-means

#![expect(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dmine::{
    Relation,
    distance::{GeneralPath, SquaredEuclidean},
    kmeans::{BatchedLloyd, Blocking, KMeansPlusPlus},
};

fn config_group(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>, n_items: usize) {
    group.sample_size(10);
    group.throughput(criterion::Throughput::Elements(n_items as u64));

    let plot_config = criterion::PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic);
    group.plot_config(plot_config);
}

/// Sweeps the block count for a fixed dataset, comparing sequential and parallel assignment and the two distance paths.
fn bench_blocks(c: &mut Criterion, car: usize, dim: usize, k: usize) {
    let items = synthdata::random_tabular_seedable(car, dim, -1.0, 1.0, 42);
    let relation = Relation::from_vectors(items).unwrap_or_else(|e| unreachable!("{e}"));
    let init = KMeansPlusPlus { seed: 42 };

    let mut group = c.benchmark_group(format!("BatchedLloyd-{car}x{dim}-k{k}"));
    config_group(&mut group, car);

    for blocking in [Blocking::FullPass, Blocking::Random(2), Blocking::Random(10), Blocking::Random(50)] {
        let param = blocking.num_blocks();
        let config = BatchedLloyd::new(k, SquaredEuclidean, init)
            .with_blocking(blocking)
            .with_seed(42)
            .with_max_iterations(20);

        group.bench_function(BenchmarkId::new("run", param), |b| {
            b.iter_with_large_drop(|| config.run(&relation).unwrap_or_else(|e| unreachable!("{e}")));
        });
        group.bench_function(BenchmarkId::new("par_run", param), |b| {
            b.iter_with_large_drop(|| config.par_run(&relation).unwrap_or_else(|e| unreachable!("{e}")));
        });

        // The general path cannot seed with k-means++, so it starts from the same means.
        let start = config.start(&relation).unwrap_or_else(|e| unreachable!("{e}"));
        let means = start.means().iter().map(|m| m.as_slice().to_vec()).collect::<Vec<_>>();
        let general = BatchedLloyd::new(k, GeneralPath(SquaredEuclidean), dmine::kmeans::PredefinedMeans(means))
            .with_blocking(blocking)
            .with_seed(42)
            .with_max_iterations(20);
        group.bench_function(BenchmarkId::new("general-path", param), |b| {
            b.iter_with_large_drop(|| general.run(&relation).unwrap_or_else(|e| unreachable!("{e}")));
        });
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_blocks(c, 10_000, 10, 10);
    bench_blocks(c, 100_000, 32, 50);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
