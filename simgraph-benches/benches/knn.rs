//! NN-Descent benchmarks.
//!
//! Measures full `Knn::compute` runs across dataset sizes, neighbour counts,
//! initial samplers and worker counts. A one-off recall pass writes a CSV
//! report under `target/benchmarks/` so speed and quality can be read side
//! by side.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use simgraph_benches::{
    error::BenchSetupError,
    params::{ConcurrencyBenchParams, KnnBenchParams},
    recall::{RecallMeasurement, measure_recall, write_recall_report},
    source::{GaussianBlobConfig, SyntheticConfig, gaussian_blobs, ring_graph, uniform_vectors},
};
use simgraph_core::{
    DenseVectors, Knn, KnnConfig, KnnConfigBuilder, KnnNeighbourFilter, NodesOnly, SamplerKind,
    VectorMetric, VectorSimilarity,
};

/// Seed used for data generation and every run.
const SEED: u64 = 42;

/// Vector dimensionality for all benchmark datasets.
const DIMENSIONS: usize = 16;

/// Dataset sizes to benchmark.
const POINT_COUNTS: &[usize] = &[500, 1_000, 5_000];

/// Neighbour counts to benchmark.
const TOP_K_VALUES: &[usize] = &[10, 20];

/// Worker counts for the scaling group.
const CONCURRENCY_VALUES: &[usize] = &[1, 2, 4, 8];

/// Dataset size for the scaling and recall groups.
const FIXED_POINT_COUNT: usize = 2_000;

/// Queries scored against the brute-force oracle.
const RECALL_QUERY_COUNT: usize = 100;

/// Report destination for recall measurements.
const RECALL_REPORT_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../target/benchmarks/knn_recall.csv"
);

fn make_config(
    top_k: usize,
    sampler: SamplerKind,
    concurrency: usize,
) -> Result<KnnConfig, BenchSetupError> {
    Ok(KnnConfigBuilder::new()
        .with_top_k(top_k)
        .with_sampler(sampler)
        .with_concurrency(concurrency)
        .with_min_batch_size(64)
        .with_random_seed(Some(SEED))
        .build()?)
}

fn make_uniform(point_count: usize) -> Result<VectorSimilarity<DenseVectors>, BenchSetupError> {
    let vectors = uniform_vectors(&SyntheticConfig {
        point_count,
        dimensions: DIMENSIONS,
        seed: SEED,
    })?;
    Ok(VectorSimilarity::new(vectors, VectorMetric::Euclidean))
}

fn make_blobs(point_count: usize) -> Result<VectorSimilarity<DenseVectors>, BenchSetupError> {
    let vectors = gaussian_blobs(&GaussianBlobConfig {
        point_count,
        dimensions: DIMENSIONS,
        cluster_count: 8,
        separation: 6.0,
        spread: 0.35,
        seed: SEED,
    })?;
    Ok(VectorSimilarity::new(vectors, VectorMetric::Cosine))
}

fn panic_on_run_error<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{context}: {err}"),
    }
}

fn knn_sizes_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("nn_descent");
    group.sample_size(10);

    for &point_count in POINT_COUNTS {
        let similarity = make_uniform(point_count)?;
        let graph = NodesOnly(point_count);
        for &top_k in TOP_K_VALUES {
            let params = KnnBenchParams {
                point_count,
                top_k,
                sampler: SamplerKind::Uniform,
            };
            let config = make_config(top_k, SamplerKind::Uniform, 4)?;
            group.bench_with_input(
                BenchmarkId::from_parameter(&params),
                &config,
                |b, config| {
                    b.iter(|| {
                        panic_on_run_error(
                            Knn::new(config.clone()).compute(
                                &graph,
                                &similarity,
                                &KnnNeighbourFilter,
                            ),
                            "nn_descent run failed",
                        )
                    });
                },
            );
        }
    }
    group.finish();
    Ok(())
}

fn knn_samplers_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("nn_descent_sampler");
    group.sample_size(10);

    let similarity = make_blobs(FIXED_POINT_COUNT)?;
    let ring = ring_graph(FIXED_POINT_COUNT, 8)?;
    for sampler in [SamplerKind::Uniform, SamplerKind::RandomWalk] {
        let params = KnnBenchParams {
            point_count: FIXED_POINT_COUNT,
            top_k: 10,
            sampler,
        };
        let config = make_config(10, sampler, 4)?;
        group.bench_with_input(
            BenchmarkId::from_parameter(&params),
            &config,
            |b, config| {
                b.iter(|| {
                    panic_on_run_error(
                        Knn::new(config.clone()).compute(&ring, &similarity, &KnnNeighbourFilter),
                        "sampler run failed",
                    )
                });
            },
        );
    }
    group.finish();
    Ok(())
}

fn knn_concurrency_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("nn_descent_concurrency");
    group.sample_size(10);

    let similarity = make_uniform(FIXED_POINT_COUNT)?;
    let graph = NodesOnly(FIXED_POINT_COUNT);
    for &concurrency in CONCURRENCY_VALUES {
        let params = ConcurrencyBenchParams {
            point_count: FIXED_POINT_COUNT,
            concurrency,
        };
        let config = make_config(10, SamplerKind::Uniform, concurrency)?;
        group.bench_with_input(
            BenchmarkId::from_parameter(&params),
            &config,
            |b, config| {
                b.iter(|| {
                    panic_on_run_error(
                        Knn::new(config.clone()).compute(&graph, &similarity, &KnnNeighbourFilter),
                        "concurrency run failed",
                    )
                });
            },
        );
    }
    group.finish();
    Ok(())
}

fn record_recall() -> Result<(), BenchSetupError> {
    let mut records = Vec::new();
    let ring = ring_graph(FIXED_POINT_COUNT, 8)?;
    for (dataset, similarity) in [
        ("uniform", make_uniform(FIXED_POINT_COUNT)?),
        ("blobs", make_blobs(FIXED_POINT_COUNT)?),
    ] {
        for &top_k in TOP_K_VALUES {
            for sampler in [SamplerKind::Uniform, SamplerKind::RandomWalk] {
                let config = make_config(top_k, sampler, 4)?;
                let result = Knn::new(config).compute(&ring, &similarity, &KnnNeighbourFilter)?;
                let step = FIXED_POINT_COUNT / RECALL_QUERY_COUNT;
                let queries = (0..RECALL_QUERY_COUNT).map(|query| query * step);
                let recall = measure_recall(&result, &similarity, queries, top_k)?;
                let params = KnnBenchParams {
                    point_count: FIXED_POINT_COUNT,
                    top_k,
                    sampler,
                };
                records.push(RecallMeasurement {
                    label: format!("{dataset};{params}"),
                    recall,
                    ran_iterations: result.ran_iterations(),
                    node_pairs_considered: result.node_pairs_considered(),
                });
            }
        }
    }
    write_recall_report(RECALL_REPORT_PATH, &records)?;
    Ok(())
}

fn knn_benches(c: &mut Criterion) {
    if let Err(err) = knn_sizes_impl(c) {
        panic!("nn_descent benchmark setup failed: {err}");
    }
    if let Err(err) = knn_samplers_impl(c) {
        panic!("sampler benchmark setup failed: {err}");
    }
    if let Err(err) = knn_concurrency_impl(c) {
        panic!("concurrency benchmark setup failed: {err}");
    }
    if let Err(err) = record_recall() {
        panic!("recall measurement failed: {err}");
    }
}

criterion_group!(benches, knn_benches);
criterion_main!(benches);
