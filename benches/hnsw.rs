//! Benchmarks for hot-tier construction, search, and tier migration.
//!
//! All data is uniform random from `SyntheticLoad`, seeded for
//! reproducible comparisons across runs.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tiervec::hnsw::{HnswParams, LayeredGraphIndex, LevelSampler};
use tiervec::synthetic::SyntheticLoad;
use tiervec::{ManualClock, StoreConfig, TieredVectorStore, VectorRecord, Windowing};

const DIM: usize = 64;
const MIN: u64 = 60_000;

fn build_index(vectors: &[Vec<f32>], timestamp: impl Fn(usize) -> u64) -> LayeredGraphIndex {
    let params = HnswParams::default();
    let mut index = LayeredGraphIndex::new(params, LevelSampler::seeded(42, params.max_level));
    for (i, v) in vectors.iter().enumerate() {
        let level = index.sample_level();
        index
            .insert(VectorRecord::new(i as u64, v.clone(), timestamp(i), level))
            .unwrap();
    }
    index
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_construction");
    group.sample_size(10);

    for n in [1_000, 5_000] {
        let vectors = SyntheticLoad::seeded(DIM, 1).batch(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &vectors, |b, vectors| {
            b.iter(|| black_box(build_index(vectors, |_| 0)));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_search");

    let vectors = SyntheticLoad::seeded(DIM, 2).batch(10_000);
    let queries = SyntheticLoad::seeded(DIM, 3).batch(100);
    let index = build_index(&vectors, |_| 0);

    for ef in [16, 32, 64, 128] {
        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_with_input(BenchmarkId::new("ef", ef), &ef, |b, &ef| {
            b.iter(|| {
                for q in &queries {
                    black_box(index.search(q, 10, ef).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_eviction");
    group.sample_size(10);

    let windowing = Windowing::minutes();
    let vectors = SyntheticLoad::seeded(DIM, 4).batch(4_000);
    // Four windows of 1000 records; evict the oldest half.
    let template = |i: usize| (i / 1_000) as u64 * MIN;

    group.bench_function("remove_two_windows_of_four", |b| {
        b.iter_batched(
            || build_index(&vectors, template),
            |mut index| black_box(index.remove_by_time_window(MIN, &windowing)),
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiered_flush");
    group.sample_size(10);

    let vectors = SyntheticLoad::seeded(DIM, 5).batch(3_000);
    group.bench_function("flush_one_window_of_three", |b| {
        b.iter_batched(
            || {
                let clock = ManualClock::from_millis(10 * MIN);
                let config = StoreConfig {
                    dimension: Some(DIM),
                    seed: Some(6),
                    ..StoreConfig::default()
                };
                let store = TieredVectorStore::with_clock(config, Arc::new(clock.clone())).unwrap();
                for (i, v) in vectors.iter().enumerate() {
                    store
                        .insert(v.clone(), (10 + (i / 1_000) as u64) * MIN)
                        .unwrap();
                }
                clock.set_ms(12 * MIN);
                store
            },
            |store| black_box(store.flush_now()),
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_construction, bench_search, bench_eviction, bench_flush);
criterion_main!(benches);
