//! Benchmarks for flowdigest
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::hint::black_box;

use flowdigest::quantiles::{Digest, DigestConfig};
use flowdigest::traits::QuantileSketch;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn uniform(n: usize) -> Vec<f32> {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
    (0..n).map(|_| rng.random_range(0.0..1000.0)).collect()
}

// ============================================================================
// Insertion Benchmarks
// ============================================================================

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    group.throughput(Throughput::Elements(1));

    let values = uniform(100_000);

    for compression in [50.0, 100.0, 200.0] {
        group.bench_function(format!("add_c{}", compression as u32), |b| {
            let mut digest = Digest::new(compression);
            let mut i = 0usize;
            b.iter(|| {
                digest.add(values[i % values.len()], 1.0).unwrap();
                i = i.wrapping_add(1);
            });
        });
    }

    group.bench_function("add_sorted", |b| {
        let mut digest = Digest::new(100.0);
        let mut i = 0u64;
        b.iter(|| {
            digest.add((i as f32) * 0.001, 1.0).unwrap();
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

// ============================================================================
// Query Benchmarks
// ============================================================================

fn bench_quantile(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");

    let mut digest = Digest::new(100.0);
    for v in uniform(100_000) {
        digest.add(v, 1.0).unwrap();
    }

    group.bench_function("quantile_p50", |b| {
        b.iter(|| black_box(digest.quantile(black_box(0.5)).unwrap()))
    });
    group.bench_function("quantile_p99", |b| {
        b.iter(|| black_box(digest.quantile(black_box(0.99)).unwrap()))
    });

    group.finish();
}

// ============================================================================
// Recompression Benchmarks
// ============================================================================

fn bench_recompression(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    let values = uniform(10_000);

    // slack 0 keeps the digest at its budget, so most inserts recompress
    group.bench_function("fill_tight_budget_10k", |b| {
        let config = DigestConfig::new(50.0).with_size_slack(0.0);
        b.iter_batched(
            || Digest::with_config(config).unwrap(),
            |mut digest| {
                for &v in &values {
                    digest.add(v, 1.0).unwrap();
                }
                digest
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_add, bench_quantile, bench_recompression);
criterion_main!(benches);
