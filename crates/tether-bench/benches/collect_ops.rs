//! Criterion micro-benchmarks for collection and finalizer dispatch.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tether_bench::{populate, rooted_profile};
use tether_runtime::{Env, EnvConfig};

fn bench_collect_all_unreachable(c: &mut Criterion) {
    c.bench_function("collect_10k_unreachable", |b| {
        b.iter_batched(
            || {
                let mut env: Env<f64> = Env::default();
                env.with_scope(|env| populate(env, 10_000).unwrap());
                env
            },
            |mut env| {
                black_box(env.collect());
                env
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_collect_all_rooted(c: &mut Criterion) {
    let (mut env, _roots) = rooted_profile(10_000).unwrap();
    c.bench_function("collect_10k_rooted", |b| {
        b.iter(|| black_box(env.collect()));
    });
}

fn bench_deferred_drain(c: &mut Criterion) {
    c.bench_function("drain_10k_deferred", |b| {
        b.iter_batched(
            || {
                let mut env: Env<f64> = Env::new(EnvConfig::deferred()).unwrap();
                env.with_scope(|env| populate(env, 10_000).unwrap());
                env.collect();
                env
            },
            |mut env| {
                black_box(env.drain_finalizers());
                env
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_collect_all_unreachable,
    bench_collect_all_rooted,
    bench_deferred_drain
);
criterion_main!(benches);
