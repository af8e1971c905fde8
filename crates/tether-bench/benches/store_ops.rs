//! Criterion micro-benchmarks for the native object store.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tether_store::NativeObjectStore;

fn bench_create_release(c: &mut Criterion) {
    let mut store: NativeObjectStore<f64> = NativeObjectStore::new();
    c.bench_function("store_create_release", |b| {
        b.iter(|| {
            let handle = store.create(black_box(3.0));
            black_box(store.release(handle).unwrap())
        });
    });
}

fn bench_combine(c: &mut Criterion) {
    let mut store: NativeObjectStore<f64> = NativeObjectStore::new();
    let a = store.create(10.0);
    let b = store.create(20.0);
    c.bench_function("store_combine", |bench| {
        bench.iter(|| black_box(store.combine(black_box(a), black_box(b)).unwrap()));
    });
}

fn bench_stale_lookup(c: &mut Criterion) {
    let mut store: NativeObjectStore<f64> = NativeObjectStore::new();
    let stale = store.create(1.0);
    store.release(stale).unwrap();
    store.create(2.0);
    c.bench_function("store_stale_lookup", |b| {
        b.iter(|| black_box(store.get(black_box(stale)).is_err()));
    });
}

criterion_group!(benches, bench_create_release, bench_combine, bench_stale_lookup);
criterion_main!(benches);
