//! # Singleton Access Benchmark
//!
//! ARCHITECT'S REQUIREMENTS:
//! - Hot path (bound slot) is a latch load plus a read lock
//! - Cold path (scan + create) scales with live objects of the type only
//!
//! Run with: `cargo bench --package oroboros_singleton`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use oroboros_singleton::{Behaviour, MemoryHost, SingletonRegistry};

struct Director;

impl Behaviour for Director {
    fn create() -> Self {
        Self
    }
}

struct Prop;

impl Behaviour for Prop {
    fn create() -> Self {
        Self
    }
}

/// Benchmark: repeated access to an already-bound singleton.
fn bench_bound_access(c: &mut Criterion) {
    let host = MemoryHost::new();
    let registry = SingletonRegistry::new();
    registry.install::<Director, _>(&host);
    registry.get_instance::<Director, _>(&host);

    c.bench_function("bound_access", |b| {
        b.iter(|| black_box(registry.get_instance::<Director, _>(&host)));
    });
}

/// Benchmark: first access with unrelated objects in the host.
fn bench_first_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_access");

    for props in [0_usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(props), &props, |b, &props| {
            b.iter_batched(
                || {
                    let host = MemoryHost::new();
                    for _ in 0..props {
                        let _ = host.spawn("prop", Prop);
                    }
                    (host, SingletonRegistry::new())
                },
                |(host, registry)| black_box(registry.get_instance::<Director, _>(&host)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bound_access, bench_first_access);
criterion_main!(benches);
