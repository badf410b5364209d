mod common;

use common::replay::ReplayCache;
use common::workload::{Workload, WorkloadGenerator};
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use evictkit::engine::EvictionEngine;

const CAPACITY: usize = 1024;
const OPS: u64 = 4096;

fn warmed(universe: u64, workload: Workload, seed: u64) -> (ReplayCache, EvictionEngine<u64>, WorkloadGenerator) {
    let mut cache = ReplayCache::new(CAPACITY);
    let mut engine = EvictionEngine::new(CAPACITY);
    let mut generator = WorkloadGenerator::new(universe, workload, seed);
    for _ in 0..(CAPACITY as u64 * 2) {
        let key = generator.next_key();
        cache.access(&mut engine, key);
    }
    (cache, engine, generator)
}

fn bench_eviction_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(OPS));
    group.bench_function("eviction_churn", |b| {
        b.iter_batched(
            || warmed(1 << 16, Workload::Uniform, 0x5eed),
            |(mut cache, mut engine, mut generator)| {
                for _ in 0..OPS {
                    let key = generator.next_key();
                    std::hint::black_box(cache.access(&mut engine, key));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_hotset_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(OPS));
    group.bench_function("hotset_replay", |b| {
        b.iter_batched(
            || {
                warmed(
                    1 << 14,
                    Workload::Hotset {
                        hot_fraction: 0.05,
                        hot_prob: 0.9,
                    },
                    0x5eed,
                )
            },
            |(mut cache, mut engine, mut generator)| {
                for _ in 0..OPS {
                    let key = generator.next_key();
                    std::hint::black_box(cache.access(&mut engine, key));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_scan_pressure(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(OPS));
    group.bench_function("scan_pressure", |b| {
        b.iter_batched(
            || {
                // warm a hot working set, then measure a cold scan over it
                let (cache, engine, _) = warmed(
                    CAPACITY as u64,
                    Workload::Hotset {
                        hot_fraction: 0.2,
                        hot_prob: 0.95,
                    },
                    0x5eed,
                );
                let scan = WorkloadGenerator::new(1 << 20, Workload::Scan, 1);
                (cache, engine, scan)
            },
            |(mut cache, mut engine, mut scan)| {
                for _ in 0..OPS {
                    let key = 1_000_000 + scan.next_key();
                    std::hint::black_box(cache.access(&mut engine, key));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_eviction_churn,
    bench_hotset_replay,
    bench_scan_pressure
);
criterion_main!(benches);
