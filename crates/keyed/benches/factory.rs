use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use keyed::prelude::*;
use std::hint::black_box;

fn counters() -> KeyedFactory<u64, u64> {
    KeyedFactory::new(|n: &mut u64, step: u64| *n += step)
}

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");

    let factory = counters();
    factory.construct("hot", 1);

    group.bench_function("existing_key", |b| {
        b.iter(|| factory.construct(black_box("hot"), 1));
    });

    group.bench_function("fresh_key", |b| {
        let mut next = 0_u64;
        b.iter(|| {
            next += 1;
            factory.construct(black_box(next), 1)
        });
    });

    group.bench_function("construct_then_purge", |b| {
        b.iter(|| factory.construct(black_box("churn"), 1).purge());
    });

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    for size in [16_usize, 256, 4096] {
        let factory = counters();
        let keys: Vec<String> = (0..size).map(|i| format!("key-{i}")).collect();
        factory.select(keys.iter());

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("warm", size), &keys, |b, keys| {
            b.iter(|| factory.select(keys.iter()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_construct, bench_select);
criterion_main!(benches);
