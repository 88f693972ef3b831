use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use robin_table::{RobinTable, SipHash, Xxh64, DEFAULT_SEED};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn keys(seed: u64, n: usize) -> Vec<[u8; 8]> {
    lcg(seed).take(n).map(|x| x.to_le_bytes()).collect()
}

fn bench_put(c: &mut Criterion) {
    let ks = keys(1, 10_000);
    c.bench_function("robin_table_put_10k", |b| {
        b.iter_batched(
            || RobinTable::<u64>::with_capacity(0).unwrap(),
            |mut t| {
                for (i, k) in ks.iter().enumerate() {
                    t.put(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    let ks = keys(7, 20_000);
    c.bench_function("robin_table_get_hit", |b| {
        let mut t = RobinTable::<u64>::with_capacity(ks.len()).unwrap();
        for (i, k) in ks.iter().enumerate() {
            t.put(k, i as u64).unwrap();
        }
        let mut it = ks.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    let ks = keys(11, 10_000);
    c.bench_function("robin_table_get_miss", |b| {
        let mut t = RobinTable::<u64>::with_capacity(ks.len()).unwrap();
        for (i, k) in ks.iter().enumerate() {
            t.put(k, i as u64).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // keys from a disjoint stream, overwhelmingly absent
            let k = miss.next().unwrap().to_le_bytes();
            black_box(t.get(&k));
        })
    });
}

fn bench_put_del_churn(c: &mut Criterion) {
    let ks = keys(13, 10_000);
    c.bench_function("robin_table_put_del_churn", |b| {
        let mut t = RobinTable::<u64>::with_capacity(ks.len()).unwrap();
        for (i, k) in ks.iter().enumerate() {
            t.put(k, i as u64).unwrap();
        }
        let mut it = ks.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.del(k));
            t.put(k, 0).unwrap();
        })
    });
}

fn bench_strategies(c: &mut Criterion) {
    let ks = keys(17, 20_000);
    c.bench_function("robin_table_get_hit_siphash", |b| {
        let mut t = RobinTable::with_strategy(ks.len(), SipHash, DEFAULT_SEED).unwrap();
        for (i, k) in ks.iter().enumerate() {
            t.put(k, i as u64).unwrap();
        }
        let mut it = ks.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });
    c.bench_function("robin_table_get_hit_xxh64", |b| {
        let mut t = RobinTable::with_strategy(ks.len(), Xxh64, DEFAULT_SEED).unwrap();
        for (i, k) in ks.iter().enumerate() {
            t.put(k, i as u64).unwrap();
        }
        let mut it = ks.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_put, bench_get_hit, bench_get_miss, bench_put_del_churn, bench_strategies
}
criterion_main!(benches);
