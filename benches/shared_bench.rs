use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use splitrc::Shared;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_populate(c: &mut Criterion) {
    c.bench_function("shared_populate_10k", |b| {
        b.iter_batched(
            || Vec::with_capacity(10_000),
            |mut held: Vec<Shared<u64>>| {
                for x in lcg(1).take(10_000) {
                    held.push(Shared::new(x));
                }
                black_box(held)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_clone_drop(c: &mut Criterion) {
    c.bench_function("shared_clone_drop", |b| {
        let s = Shared::new(1u64);
        b.iter(|| {
            let x = s.clone();
            black_box(&x);
            drop(x);
        })
    });
}

fn bench_downgrade_drop(c: &mut Criterion) {
    c.bench_function("shared_downgrade_drop", |b| {
        let s = Shared::new(1u64);
        b.iter(|| {
            let w = s.downgrade();
            black_box(&w);
            drop(w);
        })
    });
}

fn bench_upgrade_hit(c: &mut Criterion) {
    c.bench_function("weak_upgrade_hit", |b| {
        let s = Shared::new(1u64);
        let w = s.downgrade();
        b.iter(|| {
            let g = w.upgrade().unwrap();
            black_box(&g);
            drop(g);
        })
    });
}

fn bench_upgrade_expired(c: &mut Criterion) {
    c.bench_function("weak_upgrade_expired", |b| {
        let s = Shared::new(1u64);
        let w = s.downgrade();
        drop(s);
        b.iter(|| black_box(w.upgrade().is_none()))
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
    targets = bench_populate, bench_clone_drop, bench_downgrade_drop, bench_upgrade_hit, bench_upgrade_expired
}
criterion_main!(benches);
