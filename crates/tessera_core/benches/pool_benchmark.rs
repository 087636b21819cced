//! # Pool and World Benchmarks
//!
//! Measures the hot paths: pool churn (create, destroy, dispose), checked
//! access through identifiers and views, and a world tick that adds,
//! removes and disposes components.
//!
//! Run with: `cargo bench --package tessera_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{Component, LinearPool, PoolConfig, ResetItems, World, WorldConfig};

const ITEM_COUNT: usize = 100_000;

#[derive(Clone, Copy, Default)]
struct Particle {
    position: [f32; 3],
    velocity: [f32; 3],
}

#[derive(Clone, Copy, Default)]
struct Lifetime(u32);

impl Component for Lifetime {}

/// Benchmark: fill a pool from its smallest size, doubling as it goes.
fn bench_pool_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_fill");

    for count in [1_000, 10_000, ITEM_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut pool = LinearPool::<Particle, ResetItems>::new();
                for _ in 0..count {
                    black_box(pool.create_default().ok());
                }
                pool.len()
            });
        });
    }

    group.finish();
}

/// Benchmark: destroy and dispose 10% of a full pool, then refill the holes.
fn bench_pool_churn(c: &mut Criterion) {
    let mut pool =
        LinearPool::<Particle, ResetItems>::with_config(PoolConfig::with_capacity(ITEM_COUNT));
    let mut ids: Vec<_> = (0..ITEM_COUNT)
        .filter_map(|_| pool.create_default().ok())
        .collect();

    c.bench_function("pool_churn_10K_of_100K", |b| {
        b.iter(|| {
            for id in ids.iter().step_by(10) {
                let _ = pool.destroy(*id);
            }
            black_box(pool.dispose().ok());
            for id in ids.iter_mut().step_by(10) {
                if let Ok(new_id) = pool.create_default() {
                    *id = new_id;
                }
            }
            pool.len()
        });
    });
}

/// Benchmark: checked access through identifiers and views.
fn bench_pool_access(c: &mut Criterion) {
    let mut pool =
        LinearPool::<Particle, ResetItems>::with_config(PoolConfig::with_capacity(ITEM_COUNT));
    let ids: Vec<_> = (0..ITEM_COUNT)
        .filter_map(|_| pool.create_default().ok())
        .collect();
    let views: Vec<_> = ids.iter().map(|id| pool.view(*id)).collect();

    c.bench_function("pool_get_by_identifier_100K", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for id in &ids {
                sum += pool.get(*id).position[0];
            }
            black_box(sum)
        });
    });

    c.bench_function("pool_get_by_view_100K", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for view in &views {
                if let Ok(particle) = pool.get_view(view) {
                    sum += particle.position[0];
                }
            }
            black_box(sum)
        });
    });

    c.bench_function("pool_iter_mut_100K", |b| {
        b.iter(|| {
            for (_, particle) in pool.iter_mut() {
                particle.position[0] += particle.velocity[0];
            }
        });
    });
}

/// Benchmark: one world tick removing and re-adding a component on 10% of entities.
fn bench_world_tick(c: &mut Criterion) {
    let mut world = World::with_config(WorldConfig::large());
    let _ = world.register::<Lifetime>();
    let entities: Vec<_> = (0..ITEM_COUNT / 10)
        .filter_map(|_| world.create_entity().ok())
        .collect();
    for entity in &entities {
        let _ = world.add::<Lifetime>(*entity);
    }

    c.bench_function("world_remove_dispose_add_1K_of_10K", |b| {
        b.iter(|| {
            for entity in entities.iter().step_by(10) {
                let _ = world.remove::<Lifetime>(*entity);
            }
            black_box(world.dispose().ok());
            for entity in entities.iter().step_by(10) {
                let _ = world.add::<Lifetime>(*entity);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_pool_fill,
    bench_pool_churn,
    bench_pool_access,
    bench_world_tick,
);

criterion_main!(benches);
