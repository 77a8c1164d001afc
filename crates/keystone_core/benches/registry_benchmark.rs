//! # Registry Benchmark
//!
//! Measures the hot paths of a frame: entity churn through the flush,
//! component access through pools, and system entity snapshots.
//!
//! Run with: `cargo bench --package keystone_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keystone_core::{Component, Entity, Registry, System, SystemBase};

const ENTITY_COUNT: usize = 10_000;

#[derive(Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Clone, Copy)]
struct Velocity {
    x: f32,
    y: f32,
}
impl Component for Velocity {}

struct Integrate {
    base: SystemBase,
}

impl System for Integrate {
    fn base(&self) -> &SystemBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut SystemBase {
        &mut self.base
    }
}

fn populated(count: usize) -> (Registry, Vec<Entity>) {
    let mut registry = Registry::default();
    registry
        .add_system(Integrate {
            base: SystemBase::new()
                .requiring::<Position>()
                .requiring::<Velocity>(),
        })
        .unwrap();

    let mut entities = Vec::with_capacity(count);
    for i in 0..count {
        let entity = registry.create_entity();
        let f = i as f32;
        registry.add_component(entity, Position { x: f, y: f }).unwrap();
        registry
            .add_component(entity, Velocity { x: 0.1, y: 0.2 })
            .unwrap();
        entities.push(entity);
    }
    registry.update();
    (registry, entities)
}

/// Benchmark: create, flush, kill and flush again.
fn bench_entity_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_churn");

    for count in [100, 1_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut registry = Registry::default();
            b.iter(|| {
                let entities: Vec<Entity> = (0..count).map(|_| registry.create_entity()).collect();
                registry.update();
                for entity in entities {
                    registry.kill_entity(entity);
                }
                black_box(registry.update())
            });
        });
    }

    group.finish();
}

/// Benchmark: one movement step over every matched entity.
fn bench_system_step(c: &mut Criterion) {
    let (mut registry, _) = populated(ENTITY_COUNT);

    c.bench_function("system_step_10k", |b| {
        b.iter(|| {
            for entity in registry.system_entities::<Integrate>().unwrap() {
                let velocity = *registry.get_component::<Velocity>(entity).unwrap();
                let position = registry.get_component_mut::<Position>(entity).unwrap();
                position.x += velocity.x * 0.016;
                position.y += velocity.y * 0.016;
            }
        });
    });
}

/// Benchmark: dense pool iteration, the lower bound for a system step.
fn bench_pool_iteration(c: &mut Criterion) {
    let (registry, _) = populated(ENTITY_COUNT);

    c.bench_function("pool_iterate_10k", |b| {
        b.iter(|| {
            let sum: f32 = registry
                .pool::<Position>()
                .map_or(0.0, |pool| pool.as_slice().iter().map(|p| p.x + p.y).sum());
            black_box(sum)
        });
    });
}

/// Benchmark: removing and re-adding a component, which re-evaluates
/// system membership.
fn bench_component_toggle(c: &mut Criterion) {
    let (mut registry, entities) = populated(ENTITY_COUNT);

    c.bench_function("component_toggle_1k", |b| {
        b.iter(|| {
            for &entity in entities.iter().take(1_000) {
                registry.remove_component::<Velocity>(entity);
                registry
                    .add_component(entity, Velocity { x: 0.1, y: 0.2 })
                    .unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_entity_churn,
    bench_system_step,
    bench_pool_iteration,
    bench_component_toggle,
);
criterion_main!(benches);
