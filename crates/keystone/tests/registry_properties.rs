//! # Registry Property Tests
//!
//! Long deterministic create/kill/component churn checked against the
//! registry's invariants after every flush:
//!
//! 1. **Id uniqueness**: no two live entities share an id
//! 2. **Id recycling**: freed ids are reused and start with an empty signature
//! 3. **Pool density**: pool size equals the number of holders
//! 4. **System consistency**: each system lists exactly its matching entities, once
//! 5. **Tag uniqueness**: a tag has one holder, last writer wins
//!
//! Run with: cargo test --test registry_properties

use std::collections::HashSet;

use keystone::components::{BoxCollider, Health, RigidBody, Transform, Vec2};
use keystone::core::{Entity, MembershipPolicy, Registry, RegistryConfig, Signature};
use keystone::systems::{CollisionSystem, MovementSystem};

/// Deterministic xorshift sequence.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, max: usize) -> usize {
        (self.next() % max as u64) as usize
    }
}

fn registry_with_systems(membership: MembershipPolicy) -> Registry {
    let mut registry = Registry::new(RegistryConfig {
        membership,
        ..RegistryConfig::default()
    });
    registry.add_system(MovementSystem::new()).unwrap();
    registry.add_system(CollisionSystem::new()).unwrap();
    registry
}

fn toggle_random_component(registry: &mut Registry, rng: &mut Rng, entity: Entity) {
    let add = rng.next() % 2 == 0;
    match (rng.below(4), add) {
        (0, true) => registry.add_component(entity, Transform::default()).unwrap(),
        (0, false) => registry.remove_component::<Transform>(entity),
        (1, true) => registry.add_component(entity, RigidBody::default()).unwrap(),
        (1, false) => registry.remove_component::<RigidBody>(entity),
        (2, true) => registry.add_component(entity, BoxCollider::new(1.0, 1.0)).unwrap(),
        (2, false) => registry.remove_component::<BoxCollider>(entity),
        (_, true) => registry.add_component(entity, Health::default()).unwrap(),
        (_, false) => registry.remove_component::<Health>(entity),
    }
}

fn assert_invariants(registry: &Registry, live: &[Entity]) {
    // Id uniqueness.
    let ids: HashSet<u32> = live.iter().map(|e| e.id()).collect();
    assert_eq!(ids.len(), live.len(), "duplicate live id");
    assert_eq!(registry.live_entity_count(), live.len());

    // Pool density.
    let holders = live
        .iter()
        .filter(|&&e| registry.has_component::<Transform>(e))
        .count();
    assert_eq!(registry.component_count::<Transform>(), holders);
    for &e in live {
        assert_eq!(
            registry.has_component::<Transform>(e),
            registry.get_component::<Transform>(e).is_ok()
        );
    }

    // System consistency.
    let movers = registry.system_entities::<MovementSystem>().unwrap();
    let colliders = registry.system_entities::<CollisionSystem>().unwrap();
    assert_eq!(movers.iter().collect::<HashSet<_>>().len(), movers.len());
    assert_eq!(colliders.iter().collect::<HashSet<_>>().len(), colliders.len());
    for &e in live {
        let moves = registry.has_component::<Transform>(e) && registry.has_component::<RigidBody>(e);
        let collides =
            registry.has_component::<Transform>(e) && registry.has_component::<BoxCollider>(e);
        assert_eq!(movers.contains(&e), moves, "movement membership of {e}");
        assert_eq!(colliders.contains(&e), collides, "collision membership of {e}");
    }
    assert!(movers.iter().all(|e| live.contains(e)));
    assert!(colliders.iter().all(|e| live.contains(e)));
}

#[test]
fn verify_invariants_under_churn() {
    let mut rng = Rng(0xDEAD_BEEF);
    let mut registry = registry_with_systems(MembershipPolicy::Reevaluate);
    let mut live: Vec<Entity> = Vec::new();
    let mut ever_used: HashSet<u32> = HashSet::new();
    let mut created = 0usize;

    for _round in 0..200 {
        for _ in 0..rng.below(8) {
            let entity = registry.create_entity();
            // A fresh or recycled id never carries components over.
            assert_eq!(registry.signature_of(entity), Some(Signature::EMPTY));
            ever_used.insert(entity.id());
            created += 1;
            live.push(entity);
        }
        for _ in 0..rng.below(12) {
            if live.is_empty() {
                break;
            }
            let entity = live[rng.below(live.len())];
            toggle_random_component(&mut registry, &mut rng, entity);
        }
        for _ in 0..rng.below(5) {
            if live.is_empty() {
                break;
            }
            let entity = live.swap_remove(rng.below(live.len()));
            registry.kill_entity(entity);
        }

        registry.update();
        assert_invariants(&registry, &live);
    }

    // Recycling keeps the id space smaller than the number of creations.
    assert!(ever_used.len() < created);
}

#[test]
fn verify_killed_ids_are_recycled() {
    let mut registry = registry_with_systems(MembershipPolicy::Reevaluate);
    let doomed: Vec<Entity> = (0..4).map(|_| registry.create_entity()).collect();
    for &e in &doomed {
        registry.add_component(e, Transform::default()).unwrap();
        registry.add_component(e, RigidBody::default()).unwrap();
    }
    registry.update();
    for &e in &doomed {
        registry.kill_entity(e);
    }
    registry.update();

    let freed: HashSet<u32> = doomed.iter().map(|e| e.id()).collect();
    for _ in 0..4 {
        let reborn = registry.create_entity();
        assert!(freed.contains(&reborn.id()));
        assert!(!registry.has_component::<Transform>(reborn));
    }
    assert_eq!(registry.create_entity().id(), 4);
    registry.update();
    assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());
}

#[test]
fn verify_admit_once_only_matches_at_flush() {
    let mut registry = registry_with_systems(MembershipPolicy::AdmitOnce);
    let e = registry.create_entity();
    registry.add_component(e, Transform::at(Vec2::ZERO)).unwrap();
    registry.update();

    registry.add_component(e, RigidBody::default()).unwrap();
    assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());

    let matched = registry.create_entity();
    registry.add_component(matched, Transform::default()).unwrap();
    registry.add_component(matched, RigidBody::default()).unwrap();
    registry.update();
    assert_eq!(
        registry.system_entities::<MovementSystem>().unwrap(),
        vec![matched]
    );
}

#[test]
fn verify_tag_uniqueness() {
    let mut registry = Registry::default();
    let a = registry.create_entity();
    let b = registry.create_entity();

    registry.tag_entity(a, "player");
    registry.tag_entity(b, "player");
    assert!(registry.has_tag(b, "player"));
    assert!(!registry.has_tag(a, "player"));
    assert_eq!(registry.entity_by_tag("player"), Ok(b));
    assert_eq!(registry.tag_of(a), None);
}
