//! # Damage
//!
//! Resolves projectile hits reported by the collision system:
//!
//! | Projectile | Target                | Effect                         |
//! |------------|-----------------------|--------------------------------|
//! | hostile    | tagged `player`       | player loses health, shot dies |
//! | friendly   | grouped `enemies`     | enemy loses health, shot dies  |
//! | otherwise  |                       | nothing                        |
//!
//! A target at or below zero health is killed. Kills are deferred to the
//! next flush, so every hit in a frame is still delivered.

use keystone_core::{Entity, Registry, System, SystemBase};
use tracing::{debug, warn};

use crate::components::{BoxCollider, Health, Projectile};
use crate::events::{CollisionEvent, EventBus};

/// Group holding every projectile.
pub const PROJECTILES_GROUP: &str = "projectiles";
/// Group holding every enemy.
pub const ENEMIES_GROUP: &str = "enemies";
/// Tag of the player entity.
pub const PLAYER_TAG: &str = "player";

/// Applies projectile damage on collision.
#[derive(Debug)]
pub struct DamageSystem {
    base: SystemBase,
}

impl DamageSystem {
    /// Creates the system and declares its requirements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().requiring::<BoxCollider>(),
        }
    }

    /// Subscribes the collision handler for this frame.
    pub fn subscribe_to_events(bus: &mut EventBus<Registry>) {
        bus.subscribe::<Self, CollisionEvent>(Self::on_collision);
    }

    /// Applies the damage rule to both orderings of the pair.
    pub fn on_collision(registry: &mut Registry, event: &mut CollisionEvent) {
        let CollisionEvent { a, b } = *event;
        for (shot, other) in [(a, b), (b, a)] {
            if !registry.belongs_to_group(shot, PROJECTILES_GROUP) {
                continue;
            }
            if registry.has_tag(other, PLAYER_TAG) {
                Self::projectile_hits(registry, shot, other, false);
            }
            if registry.belongs_to_group(other, ENEMIES_GROUP) {
                Self::projectile_hits(registry, shot, other, true);
            }
        }
    }

    fn projectile_hits(registry: &mut Registry, shot: Entity, target: Entity, friendly: bool) {
        let projectile = match registry.get_component::<Projectile>(shot) {
            Ok(projectile) => *projectile,
            Err(err) => {
                warn!(%shot, error = %err, "projectile without projectile data");
                return;
            }
        };
        if projectile.is_friendly != friendly {
            return;
        }

        let remaining = match registry.get_component_mut::<Health>(target) {
            Ok(health) => {
                health.percentage = health
                    .percentage
                    .saturating_sub(projectile.hit_percent_damage);
                health.percentage
            }
            Err(err) => {
                warn!(%target, error = %err, "hit target has no health");
                return;
            }
        };
        debug!(%shot, %target, remaining, "projectile hit");

        if remaining <= 0 {
            registry.kill_entity(target);
        }
        registry.kill_entity(shot);
    }
}

impl Default for DamageSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DamageSystem {
    fn base(&self) -> &SystemBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SystemBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(registry: &mut Registry, damage: i32, friendly: bool) -> Entity {
        let entity = registry.create_entity();
        registry
            .add_component(entity, Projectile::new(damage, 10.0, friendly))
            .unwrap();
        registry.group_entity(entity, PROJECTILES_GROUP);
        entity
    }

    fn target(registry: &mut Registry, percentage: i32) -> Entity {
        let entity = registry.create_entity();
        registry.add_component(entity, Health { percentage }).unwrap();
        entity
    }

    #[test]
    fn test_hostile_shot_hurts_player() {
        let mut registry = Registry::default();
        let player = target(&mut registry, 100);
        registry.tag_entity(player, PLAYER_TAG);
        let bullet = shot(&mut registry, 25, false);
        registry.update();

        DamageSystem::on_collision(&mut registry, &mut CollisionEvent { a: player, b: bullet });
        assert_eq!(registry.get_component::<Health>(player).unwrap().percentage, 75);
        assert!(registry.is_pending_kill(bullet));
        assert!(!registry.is_pending_kill(player));
    }

    #[test]
    fn test_friendly_shot_spares_player_and_kills_enemy() {
        let mut registry = Registry::default();
        let player = target(&mut registry, 100);
        registry.tag_entity(player, PLAYER_TAG);
        let enemy = target(&mut registry, 10);
        registry.group_entity(enemy, ENEMIES_GROUP);
        let bullet = shot(&mut registry, 10, true);
        registry.update();

        DamageSystem::on_collision(&mut registry, &mut CollisionEvent { a: bullet, b: player });
        assert_eq!(registry.get_component::<Health>(player).unwrap().percentage, 100);
        assert!(!registry.is_pending_kill(bullet));

        DamageSystem::on_collision(&mut registry, &mut CollisionEvent { a: bullet, b: enemy });
        assert!(registry.is_pending_kill(enemy));
        assert!(registry.is_pending_kill(bullet));

        registry.update();
        assert!(!registry.is_alive(enemy));
        assert!(!registry.is_alive(bullet));
    }

    #[test]
    fn test_huge_damage_saturates() {
        let mut registry = Registry::default();
        let player = target(&mut registry, -10);
        registry.tag_entity(player, PLAYER_TAG);
        let bullet = shot(&mut registry, i32::MAX, false);
        registry.update();

        DamageSystem::on_collision(&mut registry, &mut CollisionEvent { a: bullet, b: player });
        assert_eq!(
            registry.get_component::<Health>(player).unwrap().percentage,
            i32::MIN
        );
        assert!(registry.is_pending_kill(player));
    }

    #[test]
    fn test_unrelated_pair_is_ignored() {
        let mut registry = Registry::default();
        let a = target(&mut registry, 50);
        let b = target(&mut registry, 50);
        registry.update();

        DamageSystem::on_collision(&mut registry, &mut CollisionEvent { a, b });
        assert_eq!(registry.pending_counts(), (0, 0));
    }
}
