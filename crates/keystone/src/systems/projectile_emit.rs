//! Spawns projectiles from emitters.

use keystone_core::{EcsResult, Entity, Registry, System, SystemBase};
use tracing::{debug, trace, warn};

use crate::components::{
    BoxCollider, KeyboardControlled, Projectile, ProjectileEmitter, RigidBody, Transform, Vec2,
};
use crate::events::{EventBus, Key, KeyPressedEvent};

use super::PROJECTILES_GROUP;

/// Side of the square collider given to spawned projectiles.
const PROJECTILE_SIZE: f32 = 4.0;

/// Fires projectiles from every entity with a [`Transform`] and a
/// [`ProjectileEmitter`].
#[derive(Debug)]
pub struct ProjectileEmitSystem {
    base: SystemBase,
}

impl ProjectileEmitSystem {
    /// Creates the system and declares its requirements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: SystemBase::new()
                .requiring::<Transform>()
                .requiring::<ProjectileEmitter>(),
        }
    }

    /// Subscribes the fire-key handler for this frame.
    pub fn subscribe_to_events(bus: &mut EventBus<Registry>) {
        bus.subscribe::<Self, KeyPressedEvent>(Self::on_key_pressed);
    }

    /// Runs every cooldown down by `delta_secs` and fires the automatic
    /// emitters that are ready.
    ///
    /// Returns the number of projectiles spawned. Keyboard-controlled
    /// emitters only fire from [`ProjectileEmitSystem::on_key_pressed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not registered.
    pub fn update(registry: &mut Registry, delta_secs: f32) -> EcsResult<usize> {
        let mut spawned = 0;
        for entity in registry.system_entities::<Self>()? {
            let manual = registry.has_component::<KeyboardControlled>(entity);
            let Ok(emitter) = registry.get_component_mut::<ProjectileEmitter>(entity) else {
                continue;
            };
            emitter.cooldown_secs = (emitter.cooldown_secs - delta_secs).max(0.0);
            if manual || !emitter.is_ready() {
                continue;
            }
            emitter.cooldown_secs = emitter.repeat_secs;
            let emitter = *emitter;

            Self::spawn(registry, entity, emitter.velocity, emitter.projectile())?;
            spawned += 1;
        }
        Ok(spawned)
    }

    /// Fires every ready keyboard-controlled emitter when `Space` is pressed.
    ///
    /// The shot travels along the body's current heading: each axis of the
    /// emitter velocity is kept only where the body is moving, with the
    /// body's sign.
    pub fn on_key_pressed(registry: &mut Registry, event: &mut KeyPressedEvent) {
        if event.key != Key::Space {
            return;
        }
        let entities = match registry.system_entities::<Self>() {
            Ok(entities) => entities,
            Err(err) => {
                warn!(error = %err, "fire handler ran without its system");
                return;
            }
        };

        for entity in entities {
            if !registry.has_component::<KeyboardControlled>(entity) {
                continue;
            }
            let heading = registry
                .get_component::<RigidBody>(entity)
                .map_or(Vec2::ZERO, |body| body.velocity);
            let Ok(emitter) = registry.get_component_mut::<ProjectileEmitter>(entity) else {
                continue;
            };
            if !emitter.is_ready() {
                trace!(%entity, cooldown = emitter.cooldown_secs, "fire ignored: cooling down");
                continue;
            }
            emitter.cooldown_secs = emitter.repeat_secs;
            let emitter = *emitter;

            let velocity = Vec2::new(
                emitter.velocity.x * sign(heading.x),
                emitter.velocity.y * sign(heading.y),
            );
            if let Err(err) = Self::spawn(registry, entity, velocity, emitter.projectile()) {
                warn!(%entity, error = %err, "failed to fire projectile");
            }
        }
    }

    /// Creates a projectile at the centre of `shooter`.
    fn spawn(
        registry: &mut Registry,
        shooter: Entity,
        velocity: Vec2,
        projectile: Projectile,
    ) -> EcsResult<Entity> {
        let transform = *registry.get_component::<Transform>(shooter)?;
        let mut origin = transform.position;
        if let Ok(collider) = registry.get_component::<BoxCollider>(shooter) {
            origin.x += transform.scale.x * collider.width / 2.0;
            origin.y += transform.scale.y * collider.height / 2.0;
        }

        let shot = registry.create_entity();
        registry
            .entity_mut(shot)
            .add_component(Transform::at(origin))?
            .add_component(RigidBody::moving(velocity))?
            .add_component(BoxCollider::new(PROJECTILE_SIZE, PROJECTILE_SIZE))?
            .add_component(projectile)?
            .group(PROJECTILES_GROUP);
        debug!(%shooter, %shot, friendly = projectile.is_friendly, "projectile fired");
        Ok(shot)
    }
}

/// -1, 0 or 1 by the sign of `value`; zero stays zero.
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl Default for ProjectileEmitSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProjectileEmitSystem {
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

    fn registry_with_emitter(emitter: ProjectileEmitter) -> (Registry, Entity) {
        let mut registry = Registry::default();
        registry.add_system(ProjectileEmitSystem::new()).unwrap();
        let turret = registry.create_entity();
        registry
            .add_component(turret, Transform::at(Vec2::new(10.0, 10.0)))
            .unwrap();
        registry.add_component(turret, BoxCollider::new(8.0, 8.0)).unwrap();
        registry.add_component(turret, emitter).unwrap();
        registry.update();
        (registry, turret)
    }

    #[test]
    fn test_auto_emitter_respects_cooldown() {
        let (mut registry, _turret) =
            registry_with_emitter(ProjectileEmitter::new(Vec2::new(-50.0, 0.0), 1.0, false));

        assert_eq!(ProjectileEmitSystem::update(&mut registry, 0.25), Ok(1));
        assert_eq!(ProjectileEmitSystem::update(&mut registry, 0.25), Ok(0));
        assert_eq!(ProjectileEmitSystem::update(&mut registry, 0.25), Ok(0));
        assert_eq!(ProjectileEmitSystem::update(&mut registry, 0.25), Ok(0));
        assert_eq!(ProjectileEmitSystem::update(&mut registry, 0.25), Ok(1));

        let shots = registry.entities_by_group(PROJECTILES_GROUP).unwrap();
        assert_eq!(shots.len(), 2);
        let shot = shots[0];
        assert_eq!(
            registry.get_component::<Transform>(shot).unwrap().position,
            Vec2::new(14.0, 14.0)
        );
        assert_eq!(
            registry.get_component::<RigidBody>(shot).unwrap().velocity,
            Vec2::new(-50.0, 0.0)
        );
        assert!(!registry.get_component::<Projectile>(shot).unwrap().is_friendly);
    }

    #[test]
    fn test_space_fires_along_heading() {
        let (mut registry, ship) =
            registry_with_emitter(ProjectileEmitter::new(Vec2::new(100.0, 100.0), 0.5, true));
        registry.add_component(ship, KeyboardControlled::default()).unwrap();
        registry
            .add_component(ship, RigidBody::moving(Vec2::new(0.0, -30.0)))
            .unwrap();

        // Keyboard emitters never fire on their own.
        assert_eq!(ProjectileEmitSystem::update(&mut registry, 1.0), Ok(0));

        let mut bus = EventBus::new();
        ProjectileEmitSystem::subscribe_to_events(&mut bus);
        bus.emit(&mut registry, KeyPressedEvent { key: Key::Left });
        assert!(registry.entities_by_group(PROJECTILES_GROUP).is_err());

        bus.emit(&mut registry, KeyPressedEvent { key: Key::Space });
        bus.emit(&mut registry, KeyPressedEvent { key: Key::Space });
        let shots = registry.entities_by_group(PROJECTILES_GROUP).unwrap();
        assert_eq!(shots.len(), 1);
        assert_eq!(
            registry.get_component::<RigidBody>(shots[0]).unwrap().velocity,
            Vec2::new(0.0, -100.0)
        );
        assert!(registry.is_pending_add(shots[0]));
    }
}
