//! Integrates rigid body velocity into transform position.

use keystone_core::{EcsResult, Registry, System, SystemBase};
use tracing::trace;

use crate::components::{RigidBody, Transform};

/// Moves every entity with a [`Transform`] and a [`RigidBody`].
#[derive(Debug)]
pub struct MovementSystem {
    base: SystemBase,
}

impl MovementSystem {
    /// Creates the system and declares its requirements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: SystemBase::new()
                .requiring::<Transform>()
                .requiring::<RigidBody>(),
        }
    }

    /// Advances every matched entity by `velocity * delta_secs`.
    ///
    /// Returns the number of entities moved.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not registered.
    pub fn update(registry: &mut Registry, delta_secs: f32) -> EcsResult<usize> {
        let mut moved = 0;
        for entity in registry.system_entities::<Self>()? {
            let Ok(body) = registry.get_component::<RigidBody>(entity).copied() else {
                continue;
            };
            let Ok(transform) = registry.get_component_mut::<Transform>(entity) else {
                continue;
            };
            transform.position += body.velocity * delta_secs;
            trace!(
                %entity,
                x = transform.position.x,
                y = transform.position.y,
                "entity moved"
            );
            moved += 1;
        }
        Ok(moved)
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
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
    use crate::components::Vec2;

    #[test]
    fn test_moves_by_velocity_times_delta() {
        let mut registry = Registry::default();
        registry.add_system(MovementSystem::new()).unwrap();

        let e = registry.create_entity();
        registry.add_component(e, Transform::at(Vec2::ZERO)).unwrap();
        registry
            .add_component(e, RigidBody::moving(Vec2::new(10.0, 0.0)))
            .unwrap();
        let still = registry.create_entity();
        registry.add_component(still, Transform::at(Vec2::ZERO)).unwrap();
        registry.update();

        assert_eq!(MovementSystem::update(&mut registry, 1.0), Ok(1));
        let position = registry.get_component::<Transform>(e).unwrap().position;
        assert_eq!(position, Vec2::new(10.0, 0.0));

        MovementSystem::update(&mut registry, 0.5).unwrap();
        let position = registry.get_component::<Transform>(e).unwrap().position;
        assert_eq!(position, Vec2::new(15.0, 0.0));
    }
}
