//! AABB overlap detection.

use keystone_core::{EcsResult, Entity, Registry, System, SystemBase};
use tracing::debug;

use crate::components::{BoxCollider, Transform};
use crate::events::{CollisionEvent, EventBus};

/// Emits a [`CollisionEvent`] for every overlapping pair of colliders.
#[derive(Debug)]
pub struct CollisionSystem {
    base: SystemBase,
}

impl CollisionSystem {
    /// Creates the system and declares its requirements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: SystemBase::new()
                .requiring::<Transform>()
                .requiring::<BoxCollider>(),
        }
    }

    /// Overlapping pairs, each reported once, in system list order.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not registered.
    pub fn detect(registry: &Registry) -> EcsResult<Vec<(Entity, Entity)>> {
        let bodies: Vec<(Entity, Transform, BoxCollider)> = registry
            .system_entities::<Self>()?
            .into_iter()
            .filter_map(|entity| {
                let transform = *registry.get_component::<Transform>(entity).ok()?;
                let collider = *registry.get_component::<BoxCollider>(entity).ok()?;
                Some((entity, transform, collider))
            })
            .collect();

        let mut pairs = Vec::new();
        for (i, (a, a_transform, a_collider)) in bodies.iter().enumerate() {
            for (b, b_transform, b_collider) in &bodies[i + 1..] {
                if a_collider.overlaps(a_transform.position, b_collider, b_transform.position) {
                    pairs.push((*a, *b));
                }
            }
        }
        Ok(pairs)
    }

    /// Detects collisions and emits one event per pair.
    ///
    /// Returns the number of collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not registered.
    pub fn update(registry: &mut Registry, bus: &mut EventBus<Registry>) -> EcsResult<usize> {
        let pairs = Self::detect(registry)?;
        for &(a, b) in &pairs {
            debug!(%a, %b, "collision");
            bus.emit(registry, CollisionEvent { a, b });
        }
        Ok(pairs.len())
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CollisionSystem {
    fn base(&self) -> &SystemBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SystemBase {
        &mut self.base
    }
}
