//! Ages projectiles and kills the expired ones.

use keystone_core::{EcsResult, Registry, System, SystemBase};
use tracing::trace;

use crate::components::Projectile;

/// Kills projectiles older than their duration.
#[derive(Debug)]
pub struct ProjectileLifecycleSystem {
    base: SystemBase,
}

impl ProjectileLifecycleSystem {
    /// Creates the system and declares its requirements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: SystemBase::new().requiring::<Projectile>(),
        }
    }

    /// Adds `delta_secs` to every projectile's age and queues expired ones
    /// for the next flush.
    ///
    /// Returns the number of projectiles queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not registered.
    pub fn update(registry: &mut Registry, delta_secs: f32) -> EcsResult<usize> {
        let mut expired = 0;
        for entity in registry.system_entities::<Self>()? {
            let Ok(projectile) = registry.get_component_mut::<Projectile>(entity) else {
                continue;
            };
            projectile.age_secs += delta_secs;
            if projectile.is_expired() {
                trace!(%entity, "projectile expired");
                registry.kill_entity(entity);
                expired += 1;
            }
        }
        Ok(expired)
    }
}

impl Default for ProjectileLifecycleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProjectileLifecycleSystem {
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

    #[test]
    fn test_expires_after_duration() {
        let mut registry = Registry::default();
        registry.add_system(ProjectileLifecycleSystem::new()).unwrap();
        let bullet = registry.create_entity();
        registry
            .add_component(bullet, Projectile::new(10, 1.0, true))
            .unwrap();
        registry.update();

        assert_eq!(ProjectileLifecycleSystem::update(&mut registry, 0.6), Ok(0));
        assert_eq!(ProjectileLifecycleSystem::update(&mut registry, 0.6), Ok(1));
        registry.update();
        assert!(!registry.is_alive(bullet));
        assert!(registry.system_entities::<ProjectileLifecycleSystem>().unwrap().is_empty());
    }
}
