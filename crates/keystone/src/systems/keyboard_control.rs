//! Arrow-key steering.

use keystone_core::{Registry, System, SystemBase};
use tracing::{debug, warn};

use crate::components::{KeyboardControlled, RigidBody, Vec2};
use crate::events::{EventBus, Key, KeyPressedEvent};

/// Sets the velocity of keyboard-controlled bodies from arrow keys.
#[derive(Debug)]
pub struct KeyboardControlSystem {
    base: SystemBase,
}

impl KeyboardControlSystem {
    /// Creates the system and declares its requirements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: SystemBase::new()
                .requiring::<KeyboardControlled>()
                .requiring::<RigidBody>(),
        }
    }

    /// Subscribes the key handler for this frame.
    pub fn subscribe_to_events(bus: &mut EventBus<Registry>) {
        bus.subscribe::<Self, KeyPressedEvent>(Self::on_key_pressed);
    }

    /// Unit direction of an arrow key.
    #[must_use]
    pub fn direction(key: Key) -> Option<Vec2> {
        match key {
            Key::Up => Some(Vec2::new(0.0, -1.0)),
            Key::Right => Some(Vec2::new(1.0, 0.0)),
            Key::Down => Some(Vec2::new(0.0, 1.0)),
            Key::Left => Some(Vec2::new(-1.0, 0.0)),
            Key::Space | Key::Char(_) => None,
        }
    }

    /// Points every controlled body along the pressed arrow.
    pub fn on_key_pressed(registry: &mut Registry, event: &mut KeyPressedEvent) {
        debug!(key = ?event.key, "key pressed");
        let Some(direction) = Self::direction(event.key) else {
            return;
        };
        let entities = match registry.system_entities::<Self>() {
            Ok(entities) => entities,
            Err(err) => {
                warn!(error = %err, "key handler ran without its system");
                return;
            }
        };

        for entity in entities {
            let Ok(control) = registry.get_component::<KeyboardControlled>(entity).copied() else {
                continue;
            };
            if let Ok(body) = registry.get_component_mut::<RigidBody>(entity) {
                body.velocity = direction * control.speed;
            }
        }
    }
}

impl Default for KeyboardControlSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for KeyboardControlSystem {
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
    fn test_arrow_sets_velocity() {
        let mut registry = Registry::default();
        registry.add_system(KeyboardControlSystem::new()).unwrap();
        let ship = registry.create_entity();
        registry
            .add_component(ship, KeyboardControlled { speed: 50.0 })
            .unwrap();
        registry.add_component(ship, RigidBody::default()).unwrap();
        registry.update();

        let mut bus = EventBus::new();
        KeyboardControlSystem::subscribe_to_events(&mut bus);

        bus.emit(&mut registry, KeyPressedEvent { key: Key::Left });
        let velocity = registry.get_component::<RigidBody>(ship).unwrap().velocity;
        assert_eq!(velocity, Vec2::new(-50.0, 0.0));

        bus.emit(&mut registry, KeyPressedEvent { key: Key::Char('q') });
        let velocity = registry.get_component::<RigidBody>(ship).unwrap().velocity;
        assert_eq!(velocity, Vec2::new(-50.0, 0.0));
    }
}
