//! # Gameplay Components
//!
//! Plain data attached to entities. All of them are `Copy` so systems can
//! read one component while holding a mutable borrow of another.

use std::ops::{Add, AddAssign, Mul};

use keystone_core::Component;

/// 2D vector in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Position, scale and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World position of the top-left corner.
    pub position: Vec2,
    /// Render scale.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl Transform {
    /// Unscaled, unrotated transform at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl Component for Transform {}

/// Linear velocity in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigidBody {
    /// Velocity.
    pub velocity: Vec2,
}

impl RigidBody {
    /// Body moving at `velocity`.
    #[must_use]
    pub const fn moving(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

impl Component for RigidBody {}

/// Axis-aligned collision box, relative to the entity's position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxCollider {
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Offset of the box from the transform position.
    pub offset: Vec2,
}

impl BoxCollider {
    /// Box of `width` x `height` at the transform position.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// Whether this box at `position` overlaps `other` at `other_position`.
    #[must_use]
    pub fn overlaps(&self, position: Vec2, other: &Self, other_position: Vec2) -> bool {
        let a = position + self.offset;
        let b = other_position + other.offset;
        a.x < b.x + other.width
            && a.x + self.width > b.x
            && a.y < b.y + other.height
            && a.y + self.height > b.y
    }
}

impl Component for BoxCollider {}

/// Remaining health, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    /// 100 is full health, 0 or below is dead.
    pub percentage: i32,
}

impl Default for Health {
    fn default() -> Self {
        Self { percentage: 100 }
    }
}

impl Component for Health {}

/// A damaging projectile with a limited lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projectile {
    /// Health percentage removed on hit.
    pub hit_percent_damage: i32,
    /// Lifetime in simulation seconds.
    pub duration_secs: f32,
    /// Friendly projectiles hurt enemies, hostile ones hurt the player.
    pub is_friendly: bool,
    /// Simulation seconds since the projectile was spawned.
    pub age_secs: f32,
}

impl Projectile {
    /// A fresh projectile.
    #[must_use]
    pub const fn new(hit_percent_damage: i32, duration_secs: f32, is_friendly: bool) -> Self {
        Self {
            hit_percent_damage,
            duration_secs,
            is_friendly,
            age_secs: 0.0,
        }
    }

    /// Whether the projectile outlived its duration.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.age_secs > self.duration_secs
    }
}

impl Component for Projectile {}

/// Spawns projectiles from its entity.
///
/// Keyboard-controlled emitters fire on `Space`; every other emitter fires
/// on its own whenever the cooldown runs out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileEmitter {
    /// Velocity given to spawned projectiles.
    pub velocity: Vec2,
    /// Seconds between two emissions.
    pub repeat_secs: f32,
    /// Damage carried by spawned projectiles.
    pub hit_percent_damage: i32,
    /// Lifetime of spawned projectiles, in seconds.
    pub duration_secs: f32,
    /// Whether spawned projectiles are friendly.
    pub is_friendly: bool,
    /// Seconds left before the next emission is allowed.
    pub cooldown_secs: f32,
}

impl ProjectileEmitter {
    /// An emitter ready to fire immediately.
    #[must_use]
    pub const fn new(velocity: Vec2, repeat_secs: f32, is_friendly: bool) -> Self {
        Self {
            velocity,
            repeat_secs,
            hit_percent_damage: 10,
            duration_secs: 10.0,
            is_friendly,
            cooldown_secs: 0.0,
        }
    }

    /// Whether the cooldown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown_secs <= 0.0
    }

    /// The projectile this emitter spawns.
    #[must_use]
    pub const fn projectile(&self) -> Projectile {
        Projectile::new(self.hit_percent_damage, self.duration_secs, self.is_friendly)
    }
}

impl Default for ProjectileEmitter {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0, false)
    }
}

impl Component for ProjectileEmitter {}

/// Steered by the arrow keys.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyboardControlled {
    /// Speed applied along the pressed direction.
    pub speed: f32,
}

impl Default for KeyboardControlled {
    fn default() -> Self {
        Self { speed: 100.0 }
    }
}

impl Component for KeyboardControlled {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let collider = BoxCollider::new(10.0, 10.0);
        let origin = Vec2::ZERO;

        assert!(collider.overlaps(origin, &collider, Vec2::new(5.0, 5.0)));
        assert!(!collider.overlaps(origin, &collider, Vec2::new(10.0, 0.0)));
        assert!(!collider.overlaps(origin, &collider, Vec2::new(0.0, 20.0)));

        let offset = BoxCollider {
            offset: Vec2::new(15.0, 0.0),
            ..BoxCollider::new(10.0, 10.0)
        };
        assert!(offset.overlaps(origin, &collider, Vec2::new(20.0, 0.0)));
    }

    #[test]
    fn test_projectile_expiry() {
        let mut projectile = Projectile::new(10, 1.0, false);
        assert!(!projectile.is_expired());
        projectile.age_secs = 1.0;
        assert!(!projectile.is_expired());
        projectile.age_secs = 1.5;
        assert!(projectile.is_expired());
    }
}
