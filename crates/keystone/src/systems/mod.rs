//! # Gameplay Systems
//!
//! Each system declares its requirements in `new()` and exposes its per-frame
//! logic as associated functions over the registry. The registry owns the
//! system instances, so logic borrows the registry rather than `self`.

mod collision;
mod damage;
mod keyboard_control;
mod movement;
mod projectile_emit;
mod projectile_lifecycle;

pub use collision::CollisionSystem;
pub use damage::{DamageSystem, ENEMIES_GROUP, PLAYER_TAG, PROJECTILES_GROUP};
pub use keyboard_control::KeyboardControlSystem;
pub use movement::MovementSystem;
pub use projectile_emit::ProjectileEmitSystem;
pub use projectile_lifecycle::ProjectileLifecycleSystem;
