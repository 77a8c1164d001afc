//! # KEYSTONE Core
//!
//! The entity registry at the heart of a KEYSTONE simulation:
//! - Recyclable entity ids with generation-checked handles
//! - Per-type sparse-set component pools
//! - Signature-based system membership
//! - Deferred entity creation and destruction, flushed once per frame
//! - Unique tags and many-member groups
//!
//! ## Example
//!
//! ```rust
//! use keystone_core::{Component, Registry};
//!
//! struct Health(u32);
//! impl Component for Health {}
//!
//! let mut registry = Registry::default();
//! let hero = registry.create_entity();
//! registry.add_component(hero, Health(100))?;
//! registry.tag_entity(hero, "player");
//! registry.update();
//!
//! assert_eq!(registry.entity_by_tag("player")?, hero);
//! # Ok::<(), keystone_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::{MembershipPolicy, RegistryConfig};
pub use ecs::{
    AnyPool, Component, ComponentId, ComponentTypes, Entity, EntityMut, EntityRef, FlushStats,
    GroupIndex, Pool, Registry, Signature, System, SystemBase, TagIndex, MAX_COMPONENTS,
};
pub use error::{EcsError, EcsResult};
