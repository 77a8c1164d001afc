//! # Entity Component System
//!
//! A registry-centric ECS: entities are ids, components live in per-type
//! sparse-set pools, and systems are matched to entities by signature.
//!
//! ## Design Philosophy
//!
//! - Entity ids are recycled indices with generation counters
//! - Components are stored in dense arrays, compacted on removal
//! - Creation and destruction are deferred to a once-per-frame flush
//! - Systems own no logic here; they only declare requirements

mod component;
mod entity;
mod index;
mod pool;
mod registry;
mod signature;
mod system;

pub use component::{Component, ComponentId, ComponentTypes};
pub use entity::{Entity, EntityMut, EntityRef};
pub use index::{GroupIndex, TagIndex};
pub use pool::{AnyPool, Pool};
pub use registry::{FlushStats, Registry};
pub use signature::{Signature, MAX_COMPONENTS};
pub use system::{System, SystemBase};
