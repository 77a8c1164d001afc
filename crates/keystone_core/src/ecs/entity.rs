//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index (the recyclable id) into per-entity arrays and pool sparse maps
//! - A generation counter for detecting handles to recycled slots
//!
//! All mutation goes through the [`Registry`]. [`EntityRef`] and [`EntityMut`]
//! pair a handle with a borrowed registry so call sites can read
//! `registry.entity_mut(e).add_component(..)` without the handle itself
//! holding a back-pointer.

use std::cmp::Ordering;
use std::fmt;

use super::component::Component;
use super::registry::Registry;
use super::signature::Signature;
use crate::error::EcsResult;

/// Handle to an entity.
///
/// The handle is `Copy` and carries no behavior. Equality and ordering
/// compare the index first and the generation second, so ordered collections
/// of handles iterate in id order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Creates a handle from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the recyclable id of this entity.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.index
    }

    /// Returns the id as an array index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the generation of the slot when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then(self.generation.cmp(&other.generation))
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({self})")
    }
}

/// Per-slot bookkeeping kept by the registry.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EntityRecord {
    /// Generation of the handle currently (or last) issued for this slot.
    pub generation: u32,
    /// Whether the slot holds a live entity.
    pub alive: bool,
    /// Whether the entity has gone through a flush and been matched to systems.
    pub admitted: bool,
    /// Components currently attached.
    pub signature: Signature,
}

impl EntityRecord {
    /// Whether `entity` is the live occupant of this slot.
    #[inline]
    pub fn holds(&self, entity: Entity) -> bool {
        self.alive && self.generation == entity.generation
    }
}

/// Read-only view of an entity bound to its registry.
#[derive(Clone, Copy)]
pub struct EntityRef<'r> {
    registry: &'r Registry,
    entity: Entity,
}

impl<'r> EntityRef<'r> {
    pub(crate) fn new(registry: &'r Registry, entity: Entity) -> Self {
        Self { registry, entity }
    }

    /// The underlying handle.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns the recyclable id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.entity.id()
    }

    /// Whether the entity carries a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.entity)
    }

    /// Borrows the entity's `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or the component is absent.
    pub fn get_component<T: Component>(&self) -> EcsResult<&'r T> {
        self.registry.get_component::<T>(self.entity)
    }

    /// Whether the entity carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.registry.has_tag(self.entity, tag)
    }

    /// Whether the entity belongs to `group`.
    #[must_use]
    pub fn belongs_to_group(&self, group: &str) -> bool {
        self.registry.belongs_to_group(self.entity, group)
    }
}

/// Mutable view of an entity bound to its registry.
pub struct EntityMut<'r> {
    registry: &'r mut Registry,
    entity: Entity,
}

impl<'r> EntityMut<'r> {
    pub(crate) fn new(registry: &'r mut Registry, entity: Entity) -> Self {
        Self { registry, entity }
    }

    /// The underlying handle.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns the recyclable id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.entity.id()
    }

    /// Attaches (or overwrites) a component.
    ///
    /// # Errors
    ///
    /// See [`Registry::add_component`].
    pub fn add_component<T: Component>(&mut self, component: T) -> EcsResult<&mut Self> {
        self.registry.add_component(self.entity, component)?;
        Ok(self)
    }

    /// Detaches a component. No-op if absent.
    pub fn remove_component<T: Component>(&mut self) -> &mut Self {
        self.registry.remove_component::<T>(self.entity);
        self
    }

    /// Whether the entity carries a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.entity)
    }

    /// Borrows the entity's `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or the component is absent.
    pub fn get_component<T: Component>(&self) -> EcsResult<&T> {
        self.registry.get_component::<T>(self.entity)
    }

    /// Mutably borrows the entity's `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or the component is absent.
    pub fn get_component_mut<T: Component>(&mut self) -> EcsResult<&mut T> {
        self.registry.get_component_mut::<T>(self.entity)
    }

    /// Queues the entity for destruction at the next flush.
    pub fn kill(&mut self) {
        self.registry.kill_entity(self.entity);
    }

    /// Assigns `tag` to the entity.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.registry.tag_entity(self.entity, tag);
        self
    }

    /// Whether the entity carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.registry.has_tag(self.entity, tag)
    }

    /// Places the entity in `group`.
    pub fn group(&mut self, group: impl Into<String>) -> &mut Self {
        self.registry.group_entity(self.entity, group);
        self
    }

    /// Whether the entity belongs to `group`.
    #[must_use]
    pub fn belongs_to_group(&self, group: &str) -> bool {
        self.registry.belongs_to_group(self.entity, group)
    }
}
