//! # Entity Registry
//!
//! The single owner of every entity record, component pool, system and
//! identity index.
//!
//! ## Frame contract
//!
//! ```text
//! create_entity ──► to_be_added ──┐
//!                                 ├── update() ──► system membership
//! kill_entity   ──► to_be_killed ─┘                + id recycled
//! ```
//!
//! Creation and destruction are deferred to [`Registry::update`], so code that
//! runs between two flushes always sees one consistent set of entities. A
//! killed entity keeps its components, tags and system memberships until the
//! flush that destroys it.

use std::any::{type_name, TypeId};
use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, trace, warn, Span};

use super::component::{Component, ComponentId, ComponentTypes};
use super::entity::{Entity, EntityMut, EntityRecord, EntityRef};
use super::index::{GroupIndex, TagIndex};
use super::pool::{AnyPool, Pool};
use super::signature::Signature;
use super::system::{ErasedSystem, System};
use crate::config::{MembershipPolicy, RegistryConfig};
use crate::error::{EcsError, EcsResult};

/// What one flush did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Entities admitted to system matching.
    pub added: usize,
    /// Entities destroyed and recycled.
    pub killed: usize,
}

/// The ECS registry.
///
/// # Example
///
/// ```rust
/// use keystone_core::{Component, Registry, System, SystemBase};
///
/// struct Position(f32);
/// impl Component for Position {}
///
/// struct Drift {
///     base: SystemBase,
/// }
///
/// impl System for Drift {
///     fn base(&self) -> &SystemBase { &self.base }
///     fn base_mut(&mut self) -> &mut SystemBase { &mut self.base }
/// }
///
/// let mut registry = Registry::default();
/// registry.add_system(Drift { base: SystemBase::new().requiring::<Position>() })?;
///
/// let entity = registry.create_entity();
/// registry.add_component(entity, Position(0.0))?;
/// registry.update();
///
/// assert_eq!(registry.system_entities::<Drift>()?, vec![entity]);
/// # Ok::<(), keystone_core::EcsError>(())
/// ```
pub struct Registry {
    config: RegistryConfig,
    /// Per-id bookkeeping, indexed by entity id.
    records: Vec<EntityRecord>,
    /// Recycled ids, reused oldest first.
    free_ids: VecDeque<u32>,
    /// Live entity count, pending kills included.
    live_count: usize,
    component_types: ComponentTypes,
    /// Pools indexed by component id, created on first use.
    pools: Vec<Option<Box<dyn AnyPool>>>,
    /// Systems in registration order.
    systems: Vec<(TypeId, Box<dyn ErasedSystem>)>,
    tags: TagIndex,
    groups: GroupIndex,
    to_be_added: BTreeSet<Entity>,
    to_be_killed: BTreeSet<Entity>,
    span: Span,
}

impl Registry {
    /// Creates a registry that logs under a fresh `registry` span.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_span(config, tracing::debug_span!("registry"))
    }

    /// Creates a registry that logs every event under `span`.
    #[must_use]
    pub fn with_span(config: RegistryConfig, span: Span) -> Self {
        debug!(parent: &span, membership = ?config.membership, "registry created");
        Self {
            records: Vec::with_capacity(config.entity_capacity),
            free_ids: VecDeque::new(),
            live_count: 0,
            component_types: ComponentTypes::new(),
            pools: Vec::new(),
            systems: Vec::new(),
            tags: TagIndex::default(),
            groups: GroupIndex::default(),
            to_be_added: BTreeSet::new(),
            to_be_killed: BTreeSet::new(),
            config,
            span,
        }
    }

    /// The configuration this registry was built with.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Component id table.
    #[must_use]
    pub fn component_types(&self) -> &ComponentTypes {
        &self.component_types
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates an entity, reusing the oldest recycled id when one exists.
    ///
    /// The entity can receive components right away; it joins systems at the
    /// next [`Registry::update`].
    pub fn create_entity(&mut self) -> Entity {
        let index = match self.free_ids.pop_front() {
            Some(index) => index,
            None => {
                // Id-space exhaustion is not handled.
                #[allow(clippy::cast_possible_truncation)]
                let index = self.records.len() as u32;
                self.records.push(EntityRecord::default());
                index
            }
        };

        let record = &mut self.records[index as usize];
        record.alive = true;
        record.admitted = false;
        record.signature.clear();
        let entity = Entity::new(index, record.generation);

        self.to_be_added.insert(entity);
        self.live_count += 1;
        debug!(parent: &self.span, %entity, "entity created");
        entity
    }

    /// Queues `entity` for destruction at the next flush.
    ///
    /// Killing twice in one frame is the same as killing once. Stale handles
    /// are ignored.
    pub fn kill_entity(&mut self, entity: Entity) {
        if !self.is_alive(entity) {
            warn!(parent: &self.span, %entity, "kill ignored: stale entity handle");
            return;
        }
        if self.to_be_killed.insert(entity) {
            debug!(parent: &self.span, %entity, "entity queued for kill");
        }
    }

    /// Whether `entity` is the live occupant of its id.
    ///
    /// Entities awaiting a kill are still alive until the flush.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.records
            .get(entity.index())
            .is_some_and(|record| record.holds(entity))
    }

    /// Whether `entity` will be destroyed at the next flush.
    #[must_use]
    pub fn is_pending_kill(&self, entity: Entity) -> bool {
        self.to_be_killed.contains(&entity)
    }

    /// Whether `entity` is waiting for its first flush.
    #[must_use]
    pub fn is_pending_add(&self, entity: Entity) -> bool {
        self.to_be_added.contains(&entity)
    }

    /// Number of live entities, pending kills included.
    #[must_use]
    pub fn live_entity_count(&self) -> usize {
        self.live_count
    }

    /// `(pending additions, pending kills)`.
    #[must_use]
    pub fn pending_counts(&self) -> (usize, usize) {
        (self.to_be_added.len(), self.to_be_killed.len())
    }

    /// Current component signature of `entity`.
    #[must_use]
    pub fn signature_of(&self, entity: Entity) -> Option<Signature> {
        self.record(entity).map(|record| record.signature)
    }

    /// Read-only view bound to this registry.
    #[must_use]
    pub fn entity(&self, entity: Entity) -> EntityRef<'_> {
        EntityRef::new(self, entity)
    }

    /// Mutable view bound to this registry.
    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_> {
        EntityMut::new(self, entity)
    }

    /// Flushes deferred creations and destructions.
    ///
    /// 1. Every pending entity is matched against every system.
    /// 2. Every pending kill leaves all systems, pools and indices, and its id
    ///    goes back to the free list.
    ///
    /// Calling it with nothing pending does nothing.
    pub fn update(&mut self) -> FlushStats {
        let mut stats = FlushStats::default();

        let added = std::mem::take(&mut self.to_be_added);
        for entity in added {
            if self.is_alive(entity) {
                self.admit(entity);
                stats.added += 1;
            }
        }

        let killed = std::mem::take(&mut self.to_be_killed);
        for entity in killed {
            if self.is_alive(entity) {
                self.destroy(entity);
                stats.killed += 1;
            }
        }

        if stats != FlushStats::default() {
            debug!(
                parent: &self.span,
                added = stats.added,
                killed = stats.killed,
                live = self.live_count,
                "registry flushed"
            );
        }
        stats
    }

    fn admit(&mut self, entity: Entity) {
        let record = &mut self.records[entity.index()];
        record.admitted = true;
        let signature = record.signature;

        for (_, system) in &mut self.systems {
            let base = system.shared_mut();
            if signature.contains_all(base.signature()) {
                base.add_entity(entity);
            }
        }
    }

    fn destroy(&mut self, entity: Entity) {
        for (_, system) in &mut self.systems {
            system.shared_mut().remove_entity(entity);
        }
        for pool in self.pools.iter_mut().flatten() {
            pool.remove_entity(entity.id());
        }
        self.tags.remove_entity(entity);
        self.groups.remove_entity(entity);

        let record = &mut self.records[entity.index()];
        record.signature.clear();
        record.alive = false;
        record.admitted = false;
        record.generation = record.generation.wrapping_add(1);

        self.free_ids.push_back(entity.id());
        self.live_count -= 1;
        debug!(parent: &self.span, %entity, "entity destroyed");
    }

    fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        self.records
            .get(entity.index())
            .filter(|record| record.holds(entity))
    }

    fn check_alive(&self, entity: Entity) -> EcsResult<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::StaleEntity(entity))
        }
    }

    /// Re-runs the subset test for an admitted entity against every system.
    fn refresh_membership(&mut self, entity: Entity) {
        let record = self.records[entity.index()];
        if !record.admitted || self.config.membership != MembershipPolicy::Reevaluate {
            return;
        }
        for (_, system) in &mut self.systems {
            let base = system.shared_mut();
            if record.signature.contains_all(base.signature()) {
                base.add_entity(entity);
            } else {
                base.remove_entity(entity);
            }
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `component` to `entity`, overwriting any previous `T`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if the handle is not live
    /// - [`EcsError::ComponentLimitExceeded`] if `T` is one type too many
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> EcsResult<()> {
        self.check_alive(entity)?;
        let id = self.component_types.id_of::<T>()?;
        self.pool_or_insert::<T>(id)?.set(entity.id(), component);

        let record = &mut self.records[entity.index()];
        let was_present = record.signature.test(id);
        record.signature.set(id);
        trace!(parent: &self.span, %entity, component = id.index(), "component added");

        if !was_present {
            self.refresh_membership(entity);
        }
        Ok(())
    }

    /// Detaches `T` from `entity` and evicts its value. No-op if absent or
    /// if the handle is stale.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        if !self.is_alive(entity) {
            return;
        }
        let Some(id) = self.component_types.lookup::<T>() else {
            return;
        };
        if let Some(Some(pool)) = self.pools.get_mut(id.index()) {
            pool.remove_entity(entity.id());
        }

        let record = &mut self.records[entity.index()];
        if !record.signature.test(id) {
            return;
        }
        record.signature.reset(id);
        trace!(parent: &self.span, %entity, component = id.index(), "component removed");
        self.refresh_membership(entity);
    }

    /// Whether `entity` carries a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        match (self.record(entity), self.component_types.lookup::<T>()) {
            (Some(record), Some(id)) => record.signature.test(id),
            _ => false,
        }
    }

    /// Borrows the `T` of `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if the handle is not live
    /// - [`EcsError::MissingComponent`] if the entity has no `T`
    pub fn get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.check_alive(entity)?;
        self.pool::<T>()
            .and_then(|pool| pool.get(entity.id()))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Mutably borrows the `T` of `entity`.
    ///
    /// The reference must not outlive the caller's current update: a later
    /// removal may move the value.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if the handle is not live
    /// - [`EcsError::MissingComponent`] if the entity has no `T`
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.check_alive(entity)?;
        self.pool_mut::<T>()
            .and_then(|pool| pool.get_mut(entity.id()))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// The pool of `T`, if any entity ever received one.
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&Pool<T>> {
        let id = self.component_types.lookup::<T>()?;
        self.pools
            .get(id.index())?
            .as_ref()?
            .as_any()
            .downcast_ref::<Pool<T>>()
    }

    fn pool_mut<T: Component>(&mut self) -> Option<&mut Pool<T>> {
        let id = self.component_types.lookup::<T>()?;
        self.pools
            .get_mut(id.index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<Pool<T>>()
    }

    fn pool_or_insert<T: Component>(&mut self, id: ComponentId) -> EcsResult<&mut Pool<T>> {
        if self.pools.len() <= id.index() {
            self.pools.resize_with(id.index() + 1, || None);
        }
        let capacity = self.config.pool_capacity;
        self.pools[id.index()]
            .get_or_insert_with(|| Box::new(Pool::<T>::with_capacity(capacity)))
            .as_any_mut()
            .downcast_mut::<Pool<T>>()
            .ok_or(EcsError::PoolTypeMismatch(type_name::<T>()))
    }

    /// Number of entities holding a `T`.
    #[must_use]
    pub fn component_count<T: Component>(&self) -> usize {
        self.pool::<T>().map_or(0, Pool::len)
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers `system`, resolving its required components to a signature.
    ///
    /// Under [`MembershipPolicy::Reevaluate`] every already admitted entity is
    /// matched against the new system immediately.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemAlreadyRegistered`] if an `S` is already present
    /// - [`EcsError::ComponentLimitExceeded`] if a requirement is one type too many
    pub fn add_system<S: System>(&mut self, mut system: S) -> EcsResult<()> {
        if self.has_system::<S>() {
            return Err(EcsError::SystemAlreadyRegistered(type_name::<S>()));
        }
        let required = system.base_mut().resolve(&mut self.component_types)?;

        if self.config.membership == MembershipPolicy::Reevaluate {
            let base = system.base_mut();
            for (index, record) in self.records.iter().enumerate() {
                if record.alive && record.admitted && record.signature.contains_all(required) {
                    #[allow(clippy::cast_possible_truncation)]
                    base.add_entity(Entity::new(index as u32, record.generation));
                }
            }
        }

        debug!(
            parent: &self.span,
            system = type_name::<S>(),
            required = required.len(),
            matched = system.base().len(),
            "system added"
        );
        self.systems.push((TypeId::of::<S>(), Box::new(system)));
        Ok(())
    }

    fn system_slot(&self, type_id: TypeId) -> Option<usize> {
        self.systems.iter().position(|(id, _)| *id == type_id)
    }

    /// Whether an `S` is registered.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.system_slot(TypeId::of::<S>()).is_some()
    }

    /// Borrows the registered `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotRegistered`] if no `S` was added.
    pub fn get_system<S: System>(&self) -> EcsResult<&S> {
        self.system_slot(TypeId::of::<S>())
            .and_then(|slot| self.systems[slot].1.as_any().downcast_ref::<S>())
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))
    }

    /// Mutably borrows the registered `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotRegistered`] if no `S` was added.
    pub fn get_system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        match self.system_slot(TypeId::of::<S>()) {
            Some(slot) => self.systems[slot]
                .1
                .as_any_mut()
                .downcast_mut::<S>()
                .ok_or(EcsError::SystemNotRegistered(type_name::<S>())),
            None => Err(EcsError::SystemNotRegistered(type_name::<S>())),
        }
    }

    /// Snapshot of the entities matched by `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotRegistered`] if no `S` was added.
    pub fn system_entities<S: System>(&self) -> EcsResult<Vec<Entity>> {
        self.get_system::<S>().map(System::system_entities)
    }

    /// Unregisters `S`. Returns whether it was present.
    pub fn remove_system<S: System>(&mut self) -> bool {
        let Some(slot) = self.system_slot(TypeId::of::<S>()) else {
            return false;
        };
        let (_, system) = self.systems.remove(slot);
        debug!(parent: &self.span, system = system.name(), "system removed");
        true
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // =========================================================================
    // Tags & groups
    // =========================================================================

    /// Tags `entity`. The tag leaves its previous holder and the entity
    /// drops its previous tag. Stale handles are ignored.
    pub fn tag_entity(&mut self, entity: Entity, tag: impl Into<String>) {
        if !self.is_alive(entity) {
            warn!(parent: &self.span, %entity, "tag ignored: stale entity handle");
            return;
        }
        let tag = tag.into();
        trace!(parent: &self.span, %entity, tag = %tag, "entity tagged");
        if let Some(previous) = self.tags.assign(entity, tag) {
            debug!(parent: &self.span, %entity, %previous, "tag reassigned");
        }
    }

    /// Whether `entity` carries `tag`.
    #[must_use]
    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.tags.has(entity, tag)
    }

    /// The entity carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TagNotFound`] if no entity carries it.
    pub fn entity_by_tag(&self, tag: &str) -> EcsResult<Entity> {
        self.tags
            .entity(tag)
            .ok_or_else(|| EcsError::TagNotFound(tag.to_owned()))
    }

    /// The tag of `entity`, if any.
    #[must_use]
    pub fn tag_of(&self, entity: Entity) -> Option<&str> {
        self.tags.tag_of(entity)
    }

    /// Drops the tag of `entity`. No-op if untagged.
    pub fn remove_tag(&mut self, entity: Entity) {
        self.tags.remove_entity(entity);
    }

    /// Places `entity` in `group`, leaving its previous group. Stale handles
    /// are ignored.
    pub fn group_entity(&mut self, entity: Entity, group: impl Into<String>) {
        if !self.is_alive(entity) {
            warn!(parent: &self.span, %entity, "group ignored: stale entity handle");
            return;
        }
        let group = group.into();
        trace!(parent: &self.span, %entity, group = %group, "entity grouped");
        self.groups.assign(entity, group);
    }

    /// Whether `entity` is in `group`.
    #[must_use]
    pub fn belongs_to_group(&self, entity: Entity, group: &str) -> bool {
        self.groups.contains(entity, group)
    }

    /// Snapshot of the members of `group`, in id order.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::GroupNotFound`] if no entity was ever placed in it.
    pub fn entities_by_group(&self, group: &str) -> EcsResult<Vec<Entity>> {
        self.groups
            .members(group)
            .ok_or_else(|| EcsError::GroupNotFound(group.to_owned()))
    }

    /// The group of `entity`, if any.
    #[must_use]
    pub fn group_of(&self, entity: Entity) -> Option<&str> {
        self.groups.group_of(entity)
    }

    /// Takes `entity` out of its group. No-op if ungrouped.
    pub fn remove_group(&mut self, entity: Entity) {
        self.groups.remove_entity(entity);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
