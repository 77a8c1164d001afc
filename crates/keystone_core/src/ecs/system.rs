//! # Systems
//!
//! A system declares the component types it requires and keeps the list of
//! entities whose signature is a superset of that requirement. The registry
//! owns one instance per system type and maintains the list; the system's own
//! logic reads it through [`SystemBase::entities`].

use std::any::{type_name, Any, TypeId};

use super::component::{Component, ComponentTypes};
use super::entity::Entity;
use super::signature::Signature;
use crate::error::EcsResult;

/// State shared by every system: requirement and matched entities.
#[derive(Debug, Default)]
pub struct SystemBase {
    /// Required component types, in declaration order.
    required: Vec<(TypeId, &'static str)>,
    /// Resolved requirement, filled in when the system is added to a registry.
    signature: Signature,
    /// Entities currently matched.
    entities: Vec<Entity>,
}

impl SystemBase {
    /// Creates a base with no requirements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that the system needs `T` (`RequireComponent`).
    pub fn require<T: Component>(&mut self) -> &mut Self {
        let key = (TypeId::of::<T>(), type_name::<T>());
        if !self.required.contains(&key) {
            self.required.push(key);
        }
        self
    }

    /// Builder form of [`SystemBase::require`].
    #[must_use]
    pub fn requiring<T: Component>(mut self) -> Self {
        self.require::<T>();
        self
    }

    /// Resolved requirement signature.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Snapshot of the matched entities.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.clone()
    }

    /// Whether `entity` is matched.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Number of matched entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn resolve(&mut self, types: &mut ComponentTypes) -> EcsResult<Signature> {
        let mut signature = Signature::EMPTY;
        for &(type_id, name) in &self.required {
            signature.set(types.id_of_raw(type_id, name)?);
        }
        self.signature = signature;
        Ok(signature)
    }

    /// Adds `entity` unless it is already matched.
    pub(crate) fn add_entity(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    /// Removes `entity`, preserving the order of the rest.
    pub(crate) fn remove_entity(&mut self, entity: Entity) -> bool {
        let before = self.entities.len();
        self.entities.retain(|&other| other != entity);
        self.entities.len() != before
    }
}

/// Behaviour-free contract every system implements.
///
/// # Example
///
/// ```rust
/// use keystone_core::{Component, System, SystemBase};
///
/// struct Transform;
/// impl Component for Transform {}
///
/// struct RenderSystem {
///     base: SystemBase,
/// }
///
/// impl RenderSystem {
///     fn new() -> Self {
///         Self { base: SystemBase::new().requiring::<Transform>() }
///     }
/// }
///
/// impl System for RenderSystem {
///     fn base(&self) -> &SystemBase { &self.base }
///     fn base_mut(&mut self) -> &mut SystemBase { &mut self.base }
/// }
/// ```
pub trait System: 'static {
    /// Shared system state.
    fn base(&self) -> &SystemBase;

    /// Mutable shared system state.
    fn base_mut(&mut self) -> &mut SystemBase;

    /// Snapshot of the matched entities (`GetSystemEntities`).
    fn system_entities(&self) -> Vec<Entity> {
        self.base().entities()
    }
}

/// Object-safe wrapper adding checked downcasts.
pub(crate) trait ErasedSystem {
    fn shared(&self) -> &SystemBase;
    fn shared_mut(&mut self) -> &mut SystemBase;
    fn name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: System> ErasedSystem for S {
    fn shared(&self) -> &SystemBase {
        self.base()
    }

    fn shared_mut(&mut self) -> &mut SystemBase {
        self.base_mut()
    }

    fn name(&self) -> &'static str {
        type_name::<S>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
