//! # Component Types
//!
//! Components are plain data attached to entities. Each registry numbers the
//! component types it encounters in order of first use; that number is the
//! component's bit in every [`Signature`](super::Signature).
//!
//! Type identity comes from the compiler-generated [`TypeId`], so two
//! distinct types can never share an id while the registry lives.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use super::signature::MAX_COMPONENTS;
use crate::error::{EcsError, EcsResult};

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust
/// use keystone_core::Component;
///
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Health {
///     percent: i32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: 'static {}

/// Small integer id of a component type within one registry.
///
/// Ids are only handed out by [`ComponentTypes`], so an out-of-range id
/// cannot be built from outside the crate:
///
/// ```compile_fail
/// let id = keystone_core::ComponentId::new(40);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u8);

impl ComponentId {
    /// Creates an id from its bit position.
    ///
    /// # Panics
    ///
    /// Panics if `bit` does not fit in a signature.
    #[cfg(test)]
    #[must_use]
    pub(crate) const fn new(bit: u8) -> Self {
        assert!((bit as usize) < MAX_COMPONENTS, "component bit out of range");
        Self(bit)
    }

    /// Bit position in a signature.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        self.0 as u32
    }

    /// Index into per-type tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lazy, monotonic assignment of [`ComponentId`]s.
#[derive(Debug, Default)]
pub struct ComponentTypes {
    ids: HashMap<TypeId, ComponentId>,
    names: Vec<&'static str>,
}

impl ComponentTypes {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `T`, assigning the next free one on first request.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentLimitExceeded`] if `T` would be the
    /// 33rd distinct type.
    pub fn id_of<T: Component>(&mut self) -> EcsResult<ComponentId> {
        self.id_of_raw(TypeId::of::<T>(), type_name::<T>())
    }

    pub(crate) fn id_of_raw(
        &mut self,
        type_id: TypeId,
        name: &'static str,
    ) -> EcsResult<ComponentId> {
        if let Some(&id) = self.ids.get(&type_id) {
            return Ok(id);
        }
        let next = self.names.len();
        if next >= MAX_COMPONENTS {
            return Err(EcsError::ComponentLimitExceeded {
                component: name,
                requested: next + 1,
            });
        }
        // `next` < 32 so the narrowing is lossless.
        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentId(next as u8);
        self.ids.insert(type_id, id);
        self.names.push(name);
        Ok(id)
    }

    /// Returns the id of `T` without assigning one.
    #[must_use]
    pub fn lookup<T: Component>(&self) -> Option<ComponentId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Type name recorded for `id`.
    #[must_use]
    pub fn name(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// Number of distinct types seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no type has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
