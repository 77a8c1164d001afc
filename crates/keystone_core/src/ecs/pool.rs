//! # Component Pools
//!
//! Dense, swap-removal-compacted storage for one component type, addressed
//! indirectly by entity id through a sparse set:
//!
//! ```text
//! entity_to_dense: [None, Some(1), None, Some(0)]   <- indexed by entity id
//! dense:           [C3, C1]                         <- contiguous values
//! dense_to_entity: [3, 1]                           <- owner of each slot
//! ```
//!
//! - Insert/overwrite/remove/lookup are O(1) (amortized for growth)
//! - Removal swaps the last live value into the hole, so `dense` never has gaps
//! - Iteration order is not stable across removals

use std::any::{type_name, Any};

use super::component::Component;

/// Sparse-set storage for a single component type.
///
/// # Example
///
/// ```rust
/// use keystone_core::{Component, Pool};
///
/// struct Health(i32);
/// impl Component for Health {}
///
/// let mut pool: Pool<Health> = Pool::new();
/// pool.set(7, Health(100));
/// assert_eq!(pool.get(7).map(|h| h.0), Some(100));
/// pool.remove(7);
/// assert!(pool.is_empty());
/// ```
pub struct Pool<T> {
    /// Live component values, packed.
    dense: Vec<T>,
    /// Entity id owning each dense slot.
    dense_to_entity: Vec<u32>,
    /// Dense slot of each entity id, if it holds a value.
    entity_to_dense: Vec<Option<u32>>,
}

impl<T> Pool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            dense_to_entity: Vec::new(),
            entity_to_dense: Vec::new(),
        }
    }

    /// Creates an empty pool with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            dense_to_entity: Vec::with_capacity(capacity),
            entity_to_dense: Vec::with_capacity(capacity),
        }
    }

    /// Number of live values (`GetSize`).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether the pool holds no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    #[inline]
    fn slot_of(&self, entity_id: u32) -> Option<usize> {
        self.entity_to_dense
            .get(entity_id as usize)
            .copied()
            .flatten()
            .map(|slot| slot as usize)
    }

    /// Whether `entity_id` holds a value.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity_id: u32) -> bool {
        self.slot_of(entity_id).is_some()
    }

    /// Stores `value` for `entity_id`, overwriting in place if present.
    pub fn set(&mut self, entity_id: u32, value: T) {
        if let Some(slot) = self.slot_of(entity_id) {
            self.dense[slot] = value;
            return;
        }

        let index = entity_id as usize;
        if index >= self.entity_to_dense.len() {
            self.entity_to_dense.resize(index + 1, None);
        }
        // Dense length never exceeds the number of distinct u32 ids.
        #[allow(clippy::cast_possible_truncation)]
        let slot = self.dense.len() as u32;
        self.dense.push(value);
        self.dense_to_entity.push(entity_id);
        self.entity_to_dense[index] = Some(slot);
    }

    /// Removes and returns the value of `entity_id`. No-op if absent.
    pub fn remove(&mut self, entity_id: u32) -> Option<T> {
        let raw_slot = self.entity_to_dense.get(entity_id as usize).copied().flatten()?;
        let slot = raw_slot as usize;
        let last = self.dense.len() - 1;

        if slot != last {
            let moved = self.dense_to_entity[last];
            self.entity_to_dense[moved as usize] = Some(raw_slot);
        }
        self.entity_to_dense[entity_id as usize] = None;
        self.dense_to_entity.swap_remove(slot);
        Some(self.dense.swap_remove(slot))
    }

    /// Borrows the value of `entity_id`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity_id: u32) -> Option<&T> {
        let slot = self.slot_of(entity_id)?;
        self.dense.get(slot)
    }

    /// Mutably borrows the value of `entity_id`.
    #[inline]
    pub fn get_mut(&mut self, entity_id: u32) -> Option<&mut T> {
        let slot = self.slot_of(entity_id)?;
        self.dense.get_mut(slot)
    }

    /// Packed values, in dense order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    /// Iterates `(entity_id, value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.dense_to_entity.iter().copied().zip(self.dense.iter())
    }

    /// Iterates `(entity_id, value)` pairs mutably in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.dense_to_entity
            .iter()
            .copied()
            .zip(self.dense.iter_mut())
    }

    /// Drops every value.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.dense_to_entity.clear();
        self.entity_to_dense.clear();
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a pool.
///
/// The registry keeps every pool behind this trait. It only exposes lifecycle
/// operations; typed access goes through [`AnyPool::as_any`] and a checked
/// downcast to the concrete [`Pool`].
pub trait AnyPool {
    /// Drops the value of `entity_id`, if any.
    fn remove_entity(&mut self, entity_id: u32);

    /// Whether `entity_id` holds a value.
    fn contains_entity(&self, entity_id: u32) -> bool;

    /// Number of live values.
    fn len(&self) -> usize;

    /// Whether the pool holds no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type name of the stored component.
    fn component_name(&self) -> &'static str;

    /// Upcast for checked downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for checked downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyPool for Pool<T> {
    fn remove_entity(&mut self, entity_id: u32) {
        self.remove(entity_id);
    }

    fn contains_entity(&self, entity_id: u32) -> bool {
        self.contains(entity_id)
    }

    fn len(&self) -> usize {
        Pool::len(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
