//! # Tag and Group Indices
//!
//! Identity classifications kept outside the component signature:
//! - a tag names exactly one entity, and an entity has at most one tag
//! - a group holds many entities, and an entity is in at most one group
//!
//! Both directions are stored so lookups are O(1) (O(log n) for group sets).
//! Reassignments always overwrite the previous mapping, last writer wins.

use std::collections::{BTreeSet, HashMap};

use super::entity::Entity;

/// Bijective entity ↔ tag index.
#[derive(Debug, Default)]
pub struct TagIndex {
    entity_by_tag: HashMap<String, Entity>,
    tag_by_entity: HashMap<Entity, String>,
}

impl TagIndex {
    /// Assigns `tag` to `entity`.
    ///
    /// Drops the entity's previous tag and the tag's previous holder. Returns
    /// the entity that lost the tag, if any.
    pub fn assign(&mut self, entity: Entity, tag: String) -> Option<Entity> {
        if self.tag_by_entity.get(&entity) == Some(&tag) {
            return None;
        }
        self.remove_entity(entity);
        let previous = self.entity_by_tag.insert(tag.clone(), entity);
        if let Some(previous) = previous {
            self.tag_by_entity.remove(&previous);
        }
        self.tag_by_entity.insert(entity, tag);
        previous
    }

    /// Whether `entity` carries `tag`.
    #[must_use]
    pub fn has(&self, entity: Entity, tag: &str) -> bool {
        self.entity_by_tag.get(tag) == Some(&entity)
    }

    /// The entity carrying `tag`.
    #[must_use]
    pub fn entity(&self, tag: &str) -> Option<Entity> {
        self.entity_by_tag.get(tag).copied()
    }

    /// The tag of `entity`.
    #[must_use]
    pub fn tag_of(&self, entity: Entity) -> Option<&str> {
        self.tag_by_entity.get(&entity).map(String::as_str)
    }

    /// Drops the tag of `entity`, if any.
    pub fn remove_entity(&mut self, entity: Entity) -> Option<String> {
        let tag = self.tag_by_entity.remove(&entity)?;
        self.entity_by_tag.remove(&tag);
        Some(tag)
    }

    /// Number of tags in use.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_by_tag.len()
    }

    /// Whether no tag is in use.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_by_tag.is_empty()
    }
}

/// Many-to-one entity → group index.
#[derive(Debug, Default)]
pub struct GroupIndex {
    entities_by_group: HashMap<String, BTreeSet<Entity>>,
    group_by_entity: HashMap<Entity, String>,
}

impl GroupIndex {
    /// Places `entity` in `group`, leaving its previous group.
    pub fn assign(&mut self, entity: Entity, group: String) {
        if self.group_by_entity.get(&entity) == Some(&group) {
            return;
        }
        self.remove_entity(entity);
        self.entities_by_group
            .entry(group.clone())
            .or_default()
            .insert(entity);
        self.group_by_entity.insert(entity, group);
    }

    /// Whether `entity` is in `group`.
    #[must_use]
    pub fn contains(&self, entity: Entity, group: &str) -> bool {
        self.group_by_entity
            .get(&entity)
            .is_some_and(|current| current == group)
    }

    /// Members of `group` in id order, or `None` if the group was never used.
    ///
    /// A group whose members have all left stays known and yields an empty set.
    #[must_use]
    pub fn members(&self, group: &str) -> Option<Vec<Entity>> {
        self.entities_by_group
            .get(group)
            .map(|members| members.iter().copied().collect())
    }

    /// The group of `entity`.
    #[must_use]
    pub fn group_of(&self, entity: Entity) -> Option<&str> {
        self.group_by_entity.get(&entity).map(String::as_str)
    }

    /// Takes `entity` out of its group, if any.
    pub fn remove_entity(&mut self, entity: Entity) -> Option<String> {
        let group = self.group_by_entity.remove(&entity)?;
        if let Some(members) = self.entities_by_group.get_mut(&group) {
            members.remove(&entity);
        }
        Some(group)
    }

    /// Number of known groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities_by_group.len()
    }

    /// Whether no group was ever used.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities_by_group.is_empty()
    }
}
