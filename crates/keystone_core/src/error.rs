//! # Registry Error Types
//!
//! Configuration errors and caller-contract violations raised by the registry.
//! Defensive operations (removing something that is not there) never produce
//! an error; they are silent no-ops.

use thiserror::Error;

use crate::ecs::{Entity, MAX_COMPONENTS};

/// Errors that can occur in the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// More distinct component types were used than a signature can hold.
    #[error("component limit exceeded: {component} would be type #{requested}, signatures hold {MAX_COMPONENTS}")]
    ComponentLimitExceeded {
        /// Type name of the component that did not fit.
        component: &'static str,
        /// The (one-based) count of distinct types that was requested.
        requested: usize,
    },

    /// The handle refers to a destroyed or recycled entity slot.
    #[error("stale entity handle: {0}")]
    StaleEntity(Entity),

    /// The entity does not hold the requested component.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// The entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// No system of this type was added to the registry.
    #[error("system not registered: {0}")]
    SystemNotRegistered(&'static str),

    /// A system of this type is already registered.
    #[error("system already registered: {0}")]
    SystemAlreadyRegistered(&'static str),

    /// No entity currently carries this tag.
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// No entity was ever assigned to this group.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// A component id resolved to a pool of another type.
    #[error("pool type mismatch for {0}")]
    PoolTypeMismatch(&'static str),
}

/// Result type for registry operations.
pub type EcsResult<T> = Result<T, EcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = EcsError::MissingComponent {
            entity: Entity::new(3, 1),
            component: "Health",
        };
        assert_eq!(err.to_string(), "entity 3v1 has no Health component");

        let err = EcsError::ComponentLimitExceeded {
            component: "Extra",
            requested: 33,
        };
        assert!(err.to_string().contains("signatures hold 32"));
    }
}
