//! # Registry Configuration
//!
//! Loaded once at startup, usually as the `[registry]` table of the
//! simulation's TOML file.

use serde::{Deserialize, Serialize};

/// When system membership is (re)computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipPolicy {
    /// Match entities at their first flush, and again immediately whenever a
    /// component is added to or removed from an already admitted entity.
    /// Systems added later also pick up already admitted entities.
    #[default]
    Reevaluate,
    /// Match entities only at their first flush. Later component changes do
    /// not move an admitted entity into or out of any system.
    AdmitOnce,
}

/// Registry tuning knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Membership timing.
    pub membership: MembershipPolicy,
    /// Entity slots reserved up front.
    pub entity_capacity: usize,
    /// Values reserved up front in each newly created pool.
    pub pool_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            membership: MembershipPolicy::Reevaluate,
            entity_capacity: 256,
            pool_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RegistryConfig = toml::from_str("membership = \"admit_once\"").unwrap();
        assert_eq!(config.membership, MembershipPolicy::AdmitOnce);
        assert_eq!(config.entity_capacity, 256);
        assert_eq!(config.pool_capacity, 64);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: RegistryConfig = toml::from_str("").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }
}
