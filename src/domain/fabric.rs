// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Instances and Compiled Rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::discovery::SystemId;
use super::ids::{ConfigurationId, FabricId, FabricRuleId, TopologyId};

/// Association of a topology role to a configuration within one fabric
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigBinding {
    pub configuration_id: ConfigurationId,

    /// Topology role the configuration applies to
    #[serde(alias = "name")]
    pub role: String,
}

impl ConfigBinding {
    pub fn new(configuration_id: ConfigurationId, role: impl Into<String>) -> Self {
        Self {
            configuration_id,
            role: role.into(),
        }
    }
}

/// Find the binding for a role
pub fn binding_for_role<'a>(bindings: &'a [ConfigBinding], role: &str) -> Option<&'a ConfigBinding> {
    bindings.iter().find(|b| b.role == role)
}

/// A physical switch as reported by the operator: its name and serial
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchIdentity {
    #[serde(alias = "name")]
    pub reported_name: String,
    pub system_id: SystemId,
}

impl SwitchIdentity {
    pub fn new(reported_name: impl Into<String>, system_id: SystemId) -> Self {
        Self {
            reported_name: reported_name.into(),
            system_id,
        }
    }
}

/// Fabric lifecycle state
///
/// `Absent` stands for "no record"; a stored fabric is never `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FabricState {
    Absent,
    Creating,
    Active,
    Updating,
    Deleting,
}

/// Instantiation of a topology
///
/// `name` and `topology_id` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fabric {
    pub id: FabricId,
    pub name: String,
    pub topology_id: TopologyId,

    /// Number of replicas of the topology, at least 1
    pub instance_count: u32,

    pub validate: bool,
    pub locked: bool,

    pub bindings: Vec<ConfigBinding>,
    pub identities: Vec<SwitchIdentity>,

    pub state: FabricState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Neighbour of a compiled switch within the same replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleNeighbor {
    pub local_port: String,
    pub remote_switch: String,
    pub remote_port: String,
}

/// Compiled (replica, role) → configuration rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricRule {
    pub id: FabricRuleId,
    pub fabric_id: FabricId,
    pub replica: u32,
    pub role: String,

    /// `<fabric>_<replica>_<role>`
    pub switch_name: String,

    pub configuration_id: ConfigurationId,
    pub neighbors: Vec<RuleNeighbor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_binding_accepts_legacy_name_field() {
        let cfg = ConfigurationId::new();
        let binding: ConfigBinding = serde_json::from_value(json!({
            "configuration_id": cfg,
            "name": "spine-1"
        }))
        .unwrap();
        assert_eq!(binding, ConfigBinding::new(cfg, "spine-1"));
    }

    #[test]
    fn test_identity_accepts_legacy_name_field() {
        let identity: SwitchIdentity = serde_json::from_value(json!({
            "name": "F1_1_spine-1",
            "system_id": "sysA"
        }))
        .unwrap();
        assert_eq!(identity.reported_name, "F1_1_spine-1");
        assert_eq!(identity.system_id.as_str(), "sysA");
    }

    #[test]
    fn test_binding_lookup() {
        let a = ConfigurationId::new();
        let b = ConfigurationId::new();
        let bindings = vec![ConfigBinding::new(a, "spine-1"), ConfigBinding::new(b, "leaf-1")];
        assert_eq!(binding_for_role(&bindings, "leaf-1").map(|b| b.configuration_id), Some(b));
        assert!(binding_for_role(&bindings, "leaf-2").is_none());
    }
}
