// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Fabric Invariants
//!
//! Checks that run before any record is written. All functions are pure:
//! no I/O, deterministic, returning the first violation found.

use std::collections::{BTreeSet, HashSet};

use crate::errors::{FabricError, FabricResult, ImmutableField};

use super::discovery::SystemId;
use super::fabric::{Fabric, SwitchIdentity};
use super::ids::TopologyId;

/// A fabric must replicate its topology at least once
pub fn validate_instance_count(instance_count: u32) -> FabricResult<()> {
    if instance_count < 1 {
        return Err(FabricError::InvalidInstanceCount(instance_count));
    }
    Ok(())
}

/// Fabric names prefix every switch name, so they must be non-empty and
/// free of whitespace
pub fn validate_fabric_name(name: &str) -> FabricResult<()> {
    if name.is_empty() {
        return Err(FabricError::InvalidFabricName {
            name: name.to_string(),
            reason: "name is empty".to_string(),
        });
    }

    if name.chars().any(char::is_whitespace) {
        return Err(FabricError::InvalidFabricName {
            name: name.to_string(),
            reason: "name contains whitespace".to_string(),
        });
    }

    Ok(())
}

/// System ids appearing more than once, sorted
pub fn duplicate_system_ids(identities: &[SwitchIdentity]) -> Vec<SystemId> {
    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();

    for identity in identities {
        if !seen.insert(&identity.system_id) {
            duplicates.insert(identity.system_id.clone());
        }
    }

    duplicates.into_iter().collect()
}

/// Reject a batch with repeated system ids, reporting the smallest one
pub fn validate_unique_system_ids(fabric: &str, identities: &[SwitchIdentity]) -> FabricResult<()> {
    match duplicate_system_ids(identities).into_iter().next() {
        Some(system_id) => Err(FabricError::DuplicateSystemId {
            fabric: fabric.to_string(),
            system_id: system_id.to_string(),
        }),
        None => Ok(()),
    }
}

/// Name and topology are fixed at creation; `None` means "not supplied"
pub fn validate_immutable_fields(
    fabric: &Fabric,
    requested_name: Option<&str>,
    requested_topology: Option<TopologyId>,
) -> FabricResult<()> {
    if let Some(name) = requested_name {
        if name != fabric.name {
            return Err(FabricError::ImmutableFieldChanged {
                fabric_id: fabric.id,
                field: ImmutableField::Name,
            });
        }
    }

    if let Some(topology_id) = requested_topology {
        if topology_id != fabric.topology_id {
            return Err(FabricError::ImmutableFieldChanged {
                fabric_id: fabric.id,
                field: ImmutableField::Topology,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FabricId, FabricState};
    use chrono::Utc;

    fn identity(name: &str, system_id: &str) -> SwitchIdentity {
        SwitchIdentity::new(name, SystemId::new(system_id).unwrap())
    }

    fn fabric() -> Fabric {
        Fabric {
            id: FabricId::new(),
            name: "F1".into(),
            topology_id: TopologyId::new(),
            instance_count: 1,
            validate: false,
            locked: false,
            bindings: vec![],
            identities: vec![],
            state: FabricState::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_instance_count() {
        assert!(validate_instance_count(1).is_ok());
        assert!(validate_instance_count(8).is_ok());
        assert!(matches!(
            validate_instance_count(0),
            Err(FabricError::InvalidInstanceCount(0))
        ));
    }

    #[test]
    fn test_fabric_name() {
        assert!(validate_fabric_name("dc1_pod2").is_ok());
        assert!(validate_fabric_name("").is_err());
        assert!(validate_fabric_name("dc 1").is_err());
    }

    #[test]
    fn test_duplicate_system_ids() {
        let identities = vec![
            identity("F1_1_spine-1", "sysB"),
            identity("F1_1_leaf-1", "sysA"),
            identity("F1_2_leaf-1", "sysB"),
            identity("F1_2_spine-1", "sysA"),
            identity("F1_3_spine-1", "sysC"),
        ];
        let dups: Vec<String> = duplicate_system_ids(&identities)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dups, vec!["sysA", "sysB"]);

        match validate_unique_system_ids("F1", &identities) {
            Err(FabricError::DuplicateSystemId { system_id, .. }) => assert_eq!(system_id, "sysA"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_immutable_fields() {
        let fabric = fabric();
        assert!(validate_immutable_fields(&fabric, None, None).is_ok());
        assert!(validate_immutable_fields(&fabric, Some("F1"), Some(fabric.topology_id)).is_ok());
        assert!(matches!(
            validate_immutable_fields(&fabric, Some("F2"), None),
            Err(FabricError::ImmutableFieldChanged { field: ImmutableField::Name, .. })
        ));
        assert!(matches!(
            validate_immutable_fields(&fabric, None, Some(TopologyId::new())),
            Err(FabricError::ImmutableFieldChanged { field: ImmutableField::Topology, .. })
        ));
    }
}
