// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rule Compiler
//!
//! Expands a topology template into one [`FabricRule`] per
//! `(replica, role)` pair. Compilation is pure: it never touches the store,
//! so a failed compilation leaves nothing behind and the lifecycle can run
//! it before any write.
//!
//! Rules are ordered by replica, then by role order in the topology
//! document. Each rule carries the role's neighbours within its own replica.

use tracing::debug;

use crate::domain::{
    binding_for_role, format_switch_name, ConfigBinding, FabricId, FabricRule, FabricRuleId,
    RuleNeighbor, TopologyDocument,
};
use crate::domain::invariants::validate_instance_count;
use crate::errors::{FabricError, FabricResult};

/// Expands topology templates into fabric rules
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCompiler;

impl RuleCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile the full rule set for a fabric
    ///
    /// Fails with `MissingRoleBinding` naming the first role (in document
    /// order) that has no binding.
    pub fn compile(
        &self,
        fabric_name: &str,
        instance_count: u32,
        fabric_id: FabricId,
        bindings: &[ConfigBinding],
        topology: &TopologyDocument,
    ) -> FabricResult<Vec<FabricRule>> {
        validate_instance_count(instance_count)?;

        // Resolve every role before producing anything
        let resolved = topology
            .roles()
            .map(|role| {
                binding_for_role(bindings, role)
                    .map(|b| (role, b.configuration_id))
                    .ok_or_else(|| FabricError::MissingRoleBinding {
                        fabric: fabric_name.to_string(),
                        role: role.to_string(),
                    })
            })
            .collect::<FabricResult<Vec<_>>>()?;

        let mut rules = Vec::with_capacity(instance_count as usize * resolved.len());
        for replica in 1..=instance_count {
            for (role, configuration_id) in &resolved {
                let neighbors = topology
                    .neighbors_of(role)
                    .into_iter()
                    .map(|n| RuleNeighbor {
                        local_port: n.local_port,
                        remote_switch: format_switch_name(fabric_name, replica, &n.remote_role),
                        remote_port: n.remote_port,
                    })
                    .collect();

                rules.push(FabricRule {
                    id: FabricRuleId::new(),
                    fabric_id,
                    replica,
                    role: role.to_string(),
                    switch_name: format_switch_name(fabric_name, replica, role),
                    configuration_id: *configuration_id,
                    neighbors,
                });
            }
        }

        debug!(
            fabric = fabric_name,
            instance_count,
            roles = resolved.len(),
            rules = rules.len(),
            "Compiled fabric rules"
        );

        Ok(rules)
    }
}
