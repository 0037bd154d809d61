// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Rule Compilation
//!
//! The compiled rule set is exactly `instance_count × role_count` rules,
//! each bound to its role's configuration, and every generated switch name
//! parses back to its own slot.

use cim_fabric::compiler::RuleCompiler;
use cim_fabric::domain::{
    ConfigBinding, ConfigurationId, FabricId, IdentityMatcher, TopologyDocument,
};
use cim_fabric::errors::FabricError;
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use uuid::Uuid;

/// Distinct role tokens of the form `[a-z]{1,6}-[1-9]`
fn roles() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,6}-[1-9]", 1..6).prop_map(|set| {
        let mut roles: Vec<String> = set.into_iter().collect();
        roles.sort();
        roles
    })
}

fn document(roles: &[String]) -> TopologyDocument {
    let switches: Vec<_> = roles.iter().map(|r| json!({ "name": r })).collect();
    TopologyDocument::from_value(&json!({ "switches": switches })).unwrap()
}

fn config_for(index: usize) -> ConfigurationId {
    ConfigurationId::from_uuid(Uuid::from_u128(0x4000 + index as u128))
}

proptest! {
    #[test]
    fn prop_rule_count_is_instances_times_roles(
        roles in roles(),
        instances in 1u32..8,
    ) {
        let bindings: Vec<_> = roles
            .iter()
            .enumerate()
            .map(|(i, r)| ConfigBinding::new(config_for(i), r.clone()))
            .collect();

        let rules = RuleCompiler::new()
            .compile("fab", instances, FabricId::new(), &bindings, &document(&roles))
            .unwrap();

        prop_assert_eq!(rules.len(), instances as usize * roles.len());

        let unique: HashSet<_> = rules.iter().map(|r| r.switch_name.as_str()).collect();
        prop_assert_eq!(unique.len(), rules.len());

        let matcher = IdentityMatcher::new("fab");
        for rule in &rules {
            let index = roles.iter().position(|r| *r == rule.role).unwrap();
            prop_assert_eq!(rule.configuration_id, config_for(index));

            let slot = matcher.match_name(&rule.switch_name).unwrap();
            prop_assert_eq!(slot.replica, rule.replica);
            prop_assert_eq!(&slot.role, &rule.role);
        }
    }

    #[test]
    fn prop_any_unbound_role_fails(
        roles in roles(),
        dropped in any::<prop::sample::Index>(),
    ) {
        let missing = dropped.index(roles.len());
        let bindings: Vec<_> = roles
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != missing)
            .map(|(i, r)| ConfigBinding::new(config_for(i), r.clone()))
            .collect();

        let result = RuleCompiler::new()
            .compile("fab", 2, FabricId::new(), &bindings, &document(&roles));

        match result {
            Err(FabricError::MissingRoleBinding { role, .. }) => prop_assert_eq!(role, roles[missing].clone()),
            other => prop_assert!(false, "expected MissingRoleBinding, got {:?}", other.map(|r| r.len())),
        }
    }
}
