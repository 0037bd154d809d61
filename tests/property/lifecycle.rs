// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Usage Accounting
//!
//! Whatever mix of bindings and identities a fabric is created and updated
//! with, deleting it returns every usage counter to where it started.

use cim_fabric::domain::{ConfigBinding, SwitchIdentity, SystemId};
use proptest::prelude::*;

use crate::fixtures::Harness;

fn identities(replicas: u32) -> impl Strategy<Value = Vec<SwitchIdentity>> {
    prop::collection::btree_map((1..=replicas, prop::bool::ANY), "[A-Z0-9]{6,10}", 0..4)
        .prop_map(|slots| {
            let mut seen = std::collections::HashSet::new();
            slots
                .into_iter()
                .filter(|(_, serial)| seen.insert(serial.clone()))
                .map(|((replica, spine), serial)| {
                    let role = if spine { "spine-1" } else { "leaf-1" };
                    SwitchIdentity::new(
                        format!("F1_{}_{}", replica, role),
                        SystemId::new(serial).unwrap(),
                    )
                })
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_create_update_delete_balances_counters(
        instances in 1u32..4,
        first in identities(3),
        second in identities(3),
        spine_on_c in any::<bool>(),
    ) {
        tokio_test::block_on(async {
            let h = Harness::new().await;

            let mut command = h.f1_command();
            command.instance_count = instances;
            command.identities = first;
            let fabric = h.lifecycle.create_fabric(command).await.unwrap();
            assert_eq!(h.topology_usage().await, 1);

            let mut update = h.f1_update(second);
            if spine_on_c {
                update.bindings = vec![
                    ConfigBinding::new(h.cfg_c, "spine-1"),
                    ConfigBinding::new(h.cfg_b, "leaf-1"),
                ];
            }
            h.lifecycle.update_fabric(fabric.id, update).await.unwrap();
            assert_eq!(h.config_usage(h.cfg_b).await, 1);

            h.lifecycle.delete_fabric(fabric.id).await.unwrap();
            for cfg in [h.cfg_a, h.cfg_b, h.cfg_c] {
                assert_eq!(h.config_usage(cfg).await, 0);
            }
            assert_eq!(h.topology_usage().await, 0);
            assert_eq!(h.store.discovery_rule_count().await, 0);
            assert_eq!(h.store.fabric_rule_count().await, 0);
        });
    }
}
