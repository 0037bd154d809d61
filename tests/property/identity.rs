// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Switch Naming Grammar
//!
//! Every `<fabric>_<n>_<letters>-<d>` with `n ≥ 1` and `d ∈ 1..=9` parses to
//! exactly `(n, <letters>-<d>)`; names breaking the grammar are rejected.

use cim_fabric::domain::{format_switch_name, IdentityMatcher};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_well_formed_names_parse_exactly(
        fabric in "[A-Za-z][A-Za-z0-9_]{0,8}",
        replica in 1u32..100_000,
        letters in "[a-zA-Z]{0,8}",
        digit in 1u8..=9,
    ) {
        let role = format!("{}-{}", letters, digit);
        let name = format_switch_name(&fabric, replica, &role);

        let slot = IdentityMatcher::new(&fabric).match_name(&name).unwrap();
        prop_assert_eq!(slot.replica, replica);
        prop_assert_eq!(slot.role, role);
    }

    #[test]
    fn prop_leading_zero_replica_rejected(
        replica in 0u32..1000,
        letters in "[a-z]{1,6}",
    ) {
        let name = format!("F1_0{}_{}-1", replica, letters);
        prop_assert!(IdentityMatcher::new("F1").match_name(&name).is_err());
    }

    #[test]
    fn prop_multi_digit_role_index_rejected(
        replica in 1u32..1000,
        index in 10u32..10_000,
    ) {
        let name = format!("F1_{}_leaf-{}", replica, index);
        prop_assert!(IdentityMatcher::new("F1").match_name(&name).is_err());
    }

    #[test]
    fn prop_foreign_fabric_rejected(
        replica in 1u32..1000,
        digit in 1u8..=9,
    ) {
        let name = format!("F2_{}_spine-{}", replica, digit);
        prop_assert!(IdentityMatcher::new("F1").match_name(&name).is_err());
    }
}
