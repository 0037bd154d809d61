// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Domain Models
//!
//! Records and value objects shared by the rule compiler, the discovery
//! reconciler and the fabric lifecycle.
//!
//! # Records
//!
//! - [`Topology`] - reusable role/link template, frozen while in use
//! - [`Fabric`] - instantiation of a topology with bindings and identities
//! - [`FabricRule`] - compiled (replica, role) → configuration
//! - [`DiscoveryRule`] - system id → configuration + fabric slot
//! - [`ConfigurationRecord`] - external configuration with usage counter
//!
//! # Value Objects
//!
//! - [`SystemId`] - hardware serial, non-empty, no whitespace
//! - [`SwitchSlot`] - `(replica, role)` parsed by [`IdentityMatcher`]

pub mod configuration;
pub mod discovery;
pub mod fabric;
pub mod identity;
pub mod ids;
pub mod invariants;
pub mod topology;

pub use configuration::ConfigurationRecord;
pub use discovery::{discovery_rule_name, DiscoveryRule, SystemId, SystemIdError};
pub use fabric::{
    binding_for_role, ConfigBinding, Fabric, FabricRule, FabricState, RuleNeighbor, SwitchIdentity,
};
pub use identity::{format_switch_name, IdentityError, IdentityMatcher, SwitchSlot};
pub use ids::{ConfigurationId, DiscoveryRuleId, FabricId, FabricRuleId, TopologyId};
pub use topology::{RoleNeighbor, Topology, TopologyDocument, TopologyError, TopologyLink, TopologySwitch};
