// Copyright (c) 2025 - Cowboy AI, Inc.
//! Record Store Abstraction
//!
//! The fabric engine persists five record kinds: topologies, configurations
//! (usage counters only), fabrics, fabric rules and discovery rules. Each
//! kind has its own trait; [`RecordStore`] is the union the lifecycle needs.
//!
//! # Store Requirements
//!
//! 1. **Atomic counters**: usage adjustments are single read-modify-write steps
//! 2. **Unique fabric names**: `insert_fabric` is insert-if-name-absent
//! 3. **Unique discovery names**: `apply_discovery_writes` validates the
//!    final name index and applies the whole batch or nothing
//! 4. **Rule swap**: `replace_fabric_rules` swaps a fabric's rule set in one step
//! 5. **Guarded topology writes**: update/delete refuse while `used_count > 0`

use async_trait::async_trait;

use crate::domain::{
    ConfigurationId, ConfigurationRecord, DiscoveryRule, DiscoveryRuleId, Fabric, FabricId,
    FabricRule, Topology, TopologyId,
};
use crate::errors::StoreResult;

pub mod memory;

pub use memory::{InMemoryRecordStore, StoreOp};

/// One staged discovery rule mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryWrite {
    Insert(DiscoveryRule),
    /// Replace the stored rule with the same id
    Update(DiscoveryRule),
    Delete(DiscoveryRuleId),
}

#[async_trait]
pub trait TopologyStore: Send + Sync {
    async fn insert_topology(&self, topology: Topology) -> StoreResult<()>;

    async fn get_topology(&self, id: TopologyId) -> StoreResult<Option<Topology>>;

    async fn list_topologies(&self) -> StoreResult<Vec<Topology>>;

    /// Overwrite a topology, refusing with `InUse` while it is referenced
    async fn save_unused_topology(&self, topology: Topology) -> StoreResult<()>;

    /// Remove a topology, refusing with `InUse` while it is referenced
    async fn delete_unused_topology(&self, id: TopologyId) -> StoreResult<()>;

    /// Add `delta` to `used_count`, returning the new value
    async fn adjust_topology_usage(&self, id: TopologyId, delta: i64) -> StoreResult<u64>;
}

#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    async fn insert_configuration(&self, configuration: ConfigurationRecord) -> StoreResult<()>;

    async fn get_configuration(&self, id: ConfigurationId) -> StoreResult<Option<ConfigurationRecord>>;

    /// Add `delta` to `used_count`, returning the new value
    async fn adjust_configuration_usage(&self, id: ConfigurationId, delta: i64) -> StoreResult<u64>;
}

#[async_trait]
pub trait FabricStore: Send + Sync {
    /// Insert a fabric, failing with `Conflict` if the name is taken
    async fn insert_fabric(&self, fabric: Fabric) -> StoreResult<()>;

    async fn get_fabric(&self, id: FabricId) -> StoreResult<Option<Fabric>>;

    async fn find_fabric_by_name(&self, name: &str) -> StoreResult<Option<Fabric>>;

    async fn list_fabrics(&self) -> StoreResult<Vec<Fabric>>;

    /// Overwrite an existing fabric
    async fn save_fabric(&self, fabric: Fabric) -> StoreResult<()>;

    async fn delete_fabric(&self, id: FabricId) -> StoreResult<()>;
}

#[async_trait]
pub trait FabricRuleStore: Send + Sync {
    /// Swap the fabric's rule set, returning the previous one
    async fn replace_fabric_rules(
        &self,
        fabric_id: FabricId,
        rules: Vec<FabricRule>,
    ) -> StoreResult<Vec<FabricRule>>;

    async fn list_fabric_rules(&self, fabric_id: FabricId) -> StoreResult<Vec<FabricRule>>;

    /// Remove every rule of the fabric, returning how many were removed
    async fn delete_fabric_rules(&self, fabric_id: FabricId) -> StoreResult<usize>;
}

#[async_trait]
pub trait DiscoveryRuleStore: Send + Sync {
    async fn find_discovery_rule(&self, name: &str) -> StoreResult<Option<DiscoveryRule>>;

    async fn list_discovery_rules(&self, fabric_id: FabricId) -> StoreResult<Vec<DiscoveryRule>>;

    /// Apply a batch atomically
    ///
    /// Fails with `DiscoveryNameTaken` if the resulting table would hold two
    /// rules with the same name; nothing is written in that case.
    async fn apply_discovery_writes(&self, writes: Vec<DiscoveryWrite>) -> StoreResult<()>;

    /// Remove every rule owned by the fabric, returning how many were removed
    async fn delete_discovery_rules(&self, fabric_id: FabricId) -> StoreResult<usize>;
}

/// Everything the fabric lifecycle persists
pub trait RecordStore:
    TopologyStore + ConfigurationStore + FabricStore + FabricRuleStore + DiscoveryRuleStore
{
}

impl<T> RecordStore for T where
    T: TopologyStore + ConfigurationStore + FabricStore + FabricRuleStore + DiscoveryRuleStore
{
}
