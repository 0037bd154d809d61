// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory record store
//!
//! All tables sit behind one `RwLock`, so every trait method is a single
//! serializable step. Failure injection lets callers exercise rollback.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    ConfigurationStore, DiscoveryRuleStore, DiscoveryWrite, FabricRuleStore, FabricStore,
    TopologyStore,
};
use crate::domain::{
    ConfigurationId, ConfigurationRecord, DiscoveryRule, DiscoveryRuleId, Fabric, FabricId,
    FabricRule, Topology, TopologyId,
};
use crate::errors::{StoreError, StoreResult};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    SaveTopology,
    DeleteTopology,
    AdjustTopologyUsage,
    AdjustConfigurationUsage,
    InsertFabric,
    SaveFabric,
    DeleteFabric,
    ReplaceFabricRules,
    DeleteFabricRules,
    ApplyDiscoveryWrites,
    DeleteDiscoveryRules,
}

#[derive(Default)]
struct Tables {
    topologies: HashMap<TopologyId, Topology>,
    configurations: HashMap<ConfigurationId, ConfigurationRecord>,
    fabrics: HashMap<FabricId, Fabric>,
    fabric_rules: HashMap<FabricId, Vec<FabricRule>>,
    discovery_rules: HashMap<DiscoveryRuleId, DiscoveryRule>,
    discovery_names: HashMap<String, DiscoveryRuleId>,
}

/// Record store backed by in-process hash maps
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
    /// Remaining successful calls before an operation starts failing
    failures: RwLock<HashMap<StoreOp, u32>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail
    pub async fn fail_on(&self, op: StoreOp) {
        self.fail_after(op, 0).await;
    }

    /// Let `successes` calls of `op` through, then fail every later call
    pub async fn fail_after(&self, op: StoreOp, successes: u32) {
        self.failures.write().await.insert(op, successes);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    async fn check(&self, op: StoreOp) -> StoreResult<()> {
        let mut failures = self.failures.write().await;
        match failures.get_mut(&op) {
            Some(0) => Err(StoreError::Unavailable(format!("injected failure on {:?}", op))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Total number of discovery rules across all fabrics
    pub async fn discovery_rule_count(&self) -> usize {
        self.tables.read().await.discovery_rules.len()
    }

    /// Total number of fabric rules across all fabrics
    pub async fn fabric_rule_count(&self) -> usize {
        self.tables.read().await.fabric_rules.values().map(Vec::len).sum()
    }
}

fn adjust(current: u64, delta: i64, kind: &'static str, id: String) -> StoreResult<u64> {
    let next = current as i64 + delta;
    if next < 0 {
        return Err(StoreError::CounterUnderflow { kind, id });
    }
    Ok(next as u64)
}

fn not_found(kind: &'static str, id: impl ToString) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[async_trait]
impl TopologyStore for InMemoryRecordStore {
    async fn insert_topology(&self, topology: Topology) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.topologies.contains_key(&topology.id) {
            return Err(StoreError::Conflict {
                kind: "topology",
                key: topology.id.to_string(),
            });
        }
        tables.topologies.insert(topology.id, topology);
        Ok(())
    }

    async fn get_topology(&self, id: TopologyId) -> StoreResult<Option<Topology>> {
        Ok(self.tables.read().await.topologies.get(&id).cloned())
    }

    async fn list_topologies(&self) -> StoreResult<Vec<Topology>> {
        let mut topologies: Vec<Topology> =
            self.tables.read().await.topologies.values().cloned().collect();
        topologies.sort_by_key(|t| t.id);
        Ok(topologies)
    }

    async fn save_unused_topology(&self, topology: Topology) -> StoreResult<()> {
        self.check(StoreOp::SaveTopology).await?;
        let mut tables = self.tables.write().await;
        let current = tables
            .topologies
            .get(&topology.id)
            .ok_or_else(|| not_found("topology", topology.id))?;
        if current.used_count > 0 {
            return Err(StoreError::InUse {
                kind: "topology",
                id: topology.id.to_string(),
                used_count: current.used_count,
            });
        }
        let used_count = current.used_count;
        tables
            .topologies
            .insert(topology.id, Topology { used_count, ..topology });
        Ok(())
    }

    async fn delete_unused_topology(&self, id: TopologyId) -> StoreResult<()> {
        self.check(StoreOp::DeleteTopology).await?;
        let mut tables = self.tables.write().await;
        let current = tables.topologies.get(&id).ok_or_else(|| not_found("topology", id))?;
        if current.used_count > 0 {
            return Err(StoreError::InUse {
                kind: "topology",
                id: id.to_string(),
                used_count: current.used_count,
            });
        }
        tables.topologies.remove(&id);
        Ok(())
    }

    async fn adjust_topology_usage(&self, id: TopologyId, delta: i64) -> StoreResult<u64> {
        self.check(StoreOp::AdjustTopologyUsage).await?;
        let mut tables = self.tables.write().await;
        let topology = tables
            .topologies
            .get_mut(&id)
            .ok_or_else(|| not_found("topology", id))?;
        topology.used_count = adjust(topology.used_count, delta, "topology", id.to_string())?;
        Ok(topology.used_count)
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryRecordStore {
    async fn insert_configuration(&self, configuration: ConfigurationRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.configurations.contains_key(&configuration.id) {
            return Err(StoreError::Conflict {
                kind: "configuration",
                key: configuration.id.to_string(),
            });
        }
        tables.configurations.insert(configuration.id, configuration);
        Ok(())
    }

    async fn get_configuration(&self, id: ConfigurationId) -> StoreResult<Option<ConfigurationRecord>> {
        Ok(self.tables.read().await.configurations.get(&id).cloned())
    }

    async fn adjust_configuration_usage(&self, id: ConfigurationId, delta: i64) -> StoreResult<u64> {
        self.check(StoreOp::AdjustConfigurationUsage).await?;
        let mut tables = self.tables.write().await;
        let configuration = tables
            .configurations
            .get_mut(&id)
            .ok_or_else(|| not_found("configuration", id))?;
        configuration.used_count =
            adjust(configuration.used_count, delta, "configuration", id.to_string())?;
        Ok(configuration.used_count)
    }
}

#[async_trait]
impl FabricStore for InMemoryRecordStore {
    async fn insert_fabric(&self, fabric: Fabric) -> StoreResult<()> {
        self.check(StoreOp::InsertFabric).await?;
        let mut tables = self.tables.write().await;
        if tables.fabrics.values().any(|f| f.name == fabric.name) {
            return Err(StoreError::Conflict {
                kind: "fabric",
                key: fabric.name,
            });
        }
        tables.fabrics.insert(fabric.id, fabric);
        Ok(())
    }

    async fn get_fabric(&self, id: FabricId) -> StoreResult<Option<Fabric>> {
        Ok(self.tables.read().await.fabrics.get(&id).cloned())
    }

    async fn find_fabric_by_name(&self, name: &str) -> StoreResult<Option<Fabric>> {
        Ok(self
            .tables
            .read()
            .await
            .fabrics
            .values()
            .find(|f| f.name == name)
            .cloned())
    }

    async fn list_fabrics(&self) -> StoreResult<Vec<Fabric>> {
        let mut fabrics: Vec<Fabric> = self.tables.read().await.fabrics.values().cloned().collect();
        fabrics.sort_by_key(|f| f.id);
        Ok(fabrics)
    }

    async fn save_fabric(&self, fabric: Fabric) -> StoreResult<()> {
        self.check(StoreOp::SaveFabric).await?;
        let mut tables = self.tables.write().await;
        match tables.fabrics.get_mut(&fabric.id) {
            Some(current) => {
                *current = fabric;
                Ok(())
            }
            None => Err(not_found("fabric", fabric.id)),
        }
    }

    async fn delete_fabric(&self, id: FabricId) -> StoreResult<()> {
        self.check(StoreOp::DeleteFabric).await?;
        self.tables
            .write()
            .await
            .fabrics
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("fabric", id))
    }
}

#[async_trait]
impl FabricRuleStore for InMemoryRecordStore {
    async fn replace_fabric_rules(
        &self,
        fabric_id: FabricId,
        rules: Vec<FabricRule>,
    ) -> StoreResult<Vec<FabricRule>> {
        self.check(StoreOp::ReplaceFabricRules).await?;
        let mut tables = self.tables.write().await;
        let previous = tables.fabric_rules.insert(fabric_id, rules).unwrap_or_default();
        debug!(fabric_id = %fabric_id, replaced = previous.len(), "Fabric rules swapped");
        Ok(previous)
    }

    async fn list_fabric_rules(&self, fabric_id: FabricId) -> StoreResult<Vec<FabricRule>> {
        Ok(self
            .tables
            .read()
            .await
            .fabric_rules
            .get(&fabric_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_fabric_rules(&self, fabric_id: FabricId) -> StoreResult<usize> {
        self.check(StoreOp::DeleteFabricRules).await?;
        Ok(self
            .tables
            .write()
            .await
            .fabric_rules
            .remove(&fabric_id)
            .map(|rules| rules.len())
            .unwrap_or(0))
    }
}

#[async_trait]
impl DiscoveryRuleStore for InMemoryRecordStore {
    async fn find_discovery_rule(&self, name: &str) -> StoreResult<Option<DiscoveryRule>> {
        let tables = self.tables.read().await;
        Ok(tables
            .discovery_names
            .get(name)
            .and_then(|id| tables.discovery_rules.get(id))
            .cloned())
    }

    async fn list_discovery_rules(&self, fabric_id: FabricId) -> StoreResult<Vec<DiscoveryRule>> {
        let mut rules: Vec<DiscoveryRule> = self
            .tables
            .read()
            .await
            .discovery_rules
            .values()
            .filter(|r| r.fabric_id == fabric_id)
            .cloned()
            .collect();
        rules.sort_by(|a, b| (a.replica, &a.switch_name).cmp(&(b.replica, &b.switch_name)));
        Ok(rules)
    }

    async fn apply_discovery_writes(&self, writes: Vec<DiscoveryWrite>) -> StoreResult<()> {
        self.check(StoreOp::ApplyDiscoveryWrites).await?;
        let mut tables = self.tables.write().await;
        let mut next = tables.discovery_rules.clone();
        let mut touched = Vec::new();

        for write in &writes {
            if let DiscoveryWrite::Delete(id) = write {
                next.remove(id).ok_or_else(|| not_found("discovery rule", id))?;
            }
        }
        for write in &writes {
            match write {
                DiscoveryWrite::Update(rule) => {
                    let slot = next
                        .get_mut(&rule.id)
                        .ok_or_else(|| not_found("discovery rule", rule.id))?;
                    *slot = rule.clone();
                    touched.push(rule.id);
                }
                DiscoveryWrite::Insert(rule) => {
                    if next.insert(rule.id, rule.clone()).is_some() {
                        return Err(StoreError::Conflict {
                            kind: "discovery rule",
                            key: rule.id.to_string(),
                        });
                    }
                    touched.push(rule.id);
                }
                DiscoveryWrite::Delete(_) => {}
            }
        }

        // Untouched rules first so a collision names the rule already holding the name
        let touched_set: HashSet<DiscoveryRuleId> = touched.iter().copied().collect();
        let mut names: HashMap<String, DiscoveryRuleId> = HashMap::with_capacity(next.len());
        let ordered = next
            .values()
            .filter(|r| !touched_set.contains(&r.id))
            .chain(touched.iter().filter_map(|id| next.get(id)));
        for rule in ordered {
            if let Some(holder) = names.get(&rule.name).and_then(|id| next.get(id)) {
                return Err(StoreError::DiscoveryNameTaken {
                    name: rule.name.clone(),
                    holder_switch: holder.switch_name.clone(),
                });
            }
            names.insert(rule.name.clone(), rule.id);
        }

        debug!(writes = writes.len(), "Discovery batch applied");
        tables.discovery_rules = next;
        tables.discovery_names = names;
        Ok(())
    }

    async fn delete_discovery_rules(&self, fabric_id: FabricId) -> StoreResult<usize> {
        self.check(StoreOp::DeleteDiscoveryRules).await?;
        let mut tables = self.tables.write().await;
        let before = tables.discovery_rules.len();
        tables.discovery_rules.retain(|_, r| r.fabric_id != fabric_id);
        let Tables {
            discovery_rules,
            discovery_names,
            ..
        } = &mut *tables;
        discovery_names.retain(|_, id| discovery_rules.contains_key(id));
        Ok(before - tables.discovery_rules.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(name: &str, switch: &str, fabric_id: FabricId) -> DiscoveryRule {
        DiscoveryRule {
            id: DiscoveryRuleId::new(),
            name: name.into(),
            priority: 100,
            match_kind: "serial_id".into(),
            subrules: vec![name.trim_start_matches("serial_").into()],
            configuration_id: ConfigurationId::new(),
            fabric_id,
            replica: 1,
            switch_name: switch.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_discovery_batch_is_all_or_nothing() {
        let store = InMemoryRecordStore::new();
        let fabric = FabricId::new();
        let existing = rule("serial_A", "F1_1_spine-1", fabric);
        store
            .apply_discovery_writes(vec![DiscoveryWrite::Insert(existing.clone())])
            .await
            .unwrap();

        let err = store
            .apply_discovery_writes(vec![
                DiscoveryWrite::Insert(rule("serial_B", "F2_1_leaf-1", FabricId::new())),
                DiscoveryWrite::Insert(rule("serial_A", "F2_1_spine-1", FabricId::new())),
            ])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::DiscoveryNameTaken {
                name: "serial_A".into(),
                holder_switch: "F1_1_spine-1".into(),
            }
        );
        assert_eq!(store.discovery_rule_count().await, 1);
        assert!(store.find_discovery_rule("serial_B").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_discovery_batch_allows_name_swap() {
        let store = InMemoryRecordStore::new();
        let fabric = FabricId::new();
        let a = rule("serial_A", "F1_1_spine-1", fabric);
        let b = rule("serial_B", "F1_1_leaf-1", fabric);
        store
            .apply_discovery_writes(vec![
                DiscoveryWrite::Insert(a.clone()),
                DiscoveryWrite::Insert(b.clone()),
            ])
            .await
            .unwrap();

        let swapped_a = DiscoveryRule { name: "serial_B".into(), ..a };
        let swapped_b = DiscoveryRule { name: "serial_A".into(), ..b };
        store
            .apply_discovery_writes(vec![
                DiscoveryWrite::Update(swapped_a),
                DiscoveryWrite::Update(swapped_b),
            ])
            .await
            .unwrap();

        let holder = store.find_discovery_rule("serial_A").await.unwrap().unwrap();
        assert_eq!(holder.switch_name, "F1_1_leaf-1");
    }

    #[tokio::test]
    async fn test_delete_discovery_rules_clears_name_index() {
        let store = InMemoryRecordStore::new();
        let fabric = FabricId::new();
        let other = FabricId::new();
        store
            .apply_discovery_writes(vec![
                DiscoveryWrite::Insert(rule("serial_A", "F1_1_spine-1", fabric)),
                DiscoveryWrite::Insert(rule("serial_B", "F2_1_spine-1", other)),
            ])
            .await
            .unwrap();

        assert_eq!(store.delete_discovery_rules(fabric).await.unwrap(), 1);
        assert!(store.find_discovery_rule("serial_A").await.unwrap().is_none());
        assert!(store.find_discovery_rule("serial_B").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_counter_underflow() {
        let store = InMemoryRecordStore::new();
        let config = ConfigurationRecord::new("base");
        let id = config.id;
        store.insert_configuration(config).await.unwrap();

        assert_eq!(store.adjust_configuration_usage(id, 1).await.unwrap(), 1);
        assert_eq!(store.adjust_configuration_usage(id, -1).await.unwrap(), 0);
        assert!(matches!(
            store.adjust_configuration_usage(id, -1).await,
            Err(StoreError::CounterUnderflow { .. })
        ));
    }

    #[tokio::test]
    async fn test_fail_after() {
        let store = InMemoryRecordStore::new();
        let config = ConfigurationRecord::new("base");
        let id = config.id;
        store.insert_configuration(config).await.unwrap();
        store.fail_after(StoreOp::AdjustConfigurationUsage, 1).await;

        assert!(store.adjust_configuration_usage(id, 1).await.is_ok());
        assert!(matches!(
            store.adjust_configuration_usage(id, 1).await,
            Err(StoreError::Unavailable(_))
        ));

        store.clear_failures().await;
        assert_eq!(store.adjust_configuration_usage(id, 1).await.unwrap(), 2);
    }
}
