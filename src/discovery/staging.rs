// Copyright (c) 2025 - Cowboy AI, Inc.
//! Discovery Batch
//!
//! Staging object for discovery rule mutations. Nothing reaches the store
//! until [`DiscoveryBatch::commit`], which hands the whole batch to the
//! store's atomic apply. Every staged write remembers the rule it replaces,
//! so a committed batch can be reverted with [`DiscoveryBatch::inverse`].

use std::collections::HashSet;

use tracing::debug;

use crate::domain::DiscoveryRule;
use crate::errors::StoreResult;
use crate::store::{DiscoveryRuleStore, DiscoveryWrite};

#[derive(Debug, Clone, PartialEq, Eq)]
enum StagedWrite {
    Insert(DiscoveryRule),
    Update {
        before: DiscoveryRule,
        after: DiscoveryRule,
    },
    Delete(DiscoveryRule),
}

/// Pending discovery rule writes for one lifecycle operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryBatch {
    staged: Vec<StagedWrite>,
    names: HashSet<String>,
}

impl DiscoveryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_insert(&mut self, rule: DiscoveryRule) {
        self.names.insert(rule.name.clone());
        self.staged.push(StagedWrite::Insert(rule));
    }

    pub fn stage_update(&mut self, before: DiscoveryRule, after: DiscoveryRule) {
        self.names.insert(after.name.clone());
        self.staged.push(StagedWrite::Update { before, after });
    }

    pub fn stage_delete(&mut self, rule: DiscoveryRule) {
        self.staged.push(StagedWrite::Delete(rule));
    }

    /// Whether an insert or update in this batch already claims `name`
    pub fn claims_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn inserted(&self) -> usize {
        self.count(|w| matches!(w, StagedWrite::Insert(_)))
    }

    pub fn updated(&self) -> usize {
        self.count(|w| matches!(w, StagedWrite::Update { .. }))
    }

    pub fn removed(&self) -> usize {
        self.count(|w| matches!(w, StagedWrite::Delete(_)))
    }

    fn count(&self, pred: impl Fn(&StagedWrite) -> bool) -> usize {
        self.staged.iter().filter(|w| pred(w)).count()
    }

    /// Rules the batch inserts or rewrites, in staging order
    pub fn written_rules(&self) -> impl Iterator<Item = &DiscoveryRule> {
        self.staged.iter().filter_map(|w| match w {
            StagedWrite::Insert(rule) => Some(rule),
            StagedWrite::Update { after, .. } => Some(after),
            StagedWrite::Delete(_) => None,
        })
    }

    /// Store writes that apply this batch
    pub fn writes(&self) -> Vec<DiscoveryWrite> {
        self.staged
            .iter()
            .map(|w| match w {
                StagedWrite::Insert(rule) => DiscoveryWrite::Insert(rule.clone()),
                StagedWrite::Update { after, .. } => DiscoveryWrite::Update(after.clone()),
                StagedWrite::Delete(rule) => DiscoveryWrite::Delete(rule.id),
            })
            .collect()
    }

    /// Store writes that revert this batch once committed
    pub fn inverse(&self) -> Vec<DiscoveryWrite> {
        self.staged
            .iter()
            .rev()
            .map(|w| match w {
                StagedWrite::Insert(rule) => DiscoveryWrite::Delete(rule.id),
                StagedWrite::Update { before, .. } => DiscoveryWrite::Update(before.clone()),
                StagedWrite::Delete(rule) => DiscoveryWrite::Insert(rule.clone()),
            })
            .collect()
    }

    /// Apply every staged write in one atomic store call
    pub async fn commit<S>(&self, store: &S) -> StoreResult<()>
    where
        S: DiscoveryRuleStore + ?Sized,
    {
        if self.is_empty() {
            return Ok(());
        }
        store.apply_discovery_writes(self.writes()).await?;
        debug!(
            inserted = self.inserted(),
            updated = self.updated(),
            removed = self.removed(),
            "Discovery batch committed"
        );
        Ok(())
    }

    /// Drop the batch without writing anything
    pub fn discard(self) {
        debug!(staged = self.staged.len(), "Discovery batch discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigurationId, DiscoveryRuleId, FabricId};
    use crate::store::InMemoryRecordStore;
    use chrono::Utc;

    fn rule(system_id: &str, switch: &str, fabric_id: FabricId) -> DiscoveryRule {
        DiscoveryRule {
            id: DiscoveryRuleId::new(),
            name: format!("serial_{}", system_id),
            priority: 100,
            match_kind: "serial_id".into(),
            subrules: vec![system_id.into()],
            configuration_id: ConfigurationId::new(),
            fabric_id,
            replica: 1,
            switch_name: switch.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_inverse_restores_previous_table() {
        let store = InMemoryRecordStore::new();
        let fabric = FabricId::new();
        let spine = rule("sysA", "F1_1_spine-1", fabric);
        let leaf = rule("sysB", "F1_1_leaf-1", fabric);

        let mut seed = DiscoveryBatch::new();
        seed.stage_insert(spine.clone());
        seed.stage_insert(leaf.clone());
        seed.commit(&store).await.unwrap();

        let mut batch = DiscoveryBatch::new();
        let repointed = DiscoveryRule {
            name: "serial_sysC".into(),
            subrules: vec!["sysC".into()],
            ..spine.clone()
        };
        batch.stage_update(spine.clone(), repointed);
        batch.stage_delete(leaf.clone());
        batch.stage_insert(rule("sysD", "F1_2_spine-1", fabric));
        assert_eq!((batch.inserted(), batch.updated(), batch.removed()), (1, 1, 1));

        batch.commit(&store).await.unwrap();
        assert!(store.find_discovery_rule("serial_sysA").await.unwrap().is_none());

        store.apply_discovery_writes(batch.inverse()).await.unwrap();
        assert_eq!(store.list_discovery_rules(fabric).await.unwrap().len(), 2);
        assert_eq!(store.find_discovery_rule("serial_sysA").await.unwrap(), Some(spine));
        assert_eq!(store.find_discovery_rule("serial_sysB").await.unwrap(), Some(leaf));
    }

    #[tokio::test]
    async fn test_discard_writes_nothing() {
        let store = InMemoryRecordStore::new();
        let mut batch = DiscoveryBatch::new();
        batch.stage_insert(rule("sysA", "F1_1_spine-1", FabricId::new()));
        assert!(batch.claims_name("serial_sysA"));
        batch.discard();
        assert_eq!(store.discovery_rule_count().await, 0);
    }
}
