// Copyright (c) 2025 - Cowboy AI, Inc.
//! Undo Journal
//!
//! Each mutating lifecycle step records the action that reverses it. When a
//! later step fails the journal is unwound newest first. A compensation
//! that fails is logged and the unwind moves on.

use tracing::{debug, warn};

use crate::domain::{ConfigurationId, FabricId, FabricRule, TopologyId};
use crate::store::{DiscoveryWrite, RecordStore};

/// Action reversing one committed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    DeleteFabric(FabricId),
    AdjustTopologyUsage { id: TopologyId, delta: i64 },
    AdjustConfigurationUsage { id: ConfigurationId, delta: i64 },
    DeleteFabricRules(FabricId),
    RestoreFabricRules { fabric_id: FabricId, rules: Vec<FabricRule> },
    ApplyDiscoveryWrites(Vec<DiscoveryWrite>),
}

impl Compensation {
    async fn run<S: RecordStore + ?Sized>(&self, store: &S) -> Result<(), String> {
        let result = match self {
            Compensation::DeleteFabric(id) => store.delete_fabric(*id).await,
            Compensation::AdjustTopologyUsage { id, delta } => {
                store.adjust_topology_usage(*id, *delta).await.map(|_| ())
            }
            Compensation::AdjustConfigurationUsage { id, delta } => {
                store.adjust_configuration_usage(*id, *delta).await.map(|_| ())
            }
            Compensation::DeleteFabricRules(id) => store.delete_fabric_rules(*id).await.map(|_| ()),
            Compensation::RestoreFabricRules { fabric_id, rules } => store
                .replace_fabric_rules(*fabric_id, rules.clone())
                .await
                .map(|_| ()),
            Compensation::ApplyDiscoveryWrites(writes) => {
                store.apply_discovery_writes(writes.clone()).await
            }
        };
        result.map_err(|e| e.to_string())
    }
}

/// Ordered log of compensations for one operation
#[derive(Debug, Default)]
pub struct UndoJournal {
    actions: Vec<Compensation>,
}

impl UndoJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: Compensation) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run every compensation in reverse order
    ///
    /// Returns the messages of compensations that failed.
    pub async fn unwind<S: RecordStore + ?Sized>(self, store: &S) -> Vec<String> {
        let mut failures = Vec::new();
        for action in self.actions.into_iter().rev() {
            match action.run(store).await {
                Ok(()) => debug!(?action, "Compensation applied"),
                Err(e) => {
                    warn!(?action, error = %e, "Compensation failed, continuing rollback");
                    failures.push(e);
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigurationRecord;
    use crate::store::{ConfigurationStore, InMemoryRecordStore, StoreOp};

    #[tokio::test]
    async fn test_unwind_runs_newest_first_and_continues() {
        let store = InMemoryRecordStore::new();
        let config = ConfigurationRecord::new("cfgA");
        let id = config.id;
        store.insert_configuration(config).await.unwrap();
        store.adjust_configuration_usage(id, 2).await.unwrap();

        let mut journal = UndoJournal::new();
        journal.record(Compensation::AdjustConfigurationUsage { id, delta: -1 });
        journal.record(Compensation::DeleteFabric(FabricId::new()));
        journal.record(Compensation::AdjustConfigurationUsage { id, delta: -1 });
        assert_eq!(journal.len(), 3);

        let failures = journal.unwind(&store).await;
        assert_eq!(failures.len(), 1);
        assert_eq!(store.get_configuration(id).await.unwrap().unwrap().used_count, 0);
    }

    #[tokio::test]
    async fn test_unwind_reports_store_failures() {
        let store = InMemoryRecordStore::new();
        store.fail_on(StoreOp::DeleteFabricRules).await;

        let mut journal = UndoJournal::new();
        journal.record(Compensation::DeleteFabricRules(FabricId::new()));
        let failures = journal.unwind(&store).await;
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("injected failure"));
    }
}
