// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Lifecycle Service
//!
//! Orchestrates create, update and delete of fabric instances.
//!
//! # Transaction Semantics
//!
//! Every operation validates and computes before it writes:
//!
//! 1. Load records, check invariants and the lifecycle transition
//! 2. Compile the rule set (pure)
//! 3. Reconcile identities into a staged discovery batch (read only)
//! 4. Write, recording a compensation for every step in an [`UndoJournal`]
//! 5. Publish the lifecycle event
//!
//! If a write fails the journal is unwound and the first error is returned.
//! The topology counter release on delete is the exception: it is
//! best-effort and failures show up as warnings in the [`DeleteReport`].

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::locks::KeyedLocks;
use super::undo::{Compensation, UndoJournal};
use crate::compiler::RuleCompiler;
use crate::config::DiscoveryConfig;
use crate::discovery::{DiscoveryBatch, DiscoveryReconciler, FabricScope};
use crate::domain::invariants::{
    validate_fabric_name, validate_immutable_fields, validate_instance_count,
    validate_unique_system_ids,
};
use crate::domain::{
    ConfigBinding, DiscoveryRule, Fabric, FabricId, FabricRule, FabricState, SwitchIdentity,
    TopologyDocument, TopologyId,
};
use crate::errors::{FabricError, FabricResult, StoreError};
use crate::events::{
    EventPublisher, FabricCreated, FabricDeleted, FabricEvent, FabricUpdated, NoopPublisher,
};
use crate::state_machine::{LifecycleCommand, StateMachine};
use crate::store::{DiscoveryWrite, RecordStore};
use crate::usage::ConfigUsageTracker;

const EVENT_VERSION: u32 = 1;

/// Create a fabric from a topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFabricCommand {
    pub name: String,
    pub topology_id: TopologyId,
    pub instance_count: u32,
    #[serde(default)]
    pub validate: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub bindings: Vec<ConfigBinding>,
    #[serde(default)]
    pub identities: Vec<SwitchIdentity>,
}

/// Replace a fabric's mutable attributes
///
/// `name` and `topology_id` may be supplied but must match the stored
/// fabric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFabricCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topology_id: Option<TopologyId>,
    pub instance_count: u32,
    #[serde(default)]
    pub validate: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub bindings: Vec<ConfigBinding>,
    #[serde(default)]
    pub identities: Vec<SwitchIdentity>,
}

/// Outcome of a fabric deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub fabric_id: FabricId,
    pub discovery_rules_removed: usize,
    pub fabric_rules_removed: usize,

    /// Best-effort steps that failed
    pub warnings: Vec<String>,
}

/// Fabric create/update/delete orchestration
pub struct FabricLifecycle<S: RecordStore + ?Sized> {
    store: Arc<S>,
    compiler: RuleCompiler,
    reconciler: DiscoveryReconciler,
    usage: ConfigUsageTracker<S>,
    publisher: Arc<dyn EventPublisher>,
    fabric_locks: KeyedLocks<FabricId>,
    name_locks: KeyedLocks<String>,
}

impl<S: RecordStore + ?Sized> FabricLifecycle<S> {
    pub fn new(store: Arc<S>, discovery: DiscoveryConfig) -> Self {
        Self {
            usage: ConfigUsageTracker::new(Arc::clone(&store)),
            store,
            compiler: RuleCompiler::new(),
            reconciler: DiscoveryReconciler::new(discovery),
            publisher: Arc::new(NoopPublisher),
            fabric_locks: KeyedLocks::new(),
            name_locks: KeyedLocks::new(),
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a fabric, its rules and its discovery rules
    pub async fn create_fabric(&self, command: CreateFabricCommand) -> FabricResult<Fabric> {
        validate_fabric_name(&command.name)?;
        validate_instance_count(command.instance_count)?;
        validate_unique_system_ids(&command.name, &command.identities)?;

        let _name_guard = self.name_locks.lock(&command.name).await;

        if self.store.find_fabric_by_name(&command.name).await?.is_some() {
            return Err(FabricError::FabricNameTaken(command.name));
        }
        let document = self.topology_document(command.topology_id).await?;
        self.ensure_configurations(&command.bindings).await?;

        let fabric_id = FabricId::new();
        let _fabric_guard = self.fabric_locks.lock(&fabric_id).await;

        let rules = self.compiler.compile(
            &command.name,
            command.instance_count,
            fabric_id,
            &command.bindings,
            &document,
        )?;
        let batch = self
            .reconciler
            .reconcile_create(
                self.store.as_ref(),
                FabricScope { id: fabric_id, name: &command.name },
                &command.identities,
                &command.bindings,
            )
            .await?;

        let (state, _) = FabricState::Absent.transition(&LifecycleCommand::BeginCreate)?;
        let now = Utc::now();
        let mut fabric = Fabric {
            id: fabric_id,
            name: command.name,
            topology_id: command.topology_id,
            instance_count: command.instance_count,
            validate: command.validate,
            locked: command.locked,
            bindings: command.bindings,
            identities: command.identities,
            state,
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert_fabric(fabric.clone())
            .await
            .map_err(|e| match e {
                StoreError::Conflict { .. } => FabricError::FabricNameTaken(fabric.name.clone()),
                other => other.into(),
            })?;

        let mut journal = UndoJournal::new();
        journal.record(Compensation::DeleteFabric(fabric_id));

        let fabric_rule_count = rules.len();
        if let Err(e) = self.create_steps(&mut fabric, rules, &batch, &mut journal).await {
            self.abort(fabric.state, LifecycleCommand::AbortCreate, &fabric, &e, journal)
                .await;
            return Err(e);
        }

        info!(
            fabric_id = %fabric.id,
            fabric = %fabric.name,
            fabric_rules = fabric_rule_count,
            discovery_rules = batch.inserted(),
            "Fabric created"
        );

        self.publish(FabricEvent::Created(FabricCreated {
            event_version: EVENT_VERSION,
            event_id: Uuid::now_v7(),
            fabric_id: fabric.id,
            timestamp: Utc::now(),
            name: fabric.name.clone(),
            topology_id: fabric.topology_id,
            instance_count: fabric.instance_count,
            fabric_rule_count,
            discovery_rule_count: batch.inserted(),
        }))
        .await;

        Ok(fabric)
    }

    async fn create_steps(
        &self,
        fabric: &mut Fabric,
        rules: Vec<FabricRule>,
        batch: &DiscoveryBatch,
        journal: &mut UndoJournal,
    ) -> FabricResult<()> {
        self.store.adjust_topology_usage(fabric.topology_id, 1).await?;
        journal.record(Compensation::AdjustTopologyUsage {
            id: fabric.topology_id,
            delta: -1,
        });

        let (acquired, result) = self.usage.acquire(&fabric.bindings).await;
        for id in acquired {
            journal.record(Compensation::AdjustConfigurationUsage { id, delta: -1 });
        }
        result?;

        self.commit_batch(batch, journal).await?;

        self.store.replace_fabric_rules(fabric.id, rules).await?;
        journal.record(Compensation::DeleteFabricRules(fabric.id));

        let (state, _) = fabric.state.transition(&LifecycleCommand::CompleteCreate)?;
        self.store
            .save_fabric(Fabric { state, ..fabric.clone() })
            .await?;
        fabric.state = state;
        Ok(())
    }

    /// Replace bindings, identities, instance count and flags
    pub async fn update_fabric(
        &self,
        fabric_id: FabricId,
        command: UpdateFabricCommand,
    ) -> FabricResult<Fabric> {
        let _guard = self.fabric_locks.lock(&fabric_id).await;
        let current = self.load_fabric(fabric_id).await?;

        validate_immutable_fields(&current, command.name.as_deref(), command.topology_id)?;
        let (updating, _) = current.state.transition(&LifecycleCommand::BeginUpdate)?;
        validate_instance_count(command.instance_count)?;
        validate_unique_system_ids(&current.name, &command.identities)?;

        let document = self.topology_document(current.topology_id).await?;
        self.ensure_configurations(&command.bindings).await?;

        let rules = self.compiler.compile(
            &current.name,
            command.instance_count,
            fabric_id,
            &command.bindings,
            &document,
        )?;
        let batch = self
            .reconciler
            .reconcile_update(
                self.store.as_ref(),
                FabricScope { id: fabric_id, name: &current.name },
                &command.identities,
                &command.bindings,
            )
            .await?;

        let (active, _) = updating.transition(&LifecycleCommand::CompleteUpdate)?;
        let updated = Fabric {
            instance_count: command.instance_count,
            validate: command.validate,
            locked: command.locked,
            bindings: command.bindings,
            identities: command.identities,
            state: active,
            updated_at: Utc::now(),
            ..current.clone()
        };

        let mut journal = UndoJournal::new();
        let fabric_rule_count = rules.len();
        if let Err(e) = self.update_steps(&current, &updated, rules, &batch, &mut journal).await {
            self.abort(updating, LifecycleCommand::AbortUpdate, &current, &e, journal)
                .await;
            return Err(e);
        }

        info!(
            fabric_id = %fabric_id,
            fabric = %updated.name,
            fabric_rules = fabric_rule_count,
            discovery_inserted = batch.inserted(),
            discovery_updated = batch.updated(),
            discovery_removed = batch.removed(),
            "Fabric updated"
        );

        self.publish(FabricEvent::Updated(FabricUpdated {
            event_version: EVENT_VERSION,
            event_id: Uuid::now_v7(),
            fabric_id,
            timestamp: Utc::now(),
            instance_count: updated.instance_count,
            fabric_rule_count,
            discovery_rules_inserted: batch.inserted(),
            discovery_rules_updated: batch.updated(),
            discovery_rules_removed: batch.removed(),
        }))
        .await;

        Ok(updated)
    }

    async fn update_steps(
        &self,
        current: &Fabric,
        updated: &Fabric,
        rules: Vec<FabricRule>,
        batch: &DiscoveryBatch,
        journal: &mut UndoJournal,
    ) -> FabricResult<()> {
        let (released, result) = self.usage.release(&current.bindings).await;
        for id in released {
            journal.record(Compensation::AdjustConfigurationUsage { id, delta: 1 });
        }
        result?;

        let (acquired, result) = self.usage.acquire(&updated.bindings).await;
        for id in acquired {
            journal.record(Compensation::AdjustConfigurationUsage { id, delta: -1 });
        }
        result?;

        let previous = self.store.replace_fabric_rules(current.id, rules).await?;
        journal.record(Compensation::RestoreFabricRules {
            fabric_id: current.id,
            rules: previous,
        });

        self.commit_batch(batch, journal).await?;

        self.store.save_fabric(updated.clone()).await?;
        Ok(())
    }

    /// Remove a fabric and everything it owns
    ///
    /// Configuration usage, discovery rules, fabric rules and the record are
    /// removed under an [`UndoJournal`]. Only the topology counter release
    /// is best-effort. A provisional record left behind by a failed create
    /// holds no counters, so none are released for it.
    pub async fn delete_fabric(&self, fabric_id: FabricId) -> FabricResult<DeleteReport> {
        let _guard = self.fabric_locks.lock(&fabric_id).await;
        let current = self.load_fabric(fabric_id).await?;
        let (deleting, _) = current.state.transition(&LifecycleCommand::BeginDelete)?;
        let holds_usage = current.state != FabricState::Creating;

        let mut journal = UndoJournal::new();
        let (discovery_rules_removed, fabric_rules_removed) =
            match self.delete_steps(&current, holds_usage, &mut journal).await {
                Ok(removed) => removed,
                Err(e) => {
                    self.abort(deleting, LifecycleCommand::AbortDelete, &current, &e, journal)
                        .await;
                    return Err(e);
                }
            };

        let mut warnings = Vec::new();
        if holds_usage {
            if let Err(e) = self.store.adjust_topology_usage(current.topology_id, -1).await {
                warn!(
                    fabric_id = %fabric_id,
                    topology_id = %current.topology_id,
                    error = %e,
                    "Failed to release topology usage"
                );
                warnings.push(format!(
                    "topology {} usage not released: {}",
                    current.topology_id, e
                ));
            }
        }

        deleting.transition(&LifecycleCommand::CompleteDelete)?;

        info!(
            fabric_id = %fabric_id,
            fabric = %current.name,
            discovery_rules_removed,
            fabric_rules_removed,
            warnings = warnings.len(),
            "Fabric deleted"
        );

        self.publish(FabricEvent::Deleted(FabricDeleted {
            event_version: EVENT_VERSION,
            event_id: Uuid::now_v7(),
            fabric_id,
            timestamp: Utc::now(),
            name: current.name,
            warnings: warnings.clone(),
        }))
        .await;

        Ok(DeleteReport {
            fabric_id,
            discovery_rules_removed,
            fabric_rules_removed,
            warnings,
        })
    }

    async fn delete_steps(
        &self,
        current: &Fabric,
        holds_usage: bool,
        journal: &mut UndoJournal,
    ) -> FabricResult<(usize, usize)> {
        if holds_usage {
            let (released, result) = self.usage.release(&current.bindings).await;
            for id in released {
                journal.record(Compensation::AdjustConfigurationUsage { id, delta: 1 });
            }
            result?;
        }

        let discovery_rules = self.store.list_discovery_rules(current.id).await?;
        let discovery_rules_removed = self.store.delete_discovery_rules(current.id).await?;
        if !discovery_rules.is_empty() {
            journal.record(Compensation::ApplyDiscoveryWrites(
                discovery_rules.into_iter().map(DiscoveryWrite::Insert).collect(),
            ));
        }

        let fabric_rules = self.store.list_fabric_rules(current.id).await?;
        let fabric_rules_removed = self.store.delete_fabric_rules(current.id).await?;
        journal.record(Compensation::RestoreFabricRules {
            fabric_id: current.id,
            rules: fabric_rules,
        });

        self.store.delete_fabric(current.id).await?;
        Ok((discovery_rules_removed, fabric_rules_removed))
    }

    pub async fn get_fabric(&self, fabric_id: FabricId) -> FabricResult<Fabric> {
        self.load_fabric(fabric_id).await
    }

    pub async fn list_fabrics(&self) -> FabricResult<Vec<Fabric>> {
        Ok(self.store.list_fabrics().await?)
    }

    pub async fn list_fabric_rules(&self, fabric_id: FabricId) -> FabricResult<Vec<FabricRule>> {
        self.load_fabric(fabric_id).await?;
        Ok(self.store.list_fabric_rules(fabric_id).await?)
    }

    pub async fn list_discovery_rules(&self, fabric_id: FabricId) -> FabricResult<Vec<DiscoveryRule>> {
        self.load_fabric(fabric_id).await?;
        Ok(self.store.list_discovery_rules(fabric_id).await?)
    }

    async fn load_fabric(&self, fabric_id: FabricId) -> FabricResult<Fabric> {
        self.store
            .get_fabric(fabric_id)
            .await?
            .ok_or(FabricError::FabricNotFound(fabric_id))
    }

    async fn topology_document(&self, topology_id: TopologyId) -> FabricResult<TopologyDocument> {
        let topology = self
            .store
            .get_topology(topology_id)
            .await?
            .ok_or(FabricError::TopologyNotFound(topology_id))?;
        Ok(topology.parsed_document()?)
    }

    async fn ensure_configurations(&self, bindings: &[ConfigBinding]) -> FabricResult<()> {
        for binding in bindings {
            if self
                .store
                .get_configuration(binding.configuration_id)
                .await?
                .is_none()
            {
                return Err(FabricError::ConfigurationNotFound(binding.configuration_id));
            }
        }
        Ok(())
    }

    async fn commit_batch(&self, batch: &DiscoveryBatch, journal: &mut UndoJournal) -> FabricResult<()> {
        batch.commit(self.store.as_ref()).await.map_err(|e| match e {
            StoreError::DiscoveryNameTaken { name, holder_switch } => FabricError::SystemIdInUse {
                system_id: name
                    .strip_prefix(self.reconciler.config().name_prefix.as_str())
                    .unwrap_or(&name)
                    .to_string(),
                owner_switch: holder_switch,
            },
            other => other.into(),
        })?;
        if !batch.is_empty() {
            journal.record(Compensation::ApplyDiscoveryWrites(batch.inverse()));
        }
        Ok(())
    }

    async fn abort(
        &self,
        state: FabricState,
        command: LifecycleCommand,
        fabric: &Fabric,
        cause: &FabricError,
        journal: UndoJournal,
    ) {
        error!(fabric_id = %fabric.id, fabric = %fabric.name, error = %cause, "Fabric operation failed, rolling back");
        let steps = journal.len();
        let failures = journal.unwind(self.store.as_ref()).await;
        match state.transition(&command) {
            Ok((restored, output)) => debug!(
                fabric_id = %fabric.id,
                state = ?restored,
                warnings = ?output.warnings,
                steps,
                failed_compensations = failures.len(),
                "Rollback finished"
            ),
            Err(e) => warn!(fabric_id = %fabric.id, error = %e, "Unexpected lifecycle state during rollback"),
        }
    }

    async fn publish(&self, event: FabricEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(
                fabric_id = %event.fabric_id(),
                operation = %event.operation(),
                error = %e,
                "Failed to publish fabric event"
            );
        }
    }
}
