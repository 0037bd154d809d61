// Copyright (c) 2025 - Cowboy AI, Inc.
//! Discovery Reconciler
//!
//! Turns a fabric's identity list into a staged [`DiscoveryBatch`]. The
//! store is only read here; the caller decides when to commit.
//!
//! Per identity:
//!
//! 1. Parse the reported name. A malformed name aborts the whole batch.
//! 2. Find the binding for the parsed role. No binding means the identity is
//!    skipped.
//! 3. Derive the rule name from the system id and check who holds it.
//!    Another fabric holding it aborts with `SystemIdInUse`. On create, a
//!    holder in this fabric or an earlier identity of the batch aborts with
//!    `DuplicateSystemId`.
//! 4. Stage an insert, or on update rewrite the switch's existing rule in
//!    place when its configuration or system id changed.
//!
//! On update, rules for switches that are no longer listed are staged for
//! deletion.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::debug;

use super::staging::DiscoveryBatch;
use crate::config::DiscoveryConfig;
use crate::domain::{
    binding_for_role, discovery_rule_name, ConfigBinding, DiscoveryRule, DiscoveryRuleId, FabricId,
    IdentityMatcher, SwitchIdentity,
};
use crate::errors::{FabricError, FabricResult};
use crate::store::DiscoveryRuleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReconcileMode {
    Create,
    Update,
}

/// Fabric whose identities are being reconciled
#[derive(Debug, Clone, Copy)]
pub struct FabricScope<'a> {
    pub id: FabricId,
    pub name: &'a str,
}

/// Builds discovery batches from identity lists
#[derive(Debug, Clone)]
pub struct DiscoveryReconciler {
    config: DiscoveryConfig,
}

impl DiscoveryReconciler {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Stage the discovery rules of a fabric being created
    pub async fn reconcile_create<S>(
        &self,
        store: &S,
        fabric: FabricScope<'_>,
        identities: &[SwitchIdentity],
        bindings: &[ConfigBinding],
    ) -> FabricResult<DiscoveryBatch>
    where
        S: DiscoveryRuleStore + ?Sized,
    {
        self.reconcile(store, fabric, identities, bindings, ReconcileMode::Create)
            .await
    }

    /// Stage the changes that bring an existing fabric's rules in line with
    /// a new identity list
    ///
    /// A system id held by another switch of the same fabric may move to a
    /// new switch in one update. Ids held by other fabrics stay fatal.
    pub async fn reconcile_update<S>(
        &self,
        store: &S,
        fabric: FabricScope<'_>,
        identities: &[SwitchIdentity],
        bindings: &[ConfigBinding],
    ) -> FabricResult<DiscoveryBatch>
    where
        S: DiscoveryRuleStore + ?Sized,
    {
        self.reconcile(store, fabric, identities, bindings, ReconcileMode::Update)
            .await
    }

    async fn reconcile<S>(
        &self,
        store: &S,
        fabric: FabricScope<'_>,
        identities: &[SwitchIdentity],
        bindings: &[ConfigBinding],
        mode: ReconcileMode,
    ) -> FabricResult<DiscoveryBatch>
    where
        S: DiscoveryRuleStore + ?Sized,
    {
        let matcher = IdentityMatcher::new(fabric.name);
        let mut existing: HashMap<String, DiscoveryRule> = match mode {
            ReconcileMode::Create => HashMap::new(),
            ReconcileMode::Update => store
                .list_discovery_rules(fabric.id)
                .await?
                .into_iter()
                .map(|r| (r.switch_name.clone(), r))
                .collect(),
        };

        let mut batch = DiscoveryBatch::new();
        let mut listed: HashSet<&str> = HashSet::new();

        for identity in identities {
            let slot = matcher
                .match_name(&identity.reported_name)
                .map_err(|source| FabricError::MalformedIdentity {
                    fabric: fabric.name.to_string(),
                    reported_name: identity.reported_name.clone(),
                    source,
                })?;

            let Some(binding) = binding_for_role(bindings, &slot.role) else {
                debug!(
                    fabric_id = %fabric.id,
                    switch = %identity.reported_name,
                    role = %slot.role,
                    "No binding for role, identity skipped"
                );
                continue;
            };

            if !listed.insert(identity.reported_name.as_str()) {
                return Err(FabricError::DuplicateSwitchName {
                    fabric: fabric.name.to_string(),
                    switch_name: identity.reported_name.clone(),
                });
            }

            let name = discovery_rule_name(&self.config.name_prefix, &identity.system_id);
            let duplicate = || FabricError::DuplicateSystemId {
                fabric: fabric.name.to_string(),
                system_id: identity.system_id.to_string(),
            };

            if batch.claims_name(&name) {
                return Err(duplicate());
            }

            if let Some(holder) = store.find_discovery_rule(&name).await? {
                if holder.fabric_id != fabric.id {
                    return Err(FabricError::SystemIdInUse {
                        system_id: identity.system_id.to_string(),
                        owner_switch: holder.switch_name,
                    });
                }
                if mode == ReconcileMode::Create {
                    return Err(duplicate());
                }
            }

            let now = Utc::now();
            match existing.remove(&identity.reported_name) {
                Some(current) => {
                    if current.configuration_id == binding.configuration_id && current.name == name {
                        debug!(switch = %identity.reported_name, "Discovery rule unchanged");
                        continue;
                    }
                    let after = DiscoveryRule {
                        name,
                        subrules: vec![identity.system_id.to_string()],
                        configuration_id: binding.configuration_id,
                        replica: slot.replica,
                        updated_at: now,
                        ..current.clone()
                    };
                    debug!(
                        switch = %identity.reported_name,
                        system_id = %identity.system_id,
                        "Discovery rule staged for update"
                    );
                    batch.stage_update(current, after);
                }
                None => {
                    debug!(
                        switch = %identity.reported_name,
                        system_id = %identity.system_id,
                        "Discovery rule staged for insert"
                    );
                    batch.stage_insert(DiscoveryRule {
                        id: DiscoveryRuleId::new(),
                        name,
                        priority: self.config.priority,
                        match_kind: self.config.match_kind.clone(),
                        subrules: vec![identity.system_id.to_string()],
                        configuration_id: binding.configuration_id,
                        fabric_id: fabric.id,
                        replica: slot.replica,
                        switch_name: identity.reported_name.clone(),
                        created_at: now,
                        updated_at: now,
                    });
                }
            }
        }

        // Whatever is left belongs to switches no longer listed
        let mut released: Vec<DiscoveryRule> = existing.into_values().collect();
        released.sort_by(|a, b| a.switch_name.cmp(&b.switch_name));
        for rule in released {
            debug!(switch = %rule.switch_name, "Discovery rule staged for release");
            batch.stage_delete(rule);
        }

        Ok(batch)
    }
}
