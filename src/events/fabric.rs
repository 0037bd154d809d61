// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Lifecycle Events
//!
//! Facts published after a lifecycle operation has committed. Events are
//! past tense, versioned and carry their own id and timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{FabricId, TopologyId};
use crate::subjects::FabricOperation;

/// Fabric lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FabricEvent {
    Created(FabricCreated),
    Updated(FabricUpdated),
    Deleted(FabricDeleted),
}

impl FabricEvent {
    pub fn fabric_id(&self) -> FabricId {
        match self {
            FabricEvent::Created(e) => e.fabric_id,
            FabricEvent::Updated(e) => e.fabric_id,
            FabricEvent::Deleted(e) => e.fabric_id,
        }
    }

    pub fn operation(&self) -> FabricOperation {
        match self {
            FabricEvent::Created(_) => FabricOperation::Created,
            FabricEvent::Updated(_) => FabricOperation::Updated,
            FabricEvent::Deleted(_) => FabricOperation::Deleted,
        }
    }
}

/// Fabric was created and its rules installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricCreated {
    /// Event version for schema evolution
    pub event_version: u32,
    pub event_id: Uuid,
    pub fabric_id: FabricId,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub topology_id: TopologyId,
    pub instance_count: u32,
    pub fabric_rule_count: usize,
    pub discovery_rule_count: usize,
}

/// Fabric bindings, identities or instance count changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricUpdated {
    pub event_version: u32,
    pub event_id: Uuid,
    pub fabric_id: FabricId,
    pub timestamp: DateTime<Utc>,
    pub instance_count: u32,
    pub fabric_rule_count: usize,
    pub discovery_rules_inserted: usize,
    pub discovery_rules_updated: usize,
    pub discovery_rules_removed: usize,
}

/// Fabric and everything it owned was removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricDeleted {
    pub event_version: u32,
    pub event_id: Uuid,
    pub fabric_id: FabricId,
    pub timestamp: DateTime<Utc>,
    pub name: String,

    /// Best-effort steps that failed during deletion
    pub warnings: Vec<String>,
}
