// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for fabric engine operations

use std::fmt;
use thiserror::Error;

use crate::domain::{
    ConfigurationId, FabricId, IdentityError, SystemIdError, TopologyError, TopologyId,
};
use crate::state_machine::TransitionError;

/// Errors raised by a record store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Unique key already taken
    #[error("{kind} '{key}' already exists")]
    Conflict { kind: &'static str, key: String },

    /// Discovery rule name already held by another switch
    #[error("Discovery rule '{name}' is held by switch {holder_switch}")]
    DiscoveryNameTaken { name: String, holder_switch: String },

    /// Record still referenced
    #[error("{kind} {id} is in use ({used_count} references)")]
    InUse {
        kind: &'static str,
        id: String,
        used_count: u64,
    },

    /// Counter would drop below zero
    #[error("Usage counter of {kind} {id} cannot go below zero")]
    CounterUnderflow { kind: &'static str, id: String },

    /// Store rejected or could not perform the write
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Fabric field that cannot change after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmutableField {
    Name,
    Topology,
}

impl fmt::Display for ImmutableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImmutableField::Name => write!(f, "name"),
            ImmutableField::Topology => write!(f, "base topology"),
        }
    }
}

/// Errors surfaced by fabric lifecycle operations
#[derive(Debug, Error)]
pub enum FabricError {
    /// Reported switch name does not fit `<fabric>_<replica>_<role>`
    #[error("Malformed switch name '{reported_name}' in fabric '{fabric}': {source}")]
    MalformedIdentity {
        fabric: String,
        reported_name: String,
        #[source]
        source: IdentityError,
    },

    /// Two identities in one batch share a system id
    #[error("System id {system_id} is repeated in fabric '{fabric}'")]
    DuplicateSystemId { fabric: String, system_id: String },

    /// System id already claimed by a switch of another fabric
    #[error("System id {system_id} is already assigned to switch {owner_switch}")]
    SystemIdInUse {
        system_id: String,
        owner_switch: String,
    },

    /// Two identities in one batch report the same switch name
    #[error("Switch {switch_name} is listed more than once in fabric '{fabric}'")]
    DuplicateSwitchName { fabric: String, switch_name: String },

    /// Topology role with no configuration binding
    #[error("Role '{role}' of fabric '{fabric}' has no configuration binding")]
    MissingRoleBinding { fabric: String, role: String },

    /// Attempt to change name or topology on update
    #[error("Cannot change {field} of fabric {fabric_id}")]
    ImmutableFieldChanged {
        fabric_id: FabricId,
        field: ImmutableField,
    },

    /// Topology still referenced by fabrics
    #[error("Topology {topology_id} is in use by {used_count} fabric(s)")]
    TopologyInUse {
        topology_id: TopologyId,
        used_count: u64,
    },

    #[error("Fabric instance count must be at least 1, got {0}")]
    InvalidInstanceCount(u32),

    #[error("Invalid fabric name '{name}': {reason}")]
    InvalidFabricName { name: String, reason: String },

    #[error("Fabric name '{0}' is already in use")]
    FabricNameTaken(String),

    #[error("Invalid system id: {0}")]
    InvalidSystemId(#[from] SystemIdError),

    #[error("Invalid topology: {0}")]
    InvalidTopology(#[from] TopologyError),

    #[error("Topology not found: {0}")]
    TopologyNotFound(TopologyId),

    #[error("Fabric not found: {0}")]
    FabricNotFound(FabricId),

    #[error("Configuration not found: {0}")]
    ConfigurationNotFound(ConfigurationId),

    #[error("Lifecycle transition rejected: {0}")]
    Transition(#[from] TransitionError),

    /// Record store rejected a write
    #[error("Record store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

/// Result type for fabric operations
pub type FabricResult<T> = Result<T, FabricError>;
