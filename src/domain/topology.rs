// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Templates
//!
//! A topology is a reusable graph of switch roles and the links between
//! them. The graph document is stored as opaque JSON; [`TopologyDocument`]
//! is the typed view the rule compiler works from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use super::ids::TopologyId;

/// Topology document validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Malformed topology document: {0}")]
    Malformed(String),

    #[error("Topology defines no switch roles")]
    NoRoles,

    #[error("Topology role name is empty")]
    EmptyRole,

    #[error("Topology role '{0}' is defined more than once")]
    DuplicateRole(String),

    #[error("Link references unknown role '{0}'")]
    UnknownLinkEndpoint(String),
}

/// One switch role in the topology graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySwitch {
    /// Role name, e.g. `spine-1`
    pub name: String,

    /// Everything else the designer attached to the node
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Link between two roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyLink {
    pub switch1: String,
    #[serde(default)]
    pub port1: String,
    pub switch2: String,
    #[serde(default)]
    pub port2: String,
}

/// A link seen from one end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleNeighbor {
    pub local_port: String,
    pub remote_role: String,
    pub remote_port: String,
}

/// Typed view of a topology graph document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyDocument {
    pub switches: Vec<TopologySwitch>,

    #[serde(default)]
    pub links: Vec<TopologyLink>,
}

impl TopologyDocument {
    /// Parse and validate a stored graph document
    pub fn from_value(value: &Value) -> Result<Self, TopologyError> {
        let document: Self = serde_json::from_value(value.clone())
            .map_err(|e| TopologyError::Malformed(e.to_string()))?;
        document.validate()?;
        Ok(document)
    }

    /// Check structural invariants
    ///
    /// - At least one role
    /// - Role names non-empty and unique
    /// - Links only reference declared roles
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.switches.is_empty() {
            return Err(TopologyError::NoRoles);
        }

        let mut seen = HashSet::new();
        for switch in &self.switches {
            if switch.name.trim().is_empty() {
                return Err(TopologyError::EmptyRole);
            }
            if !seen.insert(switch.name.as_str()) {
                return Err(TopologyError::DuplicateRole(switch.name.clone()));
            }
        }

        for link in &self.links {
            for end in [&link.switch1, &link.switch2] {
                if !seen.contains(end.as_str()) {
                    return Err(TopologyError::UnknownLinkEndpoint(end.clone()));
                }
            }
        }

        Ok(())
    }

    /// Role names in document order
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.switches.iter().map(|s| s.name.as_str())
    }

    pub fn role_count(&self) -> usize {
        self.switches.len()
    }

    /// All links touching `role`, oriented so `role` is the local end
    pub fn neighbors_of(&self, role: &str) -> Vec<RoleNeighbor> {
        let mut neighbors = Vec::new();
        for link in &self.links {
            if link.switch1 == role {
                neighbors.push(RoleNeighbor {
                    local_port: link.port1.clone(),
                    remote_role: link.switch2.clone(),
                    remote_port: link.port2.clone(),
                });
            }
            if link.switch2 == role {
                neighbors.push(RoleNeighbor {
                    local_port: link.port2.clone(),
                    remote_role: link.switch1.clone(),
                    remote_port: link.port1.clone(),
                });
            }
        }
        neighbors
    }
}

/// Stored topology template
///
/// The document is frozen while `used_count > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub id: TopologyId,
    pub name: String,
    pub document: Value,
    /// Number of fabrics built from this topology
    pub used_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Topology {
    /// Create a topology after validating its document
    pub fn new(
        name: impl Into<String>,
        document: Value,
        now: DateTime<Utc>,
    ) -> Result<Self, TopologyError> {
        TopologyDocument::from_value(&document)?;
        Ok(Self {
            id: TopologyId::new(),
            name: name.into(),
            document,
            used_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn parsed_document(&self) -> Result<TopologyDocument, TopologyError> {
        TopologyDocument::from_value(&self.document)
    }

    pub fn is_in_use(&self) -> bool {
        self.used_count > 0
    }
}
