// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for fabric lifecycle events
//!
//! ```text
//! {root}.fabric.{fabric_id}.{operation}
//! ```
//!
//! - Precise subscriptions (`infrastructure.fabric.<id>.created`)
//! - Per-fabric wildcards (`infrastructure.fabric.<id>.>`)
//! - Global subscriptions (`infrastructure.fabric.>`)
//!
//! # Examples
//!
//! ```rust
//! use cim_fabric::domain::FabricId;
//! use cim_fabric::subjects::{fabric_subject, fabric_wildcard, FabricOperation};
//!
//! let id = FabricId::new();
//! let subject = fabric_subject("infrastructure", &id, FabricOperation::Created);
//! assert_eq!(subject, format!("infrastructure.fabric.{}.created", id));
//! assert_eq!(fabric_wildcard("infrastructure"), "infrastructure.fabric.>");
//! ```

use std::fmt;

use crate::domain::FabricId;

/// Default root namespace
pub const INFRASTRUCTURE_ROOT: &str = "infrastructure";

/// Aggregate token for fabric subjects
pub const FABRIC_AGGREGATE: &str = "fabric";

/// Fabric lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FabricOperation {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for FabricOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FabricOperation::Created => write!(f, "created"),
            FabricOperation::Updated => write!(f, "updated"),
            FabricOperation::Deleted => write!(f, "deleted"),
        }
    }
}

/// Subject for one operation on one fabric
pub fn fabric_subject(root: &str, fabric_id: &FabricId, operation: FabricOperation) -> String {
    format!("{}.{}.{}.{}", root, FABRIC_AGGREGATE, fabric_id, operation)
}

/// Subscription covering every fabric event under `root`
pub fn fabric_wildcard(root: &str) -> String {
    format!("{}.{}.>", root, FABRIC_AGGREGATE)
}
