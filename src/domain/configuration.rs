// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Records
//!
//! Configuration content lives outside this crate. Fabrics only reference a
//! configuration by id and keep its usage counter accurate.

use serde::{Deserialize, Serialize};

use super::ids::ConfigurationId;

/// External configuration record as seen by the fabric engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub id: ConfigurationId,
    pub name: String,

    /// Number of live fabric bindings referencing this configuration
    pub used_count: u64,
}

impl ConfigurationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ConfigurationId::new(),
            name: name.into(),
            used_count: 0,
        }
    }
}
