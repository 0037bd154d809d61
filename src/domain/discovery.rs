// Copyright (c) 2025 - Cowboy AI, Inc.
//! Discovery Rules
//!
//! A discovery rule binds one physical switch, identified by its
//! hardware-issued system id, to a configuration and a slot in a fabric.
//! Rule names are derived from the system id, so the name index doubles as
//! the global system-id uniqueness index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ids::{ConfigurationId, DiscoveryRuleId, FabricId};

/// System id validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SystemIdError {
    #[error("System id is empty")]
    Empty,

    #[error("System id contains whitespace: {0:?}")]
    Whitespace(String),
}

/// Hardware-issued switch identifier (serial number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemId(String);

impl SystemId {
    pub fn new(id: impl Into<String>) -> Result<Self, SystemIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(SystemIdError::Empty);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(SystemIdError::Whitespace(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SystemId {
    type Error = SystemIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SystemId {
    type Error = SystemIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SystemId> for String {
    fn from(id: SystemId) -> Self {
        id.0
    }
}

/// Derived discovery rule name: `<prefix><system id>`
pub fn discovery_rule_name(prefix: &str, system_id: &SystemId) -> String {
    format!("{}{}", prefix, system_id)
}

/// Physical identity → configuration + fabric slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRule {
    pub id: DiscoveryRuleId,

    /// Globally unique, derived from the system id
    pub name: String,

    pub priority: u32,

    /// Match kind understood by the discovery agent, `serial_id`
    #[serde(rename = "match")]
    pub match_kind: String,

    /// Values matched against; holds the system id
    pub subrules: Vec<String>,

    pub configuration_id: ConfigurationId,
    pub fabric_id: FabricId,
    pub replica: u32,

    /// Reported switch name, `<fabric>_<replica>_<role>`
    pub switch_name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscoveryRule {
    /// System id this rule matches, if the rule is a serial match
    pub fn system_id(&self) -> Option<&str> {
        self.subrules.first().map(String::as_str)
    }
}
