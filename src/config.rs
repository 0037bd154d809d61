// Copyright (c) 2025 - Cowboy AI, Inc.
//! Engine configuration
//!
//! Defaults reproduce the discovery rule conventions switches expect
//! (`serial_<system id>`, priority 100, `serial_id` matching). Every value
//! can be overridden from the environment.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::nats::NatsConfig;

/// Configuration loading error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Discovery rule conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Priority assigned to generated serial rules
    pub priority: u32,

    /// Match kind written on generated rules
    pub match_kind: String,

    /// Prefix of the derived rule name
    pub name_prefix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            priority: 100,
            match_kind: "serial_id".to_string(),
            name_prefix: "serial_".to_string(),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub discovery: DiscoveryConfig,
    pub nats: NatsConfig,

    /// Publish lifecycle events after each committed operation
    pub publish_events: bool,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// | Variable | Default |
    /// | --- | --- |
    /// | `FABRIC_DISCOVERY_PRIORITY` | `100` |
    /// | `FABRIC_DISCOVERY_MATCH` | `serial_id` |
    /// | `FABRIC_DISCOVERY_PREFIX` | `serial_` |
    /// | `FABRIC_PUBLISH_EVENTS` | `false` |
    /// | `NATS_URL` | `nats://localhost:4222` (comma separated) |
    /// | `NATS_CLIENT_NAME` | `cim-fabric` |
    /// | `FABRIC_SUBJECT_ROOT` | `infrastructure` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let discovery = DiscoveryConfig {
            priority: parse_or(&lookup, "FABRIC_DISCOVERY_PRIORITY", defaults.discovery.priority)?,
            match_kind: lookup("FABRIC_DISCOVERY_MATCH").unwrap_or(defaults.discovery.match_kind),
            name_prefix: lookup("FABRIC_DISCOVERY_PREFIX").unwrap_or(defaults.discovery.name_prefix),
        };

        let mut nats = defaults.nats;
        if let Some(urls) = lookup("NATS_URL") {
            nats.servers = urls
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(name) = lookup("NATS_CLIENT_NAME") {
            nats.name = name;
        }
        if let Some(root) = lookup("FABRIC_SUBJECT_ROOT") {
            nats.subject_root = root;
        }

        Ok(Self {
            discovery,
            nats,
            publish_events: parse_or(&lookup, "FABRIC_PUBLISH_EVENTS", defaults.publish_events)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
