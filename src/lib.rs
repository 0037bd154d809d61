// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network fabric engine for the Composable Information Machine
//!
//! Expands topology templates into per-switch fabric rules, keeps the
//! system-id → discovery rule table consistent across fabric create, update
//! and delete, and rolls back every partial write when an operation fails.
//!
//! - [`compiler`] - topology + bindings → fabric rules
//! - [`discovery`] - identities → staged discovery rule batch
//! - [`usage`] - configuration usage counters
//! - [`service`] - fabric lifecycle and topology management
//! - [`store`] - record store traits and the in-memory store
//! - [`events`] - lifecycle events published over NATS

pub mod compiler;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod errors;
pub mod events;
pub mod nats;
pub mod service;
pub mod state_machine;
pub mod store;
pub mod subjects;
pub mod usage;

// Re-export commonly used types
pub use compiler::RuleCompiler;
pub use config::{ConfigError, DiscoveryConfig, EngineConfig};
pub use discovery::{DiscoveryBatch, DiscoveryReconciler};
pub use errors::{FabricError, FabricResult, StoreError};
pub use nats::{NatsClient, NatsConfig};
pub use service::{
    CreateFabricCommand, DeleteReport, FabricLifecycle, TopologyService, UpdateFabricCommand,
};
pub use store::{InMemoryRecordStore, RecordStore};
pub use usage::ConfigUsageTracker;
