// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Fabric Management
//!
//! Application services orchestrating the domain, the record store and
//! event publication.
//!
//! # Architecture
//!
//! ```text
//! Command
//!     ↓
//! FabricLifecycle ── RuleCompiler (pure)
//!     │           └─ DiscoveryReconciler (staged batch)
//!     ↓
//! RecordStore writes + UndoJournal
//!     ↓
//! EventPublisher (NATS)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cim_fabric::config::DiscoveryConfig;
//! use cim_fabric::service::{FabricLifecycle, TopologyService};
//! use cim_fabric::store::InMemoryRecordStore;
//!
//! let store = Arc::new(InMemoryRecordStore::new());
//! let topologies = TopologyService::new(store.clone());
//! let fabrics = FabricLifecycle::new(store, DiscoveryConfig::default());
//!
//! let topology = topologies.create_topology("leaf-spine", document).await?;
//! let fabric = fabrics.create_fabric(command).await?;
//! ```

pub mod fabric;
pub mod locks;
pub mod topology;
pub mod undo;

pub use fabric::{CreateFabricCommand, DeleteReport, FabricLifecycle, UpdateFabricCommand};
pub use locks::KeyedLocks;
pub use topology::TopologyService;
pub use undo::{Compensation, UndoJournal};
