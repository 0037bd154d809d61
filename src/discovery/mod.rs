// Copyright (c) 2025 - Cowboy AI, Inc.
//! Discovery rule reconciliation
//!
//! - [`reconciler`] - identity list → staged batch
//! - [`staging`] - the batch itself, committed or discarded as a whole

pub mod reconciler;
pub mod staging;

pub use reconciler::{DiscoveryReconciler, FabricScope};
pub use staging::DiscoveryBatch;
