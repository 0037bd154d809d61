// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Service
//!
//! Topologies can be edited or removed only while no fabric references
//! them. The in-use check is enforced by the store on the write itself, so
//! a fabric created concurrently cannot slip past it.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::domain::{Topology, TopologyDocument, TopologyId};
use crate::errors::{FabricError, FabricResult, StoreError};
use crate::store::TopologyStore;

/// Topology template management
pub struct TopologyService<S: TopologyStore + ?Sized> {
    store: Arc<S>,
}

impl<S: TopologyStore + ?Sized> TopologyService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validate and store a new topology
    pub async fn create_topology(&self, name: impl Into<String>, document: Value) -> FabricResult<Topology> {
        let topology = Topology::new(name, document, Utc::now())?;
        self.store.insert_topology(topology.clone()).await?;
        info!(topology_id = %topology.id, topology = %topology.name, "Topology created");
        Ok(topology)
    }

    /// Replace name and document of an unused topology
    pub async fn update_topology(
        &self,
        id: TopologyId,
        name: impl Into<String>,
        document: Value,
    ) -> FabricResult<Topology> {
        let current = self.get_topology(id).await?;
        if current.is_in_use() {
            return Err(FabricError::TopologyInUse {
                topology_id: id,
                used_count: current.used_count,
            });
        }
        TopologyDocument::from_value(&document)?;

        let updated = Topology {
            name: name.into(),
            document,
            updated_at: Utc::now(),
            ..current
        };
        self.store
            .save_unused_topology(updated.clone())
            .await
            .map_err(|e| in_use(id, e))?;
        info!(topology_id = %id, "Topology updated");
        Ok(updated)
    }

    /// Remove an unused topology
    pub async fn delete_topology(&self, id: TopologyId) -> FabricResult<()> {
        let current = self.get_topology(id).await?;
        if current.is_in_use() {
            return Err(FabricError::TopologyInUse {
                topology_id: id,
                used_count: current.used_count,
            });
        }
        self.store
            .delete_unused_topology(id)
            .await
            .map_err(|e| in_use(id, e))?;
        info!(topology_id = %id, "Topology deleted");
        Ok(())
    }

    pub async fn get_topology(&self, id: TopologyId) -> FabricResult<Topology> {
        self.store
            .get_topology(id)
            .await?
            .ok_or(FabricError::TopologyNotFound(id))
    }

    pub async fn list_topologies(&self) -> FabricResult<Vec<Topology>> {
        Ok(self.store.list_topologies().await?)
    }
}

fn in_use(id: TopologyId, err: StoreError) -> FabricError {
    match err {
        StoreError::InUse { used_count, .. } => FabricError::TopologyInUse {
            topology_id: id,
            used_count,
        },
        StoreError::NotFound { .. } => FabricError::TopologyNotFound(id),
        other => other.into(),
    }
}
