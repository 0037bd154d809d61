// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-fabric
//!
//! Deterministic records and a ready-wired lifecycle over the in-memory
//! store. Record ids are fixed constants; only ids minted by the engine
//! itself (fabric, rule ids) vary between runs.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use cim_fabric::config::DiscoveryConfig;
use cim_fabric::domain::{
    ConfigBinding, ConfigurationId, ConfigurationRecord, FabricId, SwitchIdentity, SystemId,
    Topology, TopologyId,
};
use cim_fabric::events::{EventPublisher, RecordingPublisher};
use cim_fabric::service::{CreateFabricCommand, FabricLifecycle, TopologyService, UpdateFabricCommand};
use cim_fabric::store::{ConfigurationStore, InMemoryRecordStore, TopologyStore};

pub const TOPOLOGY_ID: &str = "01934f4a-3000-7000-8000-000000003000";
pub const OTHER_TOPOLOGY_ID: &str = "01934f4a-3001-7000-8000-000000003001";

pub const CONFIG_A_ID: &str = "01934f4a-4001-7000-8000-000000004001";
pub const CONFIG_B_ID: &str = "01934f4a-4002-7000-8000-000000004002";
pub const CONFIG_C_ID: &str = "01934f4a-4003-7000-8000-000000004003";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

/// Parse a fixed UUID from a constant string
pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Two roles joined by one link
pub fn leaf_spine_document() -> Value {
    json!({
        "switches": [{"name": "spine-1"}, {"name": "leaf-1"}],
        "links": [
            {"switch1": "spine-1", "port1": "Ethernet1", "switch2": "leaf-1", "port2": "Ethernet49"}
        ]
    })
}

pub fn identity(reported_name: &str, system_id: &str) -> SwitchIdentity {
    SwitchIdentity::new(reported_name, SystemId::new(system_id).expect("Invalid system id in test fixture"))
}

/// Lifecycle, topology service and store sharing one in-memory backend
pub struct Harness {
    pub store: Arc<InMemoryRecordStore>,
    pub lifecycle: Arc<FabricLifecycle<InMemoryRecordStore>>,
    pub topologies: TopologyService<InMemoryRecordStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub topology_id: TopologyId,
    pub other_topology_id: TopologyId,
    pub cfg_a: ConfigurationId,
    pub cfg_b: ConfigurationId,
    pub cfg_c: ConfigurationId,
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryRecordStore::new());

        let topology_id = TopologyId::from_uuid(parse_uuid(TOPOLOGY_ID));
        let other_topology_id = TopologyId::from_uuid(parse_uuid(OTHER_TOPOLOGY_ID));
        for (id, name) in [(topology_id, "leaf-spine"), (other_topology_id, "leaf-spine-b")] {
            let topology = Topology::new(name, leaf_spine_document(), fixed_timestamp())
                .expect("Invalid topology fixture");
            store
                .insert_topology(Topology { id, ..topology })
                .await
                .expect("Failed to seed topology");
        }

        let mut configs = Vec::new();
        for (id, name) in [(CONFIG_A_ID, "cfgA"), (CONFIG_B_ID, "cfgB"), (CONFIG_C_ID, "cfgC")] {
            let record = ConfigurationRecord {
                id: ConfigurationId::from_uuid(parse_uuid(id)),
                ..ConfigurationRecord::new(name)
            };
            configs.push(record.id);
            store
                .insert_configuration(record)
                .await
                .expect("Failed to seed configuration");
        }

        let publisher = Arc::new(RecordingPublisher::new());
        let lifecycle = FabricLifecycle::new(store.clone(), DiscoveryConfig::default())
            .with_publisher(publisher.clone() as Arc<dyn EventPublisher>);

        Self {
            topologies: TopologyService::new(store.clone()),
            lifecycle: Arc::new(lifecycle),
            store,
            publisher,
            topology_id,
            other_topology_id,
            cfg_a: configs[0],
            cfg_b: configs[1],
            cfg_c: configs[2],
        }
    }

    /// `spine-1 → cfgA`, `leaf-1 → cfgB`
    pub fn bindings(&self) -> Vec<ConfigBinding> {
        vec![
            ConfigBinding::new(self.cfg_a, "spine-1"),
            ConfigBinding::new(self.cfg_b, "leaf-1"),
        ]
    }

    /// Fabric `F1`: two replicas, spine and leaf of replica 1 identified
    pub fn f1_command(&self) -> CreateFabricCommand {
        CreateFabricCommand {
            name: "F1".into(),
            topology_id: self.topology_id,
            instance_count: 2,
            validate: false,
            locked: false,
            bindings: self.bindings(),
            identities: vec![identity("F1_1_spine-1", "sysA"), identity("F1_1_leaf-1", "sysB")],
        }
    }

    /// Update keeping everything of `F1` except the given identities
    pub fn f1_update(&self, identities: Vec<SwitchIdentity>) -> UpdateFabricCommand {
        UpdateFabricCommand {
            name: None,
            topology_id: None,
            instance_count: 2,
            validate: false,
            locked: false,
            bindings: self.bindings(),
            identities,
        }
    }

    pub async fn config_usage(&self, id: ConfigurationId) -> u64 {
        self.store
            .get_configuration(id)
            .await
            .expect("Store read failed")
            .expect("Configuration missing")
            .used_count
    }

    pub async fn topology_usage(&self) -> u64 {
        self.store
            .get_topology(self.topology_id)
            .await
            .expect("Store read failed")
            .expect("Topology missing")
            .used_count
    }

    /// `(fabric rules, discovery rules)` stored for a fabric
    pub async fn rule_counts(&self, fabric_id: FabricId) -> (usize, usize) {
        use cim_fabric::store::{DiscoveryRuleStore, FabricRuleStore};
        (
            self.store.list_fabric_rules(fabric_id).await.expect("Store read failed").len(),
            self.store
                .list_discovery_rules(fabric_id)
                .await
                .expect("Store read failed")
                .len(),
        )
    }
}
