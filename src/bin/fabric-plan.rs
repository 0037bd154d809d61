// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Plan
//!
//! Dry run of a fabric creation: reads a plan document, compiles the fabric
//! rules and the discovery rules the identities would produce, and prints
//! both as JSON. Nothing is persisted.
//!
//! Run with: cargo run --bin fabric-plan -- plan.json
//! (reads stdin when no path is given)
//!
//! ```json
//! {
//!   "topology": { "switches": [{ "name": "spine-1" }], "links": [] },
//!   "fabric": {
//!     "name": "F1",
//!     "instance": 2,
//!     "config_json": [{ "configuration_id": "…", "name": "spine-1" }],
//!     "switch_detail": [{ "name": "F1_1_spine-1", "system_id": "sysA" }]
//!   }
//! }
//! ```

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use cim_fabric::{
    discovery::FabricScope,
    domain::{ConfigBinding, DiscoveryRule, FabricId, FabricRule, SwitchIdentity, TopologyDocument},
    DiscoveryReconciler, EngineConfig, InMemoryRecordStore, RuleCompiler,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Plan {
    topology: Value,
    fabric: FabricPlan,
}

#[derive(Debug, Deserialize)]
struct FabricPlan {
    name: String,
    #[serde(alias = "instance_count")]
    instance: u32,
    #[serde(alias = "bindings")]
    config_json: Vec<ConfigBinding>,
    #[serde(default, alias = "identities")]
    switch_detail: Vec<SwitchIdentity>,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    fabric_id: FabricId,
    fabric_rules: Vec<FabricRule>,
    discovery_rules: Vec<DiscoveryRule>,
}

fn read_plan() -> Result<Plan> {
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read plan file {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read plan from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Plan is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = EngineConfig::from_env().context("Invalid engine configuration")?;
    let plan = read_plan()?;

    let document = TopologyDocument::from_value(&plan.topology).context("Invalid topology")?;
    let fabric_id = FabricId::new();

    let fabric_rules = RuleCompiler::new()
        .compile(
            &plan.fabric.name,
            plan.fabric.instance,
            fabric_id,
            &plan.fabric.config_json,
            &document,
        )
        .context("Rule compilation failed")?;

    let store = Arc::new(InMemoryRecordStore::new());
    let batch = DiscoveryReconciler::new(config.discovery)
        .reconcile_create(
            store.as_ref(),
            FabricScope { id: fabric_id, name: &plan.fabric.name },
            &plan.fabric.switch_detail,
            &plan.fabric.config_json,
        )
        .await
        .context("Discovery reconciliation failed")?;
    let discovery_rules: Vec<DiscoveryRule> = batch.written_rules().cloned().collect();

    info!(
        fabric = %plan.fabric.name,
        fabric_rules = fabric_rules.len(),
        discovery_rules = discovery_rules.len(),
        "Plan compiled"
    );

    let output = PlanOutput {
        fabric_id,
        fabric_rules,
        discovery_rules,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render plan")?
    );

    Ok(())
}
