// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event publishers
//!
//! The lifecycle only sees [`EventPublisher`]. Production wiring uses
//! [`NatsEventPublisher`]; [`NoopPublisher`] disables publication and
//! [`RecordingPublisher`] keeps events in memory for inspection.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::FabricEvent;
use crate::config::EngineConfig;
use crate::nats::{NatsClient, NatsError};
use crate::subjects::fabric_subject;

/// Publishing failure
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("NATS error: {0}")]
    Nats(#[from] NatsError),

    #[error("Publisher unavailable: {0}")]
    Unavailable(String),
}

/// Sink for fabric lifecycle events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &FabricEvent) -> Result<(), PublishError>;
}

/// Publishes to `{root}.fabric.{fabric_id}.{operation}`
pub struct NatsEventPublisher {
    client: NatsClient,
    subject_root: String,
}

impl NatsEventPublisher {
    pub fn new(client: NatsClient, subject_root: impl Into<String>) -> Self {
        Self {
            client,
            subject_root: subject_root.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, event: &FabricEvent) -> Result<(), PublishError> {
        let subject = fabric_subject(&self.subject_root, &event.fabric_id(), event.operation());
        self.client.publish(&subject, event).await?;
        Ok(())
    }
}

/// Build the publisher selected by the engine configuration
///
/// Connects to NATS when `publish_events` is set, otherwise returns a
/// [`NoopPublisher`].
pub async fn publisher_from_config(config: &EngineConfig) -> Result<Arc<dyn EventPublisher>, PublishError> {
    if !config.publish_events {
        info!("Fabric event publication disabled");
        return Ok(Arc::new(NoopPublisher));
    }
    let client = NatsClient::connect(&config.nats).await?;
    Ok(Arc::new(NatsEventPublisher::new(client, config.nats.subject_root.clone())))
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: &FabricEvent) -> Result<(), PublishError> {
        debug!(fabric_id = %event.fabric_id(), operation = %event.operation(), "Event publication disabled");
        Ok(())
    }
}

/// Keeps published events in memory
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<FabricEvent>>,
    fail: Mutex<bool>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.lock().await = fail;
    }

    pub async fn events(&self) -> Vec<FabricEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &FabricEvent) -> Result<(), PublishError> {
        if *self.fail.lock().await {
            return Err(PublishError::Unavailable("recording publisher set to fail".into()));
        }
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
