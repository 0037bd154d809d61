// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Domain Events
//!
//! Events are emitted only after a lifecycle operation has fully committed.
//! Publication is fire-and-report: a failed publish is logged by the
//! lifecycle and never undoes the committed operation.
//!
//! - [`fabric`] - event payloads
//! - [`publisher`] - publisher trait and implementations

pub mod fabric;
pub mod publisher;

pub use fabric::{FabricCreated, FabricDeleted, FabricEvent, FabricUpdated};
pub use publisher::{
    publisher_from_config, EventPublisher, NatsEventPublisher, NoopPublisher, PublishError,
    RecordingPublisher,
};
