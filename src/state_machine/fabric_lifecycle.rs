// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Lifecycle State Machine
//!
//! # States
//!
//! ```text
//! Absent → Creating → Active ⇄ Updating
//!              ↓  ↘      ↓ ↑
//!           Absent  → Deleting → Absent
//! ```
//!
//! - A failed create returns to `Absent` (provisional record removed)
//! - A provisional record whose removal failed can still be deleted
//! - A failed update returns to `Active` with the prior attributes
//! - A failed delete returns to `Active` with everything restored
//! - There is no persisted partially-updated state

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::FabricState;

/// Lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    BeginCreate,
    CompleteCreate,
    AbortCreate,
    BeginUpdate,
    CompleteUpdate,
    AbortUpdate,
    BeginDelete,
    CompleteDelete,
    AbortDelete,
}

/// Transition output with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutput {
    /// Warnings generated during transition
    pub warnings: Vec<String>,

    /// Whether the transition discards work
    pub is_critical: bool,
}

impl TransitionOutput {
    pub fn ok() -> Self {
        Self {
            warnings: Vec::new(),
            is_critical: false,
        }
    }

    pub fn critical(warning: impl Into<String>) -> Self {
        Self {
            warnings: vec![warning.into()],
            is_critical: true,
        }
    }
}

impl StateMachine for FabricState {
    type Input = LifecycleCommand;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use FabricState::*;
        use LifecycleCommand::*;

        match (self, input) {
            (Absent, BeginCreate) => Ok((Creating, TransitionOutput::ok())),
            (Creating, CompleteCreate) => Ok((Active, TransitionOutput::ok())),
            (Creating, AbortCreate) => Ok((
                Absent,
                TransitionOutput::critical("Fabric creation rolled back"),
            )),

            (Active, BeginUpdate) => Ok((Updating, TransitionOutput::ok())),
            (Updating, CompleteUpdate) => Ok((Active, TransitionOutput::ok())),
            (Updating, AbortUpdate) => Ok((
                Active,
                TransitionOutput::critical("Fabric update reverted"),
            )),

            (Active, BeginDelete) => Ok((Deleting, TransitionOutput::ok())),
            (Creating, BeginDelete) => Ok((
                Deleting,
                TransitionOutput::critical("Removing orphaned provisional fabric"),
            )),
            (Deleting, CompleteDelete) => Ok((Absent, TransitionOutput::ok())),
            (Deleting, AbortDelete) => Ok((
                Active,
                TransitionOutput::critical("Fabric deletion reverted"),
            )),

            (state, input) => Err(TransitionError::InvalidTransition {
                from: format!("{:?}", state),
                input: format!("{:?}", input),
            }),
        }
    }
}
