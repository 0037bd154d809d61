// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Lifecycles are modelled as pure transition functions:
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! Transitions perform no I/O. Callers persist the resulting state.
//!
//! # Example
//!
//! ```rust
//! use cim_fabric::domain::FabricState;
//! use cim_fabric::state_machine::{LifecycleCommand, StateMachine};
//!
//! let (state, _) = FabricState::Absent
//!     .transition(&LifecycleCommand::BeginCreate)
//!     .unwrap();
//! assert_eq!(state, FabricState::Creating);
//! assert!(!state.can_transition(&LifecycleCommand::BeginUpdate));
//! ```

pub mod fabric_lifecycle;

pub use fabric_lifecycle::{LifecycleCommand, TransitionOutput};

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Input not accepted in the current state
    #[error("Invalid transition from {from} via {input}")]
    InvalidTransition { from: String, input: String },
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }
}
