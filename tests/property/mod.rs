// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of rule compilation, the switch naming grammar and usage
//! accounting that must hold for all valid inputs.

mod compile;
mod identity;
mod lifecycle;
