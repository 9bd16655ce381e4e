// crates/gatesim-config/src/lib.rs
// ============================================================================
// Module: Gatesim Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for gatesim.toml semantics.
// Dependencies: gate-logic, serde, toml
// ============================================================================

//! ## Overview
//! `gatesim-config` defines the configuration model for the gate simulator
//! CLI. Config inputs are untrusted: loading is size and path limited and
//! validation fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
