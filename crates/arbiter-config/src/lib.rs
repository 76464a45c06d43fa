// crates/arbiter-config/src/lib.rs
// ============================================================================
// Module: Arbiter Config Library
// Description: Canonical config model, validation, and engine construction.
// Purpose: Single source of truth for arbiter.toml semantics.
// Dependencies: arbiter-core, serde, toml
// ============================================================================

//! ## Overview
//! `arbiter-config` defines the canonical configuration model for the
//! procedure arbiter. It provides strict, fail-closed validation and builds
//! a configured [`arbiter_core::ArbitrationEngine`].
//!
//! Security posture: config inputs are untrusted and the ledger signing key
//! is only ever read from the environment.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
