// crates/arbiter-core/src/interfaces/mod.rs
// ============================================================================
// Module: Arbiter Interfaces
// Description: Backend-agnostic interfaces for time and evidence persistence.
// Purpose: Define the contract surfaces the arbiter consumes from its host.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the arbiter integrates with external systems without
//! embedding backend-specific details. The host supplies a [`Clock`] and a
//! durable [`EvidenceBlockSink`]; physical storage stays outside this crate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::EvidenceBlock;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source for stateful components.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

// ============================================================================
// SECTION: Evidence Persistence
// ============================================================================

/// Evidence persistence errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sink backend failure.
    #[error("evidence sink error: {0}")]
    Sink(String),
}

/// Durable store for committed ledger blocks.
pub trait EvidenceBlockSink: Send + Sync {
    /// Persists a committed block. Called in chain order under the ledger
    /// writer lock.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the block cannot be stored; the ledger then
    /// refuses the commit.
    fn persist(&self, block: &EvidenceBlock) -> Result<(), SinkError>;
}
