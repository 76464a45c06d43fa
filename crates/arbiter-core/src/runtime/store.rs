// crates/arbiter-core/src/runtime/store.rs
// ============================================================================
// Module: Arbiter In-Memory Evidence Store
// Description: Simple in-memory evidence block sink for tests and embedding hosts.
// Purpose: Provide a deterministic sink implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`EvidenceBlockSink`].
//! Persisted blocks can be read back to rehydrate a ledger with
//! [`crate::runtime::EvidenceLedger::restore`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::core::EvidenceBlock;
use crate::interfaces::EvidenceBlockSink;
use crate::interfaces::SinkError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory evidence block sink.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEvidenceStore {
    /// Persisted blocks in commit order, protected by a mutex.
    blocks: Arc<Mutex<Vec<EvidenceBlock>>>,
}

impl InMemoryEvidenceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every persisted block in commit order.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the store mutex is poisoned.
    pub fn blocks(&self) -> Result<Vec<EvidenceBlock>, SinkError> {
        let guard = self
            .blocks
            .lock()
            .map_err(|_| SinkError::Sink("evidence store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    /// Returns the number of persisted blocks.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the store mutex is poisoned.
    pub fn block_count(&self) -> Result<usize, SinkError> {
        let guard = self
            .blocks
            .lock()
            .map_err(|_| SinkError::Sink("evidence store mutex poisoned".to_string()))?;
        Ok(guard.len())
    }
}

impl EvidenceBlockSink for InMemoryEvidenceStore {
    fn persist(&self, block: &EvidenceBlock) -> Result<(), SinkError> {
        self.blocks
            .lock()
            .map_err(|_| SinkError::Sink("evidence store mutex poisoned".to_string()))?
            .push(block.clone());
        Ok(())
    }
}
