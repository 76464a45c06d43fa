// crates/arbiter-core/src/runtime/ledger.rs
// ============================================================================
// Module: Evidence Ledger
// Description: Append-only, hash-linked, HMAC-signed evidence chain.
// Purpose: Record every verdict and human ruling tamper-evidently.
// Dependencies: crate::{core, interfaces, runtime::audit}, serde_json
// ============================================================================

//! ## Overview
//! Blocks move through two phases. [`EvidenceLedger::append`] hashes and
//! signs a block against the current chain tip and parks it in a pending
//! set; [`EvidenceLedger::commit`] re-derives the hash and signature,
//! persists the block through the host sink, and only then links it into the
//! committed chain.
//!
//! Hashing and signing for `append` happen outside the writer lock. The tip
//! check, persistence, and the push happen under it, so two blocks never
//! share a `previous_hash`. A pending block whose tip moved before commit is
//! re-linked to the current tip under that lock: its `previous_hash`, hash,
//! and signature are recomputed while id, timestamp, payload, validator, and
//! type are kept. [`EvidenceLedger::record`] builds and links its block inside
//! the same critical section.
//!
//! Security posture: the signing key is required input with a minimum
//! length; verification reports tampering and never repairs it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::ChainIntegrityReport;
use crate::core::ChainStatus;
use crate::core::EvidenceBlock;
use crate::core::EvidenceBlockId;
use crate::core::EvidenceBlockType;
use crate::core::EvidenceFilter;
use crate::core::HashError;
use crate::core::SigningKey;
use crate::core::Timestamp;
use crate::core::ValidatorId;
use crate::core::evidence::GENESIS_BLOCK_ID;
use crate::core::evidence::GENESIS_PREVIOUS_HASH;
use crate::core::evidence::GENESIS_VALIDATOR;
use crate::core::evidence::block_hash;
use crate::core::hashing::constant_time_eq;
use crate::core::hashing::sign_hex;
use crate::interfaces::Clock;
use crate::interfaces::EvidenceBlockSink;
use crate::runtime::audit::ArbiterAuditSink;
use crate::runtime::audit::LedgerAuditEvent;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Evidence ledger errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Recomputed hash or signature does not match the stored value.
    #[error("integrity violation on block {block_id}: {reason}")]
    Integrity {
        /// Offending block.
        block_id: EvidenceBlockId,
        /// Which check failed.
        reason: String,
    },
    /// The block is not pending.
    #[error("block {0} is not pending")]
    NotPending(EvidenceBlockId),
    /// Genesis blocks cannot be appended.
    #[error("genesis blocks are created once at ledger initialization")]
    GenesisAppend,
    /// Persisted blocks cannot seed a ledger.
    #[error("cannot restore ledger: {0}")]
    Restore(String),
    /// Hashing or signing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// The host sink refused the block.
    #[error("evidence persistence failed: {0}")]
    Persist(String),
    /// A ledger lock was poisoned.
    #[error("ledger lock poisoned: {0}")]
    Lock(&'static str),
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Hash-chained evidence ledger.
///
/// # Invariants
/// - `chain[0]` is the genesis block.
/// - For every `i > 0`, `chain[i].previous_hash == chain[i - 1].hash`.
pub struct EvidenceLedger {
    /// HMAC key for block signatures.
    signing_key: SigningKey,
    /// Time source for block timestamps.
    clock: Arc<dyn Clock>,
    /// Durable persistence for committed blocks.
    sink: Arc<dyn EvidenceBlockSink>,
    /// Operational log.
    audit: Arc<dyn ArbiterAuditSink>,
    /// Committed chain; the write lock is the single-writer critical section.
    chain: RwLock<Vec<EvidenceBlock>>,
    /// Appended but uncommitted blocks.
    pending: Mutex<BTreeMap<EvidenceBlockId, EvidenceBlock>>,
    /// Next block sequence number.
    next_sequence: AtomicU64,
}

impl EvidenceLedger {
    /// Creates a ledger and commits its genesis block.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the genesis block cannot be hashed,
    /// signed, or persisted.
    pub fn new(
        signing_key: SigningKey,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EvidenceBlockSink>,
        audit: Arc<dyn ArbiterAuditSink>,
    ) -> Result<Self, LedgerError> {
        let genesis = genesis_block(&signing_key)?;
        sink.persist(&genesis).map_err(|err| LedgerError::Persist(err.to_string()))?;
        Ok(Self {
            signing_key,
            clock,
            sink,
            audit,
            chain: RwLock::new(vec![genesis]),
            pending: Mutex::new(BTreeMap::new()),
            next_sequence: AtomicU64::new(1),
        })
    }

    /// Rehydrates a ledger from previously persisted blocks.
    ///
    /// Blocks are taken as-is; call [`EvidenceLedger::verify_chain_integrity`]
    /// to check them. Restored blocks are not re-persisted. New block ids
    /// continue after the highest restored sequence, so ids skipped by
    /// rejected commits are never reissued.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Restore`] when `blocks` is empty or does not
    /// start with a genesis block.
    pub fn restore(
        signing_key: SigningKey,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EvidenceBlockSink>,
        audit: Arc<dyn ArbiterAuditSink>,
        blocks: Vec<EvidenceBlock>,
    ) -> Result<Self, LedgerError> {
        match blocks.first() {
            None => return Err(LedgerError::Restore("no blocks supplied".to_string())),
            Some(first) if first.block_type != EvidenceBlockType::Genesis => {
                return Err(LedgerError::Restore(format!(
                    "first block {} is {}, expected genesis",
                    first.block_id,
                    first.block_type.as_str()
                )));
            }
            Some(_) => {}
        }
        let next_sequence = blocks
            .iter()
            .filter_map(|block| block.block_id.sequence())
            .max()
            .map_or(1, |highest| highest.saturating_add(1));
        Ok(Self {
            signing_key,
            clock,
            sink,
            audit,
            chain: RwLock::new(blocks),
            pending: Mutex::new(BTreeMap::new()),
            next_sequence: AtomicU64::new(next_sequence),
        })
    }

    /// Hashes and signs a block against the current tip and parks it as pending.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] for genesis payloads, hashing failures, or
    /// poisoned locks.
    pub fn append(
        &self,
        payload: Value,
        block_type: EvidenceBlockType,
        validator: &ValidatorId,
    ) -> Result<EvidenceBlockId, LedgerError> {
        if block_type == EvidenceBlockType::Genesis {
            return Err(LedgerError::GenesisAppend);
        }
        let previous_hash = self.tip_hash()?;
        let block = self.build_block(payload, block_type, validator, previous_hash)?;
        let block_id = block.block_id.clone();
        self.pending
            .lock()
            .map_err(|_| LedgerError::Lock("pending"))?
            .insert(block_id.clone(), block);
        Ok(block_id)
    }

    /// Verifies a pending block and links it into the committed chain.
    ///
    /// A block whose recorded tip is no longer the chain tip is re-linked to
    /// the current tip. A block that fails its integrity check is dropped. A
    /// block the sink refuses stays pending so the commit can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Integrity`] when the recomputed hash or
    /// signature differs, [`LedgerError::NotPending`] for unknown blocks, and
    /// [`LedgerError::Persist`] when the sink refuses the block.
    pub fn commit(&self, block_id: &EvidenceBlockId) -> Result<EvidenceBlock, LedgerError> {
        let block = self
            .pending
            .lock()
            .map_err(|_| LedgerError::Lock("pending"))?
            .remove(block_id)
            .ok_or_else(|| LedgerError::NotPending(block_id.clone()))?;

        if let Err(reason) = self.check_block(&block) {
            self.audit_rejection(&block, "integrity_violation", &reason);
            return Err(LedgerError::Integrity {
                block_id: block.block_id,
                reason,
            });
        }

        let mut chain = self.chain.write().map_err(|_| LedgerError::Lock("chain"))?;
        let tip = tip_of(&chain);
        let block = if block.previous_hash == tip { block } else { self.relink(block, tip)? };
        if let Err(err) = self.link(&mut chain, &block) {
            drop(chain);
            self.pending
                .lock()
                .map_err(|_| LedgerError::Lock("pending"))?
                .insert(block.block_id.clone(), block);
            return Err(err);
        }
        Ok(block)
    }

    /// Builds, persists, and links a block in one critical section.
    ///
    /// The block never enters the pending set, so concurrent
    /// [`EvidenceLedger::commit`] calls cannot make it fail.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] for genesis payloads, hashing failures,
    /// persistence failures, or poisoned locks.
    pub fn record(
        &self,
        payload: Value,
        block_type: EvidenceBlockType,
        validator: &ValidatorId,
    ) -> Result<EvidenceBlock, LedgerError> {
        if block_type == EvidenceBlockType::Genesis {
            return Err(LedgerError::GenesisAppend);
        }
        let mut chain = self.chain.write().map_err(|_| LedgerError::Lock("chain"))?;
        let block = self.build_block(payload, block_type, validator, tip_of(&chain))?;
        self.link(&mut chain, &block)?;
        Ok(block)
    }

    /// Recomputes every hash and signature and checks every link.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Lock`] when the chain lock is poisoned.
    pub fn verify_chain_integrity(&self) -> Result<ChainIntegrityReport, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Lock("chain"))?;
        let mut first_invalid_height = None;
        for (height, block) in chain.iter().enumerate() {
            let linked = match height.checked_sub(1).and_then(|previous| chain.get(previous)) {
                Some(previous) => block.previous_hash == previous.hash,
                None => {
                    block.previous_hash == GENESIS_PREVIOUS_HASH
                        && block.block_type == EvidenceBlockType::Genesis
                }
            };
            if !linked || self.check_block(block).is_err() {
                first_invalid_height = Some(u64::try_from(height).unwrap_or(u64::MAX));
                break;
            }
        }
        let total_blocks = u64::try_from(chain.len()).unwrap_or(u64::MAX);
        drop(chain);

        let status = if first_invalid_height.is_some() {
            ChainStatus::Compromised
        } else {
            ChainStatus::Valid
        };
        let outcome = match status {
            ChainStatus::Valid => "valid",
            ChainStatus::Compromised => "compromised",
        };
        let mut event =
            LedgerAuditEvent::new("ledger_verify", self.clock.now(), None, None, outcome);
        if let Some(height) = first_invalid_height {
            event = event.with_detail(format!("first invalid height {height}"));
        }
        self.audit.record_ledger(&event);

        Ok(ChainIntegrityReport {
            block_height: total_blocks.saturating_sub(1),
            total_blocks,
            status,
            first_invalid_height,
        })
    }

    /// Returns committed blocks matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Lock`] when the chain lock is poisoned.
    pub fn query(&self, filter: &EvidenceFilter) -> Result<Vec<EvidenceBlock>, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Lock("chain"))?;
        Ok(chain.iter().filter(|block| filter.matches(block)).cloned().collect())
    }

    /// Returns a snapshot of the committed chain.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Lock`] when the chain lock is poisoned.
    pub fn blocks(&self) -> Result<Vec<EvidenceBlock>, LedgerError> {
        Ok(self.chain.read().map_err(|_| LedgerError::Lock("chain"))?.clone())
    }

    /// Returns the hash of the committed tip.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Lock`] when the chain lock is poisoned.
    pub fn tip_hash(&self) -> Result<String, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Lock("chain"))?;
        Ok(tip_of(&chain))
    }

    /// Returns a copy of a pending block.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Lock`] when the pending lock is poisoned.
    pub fn pending_block(
        &self,
        block_id: &EvidenceBlockId,
    ) -> Result<Option<EvidenceBlock>, LedgerError> {
        let pending = self.pending.lock().map_err(|_| LedgerError::Lock("pending"))?;
        Ok(pending.get(block_id).cloned())
    }

    /// Assigns the next id and hashes and signs a block against `previous_hash`.
    fn build_block(
        &self,
        payload: Value,
        block_type: EvidenceBlockType,
        validator: &ValidatorId,
        previous_hash: String,
    ) -> Result<EvidenceBlock, LedgerError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let block_id = EvidenceBlockId::from_sequence(sequence);
        let timestamp = self.clock.now();
        let hash =
            block_hash(&block_id, timestamp, &payload, &previous_hash, validator, block_type)?;
        let signature = sign_hex(&self.signing_key, hash.as_bytes())?;
        Ok(EvidenceBlock {
            block_id,
            timestamp,
            payload,
            hash,
            previous_hash,
            signature,
            validator: validator.clone(),
            block_type,
        })
    }

    /// Points a verified block at a new tip and re-derives hash and signature.
    fn relink(&self, mut block: EvidenceBlock, tip: String) -> Result<EvidenceBlock, LedgerError> {
        block.previous_hash = tip;
        block.hash = block.compute_hash()?;
        block.signature = sign_hex(&self.signing_key, block.hash.as_bytes())?;
        self.audit.record_ledger(
            &LedgerAuditEvent::new(
                "ledger_relinked",
                self.clock.now(),
                Some(block.block_id.clone()),
                Some(block.block_type),
                "ok",
            )
            .with_detail("chain tip moved since append"),
        );
        Ok(block)
    }

    /// Persists a block and pushes it onto the chain held under the write lock.
    fn link(
        &self,
        chain: &mut Vec<EvidenceBlock>,
        block: &EvidenceBlock,
    ) -> Result<(), LedgerError> {
        if let Err(err) = self.sink.persist(block) {
            self.audit_rejection(block, "persist_failed", &err.to_string());
            return Err(LedgerError::Persist(err.to_string()));
        }
        chain.push(block.clone());
        self.audit.record_ledger(&LedgerAuditEvent::new(
            "ledger_commit",
            self.clock.now(),
            Some(block.block_id.clone()),
            Some(block.block_type),
            "ok",
        ));
        Ok(())
    }

    /// Recomputes hash and signature for one block.
    fn check_block(&self, block: &EvidenceBlock) -> Result<(), String> {
        let hash = block.compute_hash().map_err(|err| err.to_string())?;
        if !constant_time_eq(&hash, &block.hash) {
            return Err("hash mismatch".to_string());
        }
        let signature =
            sign_hex(&self.signing_key, block.hash.as_bytes()).map_err(|err| err.to_string())?;
        if !constant_time_eq(&signature, &block.signature) {
            return Err("signature mismatch".to_string());
        }
        Ok(())
    }

    /// Emits a rejected-commit audit event.
    fn audit_rejection(&self, block: &EvidenceBlock, outcome: &'static str, detail: &str) {
        self.audit.record_ledger(
            &LedgerAuditEvent::new(
                "ledger_rejected",
                self.clock.now(),
                Some(block.block_id.clone()),
                Some(block.block_type),
                outcome,
            )
            .with_detail(detail),
        );
    }
}

// ============================================================================
// SECTION: Genesis
// ============================================================================

/// Hash of the last committed block.
fn tip_of(chain: &[EvidenceBlock]) -> String {
    chain.last().map_or_else(|| GENESIS_PREVIOUS_HASH.to_string(), |tip| tip.hash.clone())
}

/// Builds the fixed, signed genesis block.
fn genesis_block(signing_key: &SigningKey) -> Result<EvidenceBlock, LedgerError> {
    let block_id = EvidenceBlockId::new(GENESIS_BLOCK_ID);
    let validator = ValidatorId::new(GENESIS_VALIDATOR);
    let payload = json!({
        "kind": "genesis",
        "ledger": "procedure-arbiter-evidence",
    });
    let hash = block_hash(
        &block_id,
        Timestamp::EPOCH,
        &payload,
        GENESIS_PREVIOUS_HASH,
        &validator,
        EvidenceBlockType::Genesis,
    )?;
    let signature = sign_hex(signing_key, hash.as_bytes())?;
    Ok(EvidenceBlock {
        block_id,
        timestamp: Timestamp::EPOCH,
        payload,
        hash,
        previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        signature,
        validator,
        block_type: EvidenceBlockType::Genesis,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
