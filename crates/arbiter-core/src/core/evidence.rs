// crates/arbiter-core/src/core/evidence.rs
// ============================================================================
// Module: Arbiter Evidence Blocks
// Description: Hash-linked, signed ledger blocks and integrity reports.
// Purpose: Define the block shape and the hashing contract of the evidence ledger.
// Dependencies: crate::core::{hashing, identifiers, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! Each [`EvidenceBlock`] hashes the canonical JSON of
//! `(block_id, timestamp, payload, previous_hash, validator, block_type)` and
//! signs that hash. Blocks form a singly-linked chain anchored at a genesis
//! block whose `previous_hash` is [`GENESIS_PREVIOUS_HASH`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::EvidenceBlockId;
use crate::core::identifiers::ValidatorId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `previous_hash` value of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// Identifier of the genesis block.
pub const GENESIS_BLOCK_ID: &str = "evb-genesis";
/// Validator recorded on the genesis block.
pub const GENESIS_VALIDATOR: &str = "system";

// ============================================================================
// SECTION: Block Types
// ============================================================================

/// Kind of payload recorded by a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceBlockType {
    /// Fixed chain anchor.
    Genesis,
    /// Structured document comparison.
    ContradictionScore,
    /// Arbitration verdict.
    ArbitrationVerdict,
    /// HITL case opened.
    HitlCaseOpened,
    /// Human review submitted.
    HumanReview,
    /// Final human approval.
    HumanApproval,
    /// Other audit payload supplied by a caller.
    Audit,
}

impl EvidenceBlockType {
    /// Returns a stable label for the block type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Genesis => "genesis",
            Self::ContradictionScore => "contradiction_score",
            Self::ArbitrationVerdict => "arbitration_verdict",
            Self::HitlCaseOpened => "hitl_case_opened",
            Self::HumanReview => "human_review",
            Self::HumanApproval => "human_approval",
            Self::Audit => "audit",
        }
    }
}

// ============================================================================
// SECTION: Blocks
// ============================================================================

/// Fields covered by the block hash.
#[derive(Serialize)]
struct BlockHashInput<'a> {
    /// Block identifier.
    block_id: &'a EvidenceBlockId,
    /// Block timestamp.
    timestamp: Timestamp,
    /// Block payload.
    payload: &'a Value,
    /// Hash of the previous block.
    previous_hash: &'a str,
    /// Validator identity.
    validator: &'a ValidatorId,
    /// Block type.
    block_type: EvidenceBlockType,
}

/// Committed or pending ledger block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBlock {
    /// Block identifier.
    pub block_id: EvidenceBlockId,
    /// Append time.
    pub timestamp: Timestamp,
    /// Opaque audit payload.
    pub payload: Value,
    /// Lowercase hex content hash.
    pub hash: String,
    /// Hash of the previous block (`"0"` for genesis).
    pub previous_hash: String,
    /// Lowercase hex HMAC-SHA256 of `hash`.
    pub signature: String,
    /// Validator identity.
    pub validator: ValidatorId,
    /// Block type.
    pub block_type: EvidenceBlockType,
}

impl EvidenceBlock {
    /// Recomputes the content hash from the block fields.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn compute_hash(&self) -> Result<String, HashError> {
        block_hash(
            &self.block_id,
            self.timestamp,
            &self.payload,
            &self.previous_hash,
            &self.validator,
            self.block_type,
        )
    }
}

/// Computes the content hash for the given block fields.
///
/// # Errors
///
/// Returns [`HashError`] when canonicalization fails.
pub fn block_hash(
    block_id: &EvidenceBlockId,
    timestamp: Timestamp,
    payload: &Value,
    previous_hash: &str,
    validator: &ValidatorId,
    block_type: EvidenceBlockType,
) -> Result<String, HashError> {
    let input = BlockHashInput {
        block_id,
        timestamp,
        payload,
        previous_hash,
        validator,
        block_type,
    };
    Ok(hash_canonical_json(DEFAULT_HASH_ALGORITHM, &input)?.value)
}

// ============================================================================
// SECTION: Integrity Reports
// ============================================================================

/// Overall chain status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    /// Every hash, signature, and link checks out.
    Valid,
    /// At least one block failed verification.
    Compromised,
}

/// Result of a full chain walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIntegrityReport {
    /// Height of the chain tip (genesis is height 0).
    pub block_height: u64,
    /// Number of committed blocks including genesis.
    pub total_blocks: u64,
    /// Overall status.
    pub status: ChainStatus,
    /// Height of the first block that failed verification.
    pub first_invalid_height: Option<u64>,
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Read-only filter over committed blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum EvidenceFilter {
    /// Blocks of one type.
    BlockType(EvidenceBlockType),
    /// Blocks signed off by one validator.
    Validator(ValidatorId),
    /// Blocks whose serialized payload contains the substring.
    PayloadContains(String),
}

impl EvidenceFilter {
    /// Returns true when the block matches the filter.
    #[must_use]
    pub fn matches(&self, block: &EvidenceBlock) -> bool {
        match self {
            Self::BlockType(block_type) => block.block_type == *block_type,
            Self::Validator(validator) => block.validator == *validator,
            Self::PayloadContains(needle) => serde_json::to_string(&block.payload)
                .is_ok_and(|serialized| serialized.contains(needle.as_str())),
        }
    }
}
