// crates/arbiter-core/src/runtime/ledger/tests.rs
// ============================================================================
// Module: Evidence Ledger Tests
// Description: Unit tests for pending-block tampering and tip races.
// Purpose: Exercise commit checks that need access to ledger internals.
// Dependencies: arbiter-core
// ============================================================================

//! ## Overview
//! Mutates pending and committed blocks in place to confirm that commit and
//! verification detect tampering without repairing it.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::json;

use super::EvidenceLedger;
use super::LedgerError;
use crate::core::ChainStatus;
use crate::core::EvidenceBlockType;
use crate::core::SigningKey;
use crate::core::Timestamp;
use crate::core::ValidatorId;
use crate::runtime::InMemoryEvidenceStore;
use crate::runtime::ManualClock;
use crate::runtime::NoopAuditSink;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Ledger over an in-memory store.
fn ledger(store: &InMemoryEvidenceStore) -> EvidenceLedger {
    EvidenceLedger::new(
        SigningKey::new(vec![7_u8; 32]).expect("key"),
        Arc::new(ManualClock::new(Timestamp::from_unix_millis(1_000))),
        Arc::new(store.clone()),
        Arc::new(NoopAuditSink),
    )
    .expect("ledger")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn tampered_pending_payload_is_rejected_and_not_committed() {
    let store = InMemoryEvidenceStore::new();
    let ledger = ledger(&store);
    let validator = ValidatorId::new("arbiter");
    let id = ledger.append(json!({"score": 0.2}), EvidenceBlockType::Audit, &validator).unwrap();

    ledger.pending.lock().unwrap().get_mut(&id).unwrap().payload = json!({"score": 0.9});

    let err = ledger.commit(&id).expect_err("tampered block must not commit");
    assert!(matches!(err, LedgerError::Integrity { .. }));
    assert_eq!(ledger.blocks().unwrap().len(), 1);
    assert_eq!(store.block_count().unwrap(), 1);
    assert!(ledger.pending_block(&id).unwrap().is_none());
}

#[test]
fn forged_pending_signature_is_rejected() {
    let ledger = ledger(&InMemoryEvidenceStore::new());
    let validator = ValidatorId::new("arbiter");
    let id = ledger.append(json!({"n": 1}), EvidenceBlockType::Audit, &validator).unwrap();

    ledger.pending.lock().unwrap().get_mut(&id).unwrap().signature = "00".repeat(32);

    let err = ledger.commit(&id).expect_err("forged signature must not commit");
    match err {
        LedgerError::Integrity {
            reason, ..
        } => assert_eq!(reason, "signature mismatch"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn second_commit_against_moved_tip_is_relinked() {
    let ledger = ledger(&InMemoryEvidenceStore::new());
    let validator = ValidatorId::new("arbiter");
    let first = ledger.append(json!({"n": 1}), EvidenceBlockType::Audit, &validator).unwrap();
    let second = ledger.append(json!({"n": 2}), EvidenceBlockType::Audit, &validator).unwrap();
    let appended = ledger.pending_block(&second).unwrap().unwrap();

    let committed_first = ledger.commit(&first).unwrap();
    let committed_second = ledger.commit(&second).unwrap();

    assert_eq!(committed_second.previous_hash, committed_first.hash);
    assert_ne!(committed_second.hash, appended.hash);
    assert_eq!(committed_second.block_id, appended.block_id);
    assert_eq!(committed_second.payload, appended.payload);
    assert_eq!(committed_second.timestamp, appended.timestamp);
    assert_eq!(ledger.blocks().unwrap().len(), 3);
    assert_eq!(ledger.verify_chain_integrity().unwrap().status, ChainStatus::Valid);
}

#[test]
fn tampered_pending_block_is_not_relinked() {
    let ledger = ledger(&InMemoryEvidenceStore::new());
    let validator = ValidatorId::new("arbiter");
    let stale = ledger.append(json!({"n": 1}), EvidenceBlockType::Audit, &validator).unwrap();
    ledger.record(json!({"n": 2}), EvidenceBlockType::Audit, &validator).unwrap();

    ledger.pending.lock().unwrap().get_mut(&stale).unwrap().payload = json!({"n": 9});

    let err = ledger.commit(&stale).expect_err("tampered block must not be re-signed");
    assert!(matches!(err, LedgerError::Integrity { .. }));
    assert_eq!(ledger.blocks().unwrap().len(), 2);
}

#[test]
fn committed_payload_mutation_marks_chain_compromised() {
    let ledger = ledger(&InMemoryEvidenceStore::new());
    let validator = ValidatorId::new("arbiter");
    for n in 0 .. 3 {
        ledger.record(json!({"n": n}), EvidenceBlockType::Audit, &validator).unwrap();
    }

    ledger.chain.write().unwrap()[2].payload = json!({"n": 99});

    let report = ledger.verify_chain_integrity().unwrap();
    assert_eq!(report.status, ChainStatus::Compromised);
    assert_eq!(report.first_invalid_height, Some(2));
    assert_eq!(report.total_blocks, 4);
}
