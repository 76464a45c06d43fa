// crates/arbiter-core/src/runtime/scorer/tests.rs
// ============================================================================
// Module: Structured Scorer Tests
// Description: Unit tests for private scorer sub-scores.
// Purpose: Validate heuristic contradiction and length penalty arithmetic.
// Dependencies: arbiter-core
// ============================================================================

//! ## Overview
//! Unit tests for private scorer sub-scores.

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

use std::collections::BTreeSet;

use super::ScorerConfig;
use super::StructuredScorer;
use super::jaccard;
use crate::core::DocumentId;
use crate::core::Lexicons;
use crate::core::ProcedureDocument;
use crate::core::ProcedureStep;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Default scorer.
fn scorer() -> StructuredScorer {
    StructuredScorer::new(ScorerConfig::default(), Lexicons::V1)
}

/// Single-document fixture.
fn doc(steps: Vec<ProcedureStep>) -> ProcedureDocument {
    ProcedureDocument::new(DocumentId::new("doc"), steps)
}

#[test]
fn jaccard_of_empty_sets_is_one() {
    assert!((jaccard(&BTreeSet::new(), &BTreeSet::new()) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn antonym_split_across_texts_counts_once_per_pair() {
    let left = doc(vec![ProcedureStep::new("Open the valve")]);
    let right = doc(vec![ProcedureStep::new("Close the valve")]);
    let rate = scorer().nli_rate(&left, &right);
    assert!((rate - 1.0).abs() < 1e-12);
}

#[test]
fn negation_in_one_text_marks_the_pair() {
    let left = doc(vec![ProcedureStep::new("Disconnect the battery")]);
    let right = doc(vec![ProcedureStep::new("Do not disconnect the battery")]);
    assert!((scorer().nli_rate(&left, &right) - 1.0).abs() < 1e-12);
}

#[test]
fn rate_divides_hits_by_aligned_pairs() {
    let same = ProcedureStep::new("Check the fuse rating");
    let left = doc(vec![ProcedureStep::new("Disconnect the battery"), same.clone()]);
    let right = doc(vec![ProcedureStep::new("Never disconnect the battery"), same]);
    assert!((scorer().nli_rate(&left, &right) - 0.5).abs() < 1e-12);
}

#[test]
fn text_with_both_antonyms_is_not_self_contradictory() {
    let step = ProcedureStep::new("Open the breaker, then close the panel");
    let left = doc(vec![step.clone()]);
    let right = doc(vec![step]);
    assert!(scorer().nli_rate(&left, &right).abs() < f64::EPSILON);
}

#[test]
fn ppe_denial_counts_as_independent_check() {
    let left = doc(vec![ProcedureStep::new("Remove the cover").with_ppe(["gloves"])]);
    let right = doc(vec![ProcedureStep::new("Remove the cover, no PPE required")]);
    // Negation ("no") and the PPE denial both hit; the rate clips at 1.
    assert!((scorer().nli_rate(&left, &right) - 1.0).abs() < 1e-12);
}

#[test]
fn length_penalty_uses_longer_document() {
    let step = ProcedureStep::new("Check voltage");
    let left = doc(vec![step.clone()]);
    let right = doc(vec![step.clone(), step]);
    let diff = scorer().step_diff(&left, &right);
    assert!((diff - 0.15).abs() < 1e-12);
}
