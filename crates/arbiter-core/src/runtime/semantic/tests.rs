// crates/arbiter-core/src/runtime/semantic/tests.rs
// ============================================================================
// Module: Semantic Analyzer Tests
// Description: Unit tests for degraded-source detection.
// Purpose: Pin which providers are reported as degraded.
// Dependencies: arbiter-core
// ============================================================================

//! ## Overview
//! Covers degraded-source detection for missing and mismatched embeddings.

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

use super::degraded_sources;
use super::population_variance;
use crate::core::ModelResponse;
use crate::core::ProviderId;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Response fixture.
fn response(provider: &str, embedding: Option<Vec<f32>>) -> ModelResponse {
    let response = ModelResponse::new(ProviderId::new(provider), "text", 0.8, Timestamp::EPOCH);
    match embedding {
        Some(vector) => response.with_embedding(vector),
        None => response,
    }
}

#[test]
fn missing_empty_and_mismatched_embeddings_are_degraded() {
    let responses = vec![
        response("a", Some(vec![1.0, 0.0])),
        response("b", None),
        response("c", Some(Vec::new())),
        response("d", Some(vec![1.0, 0.0, 0.0])),
        response("e", Some(vec![0.0, 1.0])),
    ];
    let degraded = degraded_sources(&responses);
    assert_eq!(degraded, vec![ProviderId::new("b"), ProviderId::new("c"), ProviderId::new("d")]);
}

#[test]
fn variance_of_single_value_is_zero() {
    assert!(population_variance(&[0.7]).abs() < f64::EPSILON);
    assert!((population_variance(&[0.0, 1.0]) - 0.25).abs() < 1e-12);
}
