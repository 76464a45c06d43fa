// crates/arbiter-core/tests/semantic.rs
// ============================================================================
// Module: Semantic Analyzer Tests
// Description: Cosine similarity, neutral defaults, and agreement percentage.
// Purpose: Validate degraded inputs resolve to documented defaults.
// Dependencies: arbiter-core
// ============================================================================
//! ## Overview
//! Covers cosine edge cases, mean similarity with and without embeddings,
//! and the confidence-variance agreement metric.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use arbiter_core::ModelResponse;
use arbiter_core::ProviderId;
use arbiter_core::Timestamp;
use arbiter_core::runtime::SemanticAnalyzer;
use arbiter_core::runtime::SemanticConfig;

const EPS: f64 = 1e-9;

fn analyzer() -> SemanticAnalyzer {
    SemanticAnalyzer::new(SemanticConfig::default())
}

fn response(provider: &str, confidence: f64, embedding: Option<Vec<f32>>) -> ModelResponse {
    let response = ModelResponse::new(
        ProviderId::new(provider),
        "Replace the filter.",
        confidence,
        Timestamp::EPOCH,
    );
    match embedding {
        Some(vector) => response.with_embedding(vector),
        None => response,
    }
}

/// Tests cosine similarity edge cases.
#[test]
fn cosine_handles_identical_orthogonal_zero_and_empty_vectors() {
    let analyzer = analyzer();
    assert!((analyzer.cosine(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-6);
    assert!(analyzer.cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < EPS);
    assert!((analyzer.cosine(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < EPS);
    assert!(analyzer.cosine(&[0.0, 0.0], &[1.0, 1.0]).abs() < EPS);
    assert!((analyzer.cosine(&[], &[1.0]) - 0.5).abs() < EPS);
    assert!((analyzer.cosine(&[1.0, 0.0], &[1.0, 0.0, 0.0]) - 0.5).abs() < EPS);
}

/// Tests pairwise entries cover every unordered pair in input order.
#[test]
fn analyze_reports_every_pair() {
    let responses = vec![
        response("a", 0.9, Some(vec![1.0, 0.0])),
        response("b", 0.9, Some(vec![0.0, 1.0])),
        response("c", 0.9, None),
    ];

    let analysis = analyzer().analyze(&responses);

    assert_eq!(analysis.pairwise.len(), 3);
    assert_eq!(analysis.pairwise[0].left, ProviderId::new("a"));
    assert_eq!(analysis.pairwise[0].right, ProviderId::new("b"));
    assert!(analysis.pairwise[0].similarity.abs() < EPS);
    assert!((analysis.pairwise[1].similarity - 0.5).abs() < EPS);
    assert!((analysis.pairwise[2].similarity - 0.5).abs() < EPS);
    assert!((analysis.mean_similarity - 1.0 / 3.0).abs() < EPS);
    assert_eq!(analysis.degraded_sources, vec![ProviderId::new("c")]);
}

/// Tests the mean defaults to 1.0 when fewer than two responses carry embeddings.
#[test]
fn mean_similarity_defaults_without_two_embeddings() {
    let responses = vec![response("a", 0.8, Some(vec![1.0, 0.0])), response("b", 0.8, None)];

    let analysis = analyzer().analyze(&responses);

    assert!((analysis.mean_similarity - 1.0).abs() < EPS);
    assert_eq!(analysis.degraded_sources, vec![ProviderId::new("b")]);
}

/// Tests a single response still produces an analysis.
#[test]
fn single_response_is_not_an_error() {
    let analysis = analyzer().analyze(&[response("solo", 0.4, None)]);

    assert!(analysis.pairwise.is_empty());
    assert!((analysis.mean_similarity - 1.0).abs() < EPS);
    assert!((analysis.agreement_percentage - 100.0).abs() < EPS);
}

/// Tests agreement derives from the variance of composite confidences.
#[test]
fn agreement_uses_composite_confidence_variance() {
    let responses = vec![
        response("a", 0.0, None),
        response("b", 1.0, None),
    ];
    // composites 0 and 1 -> variance 0.25
    assert!((analyzer().analyze(&responses).agreement_percentage - 75.0).abs() < EPS);

    let with_sub_scores = vec![
        response("a", 0.6, None).with_safety_score(1.0),
        response("b", 0.8, None),
    ];
    // composites 0.8 and 0.8 -> full agreement
    assert!((analyzer().analyze(&with_sub_scores).agreement_percentage - 100.0).abs() < 1e-9);
}
