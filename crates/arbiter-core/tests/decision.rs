// crates/arbiter-core/tests/decision.rs
// ============================================================================
// Module: Decision Engine Tests
// Description: Score blending and the approve/review/reject threshold table.
// Purpose: Ensure verdicts follow the documented thresholds exactly.
// Dependencies: arbiter-core
// ============================================================================
//! ## Overview
//! Checks each recommendation band, the finding penalty, structured-score
//! blending, and clipping of out-of-range inputs.

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

use arbiter_core::ContradictionFinding;
use arbiter_core::FindingType;
use arbiter_core::LEXICON_VERSION;
use arbiter_core::ProviderId;
use arbiter_core::Recommendation;
use arbiter_core::Severity;
use arbiter_core::runtime::DecisionConfig;
use arbiter_core::runtime::DecisionEngine;
use arbiter_core::runtime::DecisionInputs;

const EPS: f64 = 1e-9;

fn engine() -> DecisionEngine {
    DecisionEngine::new(DecisionConfig::default())
}

fn finding(severity: Severity, confidence: f64) -> ContradictionFinding {
    ContradictionFinding {
        finding_type: FindingType::Safety,
        severity,
        description: "fixture".to_string(),
        sources: vec![ProviderId::new("a")],
        confidence,
        rule: "fixture".to_string(),
    }
}

/// Tests full agreement with identical semantics approves with consensus.
#[test]
fn full_agreement_approves() {
    let verdict = engine().decide(DecisionInputs::new(Vec::new(), 100.0, 1.0));

    assert!(verdict.contradiction_score.abs() < EPS);
    assert!(verdict.consensus_achieved);
    assert_eq!(verdict.recommendation, Recommendation::Approve);
    assert_eq!(verdict.lexicon_version, LEXICON_VERSION);
}

/// Tests a low score with weak similarity routes to review, not approve.
#[test]
fn approve_requires_similarity() {
    let verdict = engine().decide(DecisionInputs::new(Vec::new(), 100.0, 0.6));

    assert!((verdict.contradiction_score - 0.12).abs() < EPS);
    assert!(verdict.consensus_achieved);
    assert_eq!(verdict.recommendation, Recommendation::Review);
}

/// Tests the review band between the approve and review thresholds.
#[test]
fn middle_scores_route_to_review() {
    let verdict = engine().decide(DecisionInputs::new(Vec::new(), 20.0, 0.8));

    assert!((verdict.contradiction_score - 0.38).abs() < EPS);
    assert!(!verdict.consensus_achieved);
    assert_eq!(verdict.recommendation, Recommendation::Review);
}

/// Tests total disagreement rejects.
#[test]
fn disagreement_rejects() {
    let verdict = engine().decide(DecisionInputs::new(Vec::new(), 0.0, 0.0));

    assert!((verdict.contradiction_score - 0.7).abs() < EPS);
    assert_eq!(verdict.recommendation, Recommendation::Reject);
}

/// Tests the finding penalty is the mean of severity weight times confidence.
#[test]
fn findings_penalty_weights_severity_by_confidence() {
    let engine = engine();
    let findings = vec![finding(Severity::High, 0.9), finding(Severity::Medium, 0.7)];

    let penalty = engine.findings_penalty(&findings);

    assert!((penalty - (0.6 * 0.9 + 0.3 * 0.7) / 2.0).abs() < EPS);
    let verdict = engine.decide(DecisionInputs::new(findings, 100.0, 1.0));
    assert!((verdict.contradiction_score - 0.3 * penalty).abs() < EPS);
    assert_eq!(verdict.findings.len(), 2);
}

/// Tests the structured score acts as a floor on the verdict score.
#[test]
fn structured_score_raises_verdict_score() {
    let engine = engine();

    let raised =
        engine.decide(DecisionInputs::new(Vec::new(), 100.0, 1.0).with_structured_score(0.5));
    assert!((raised.contradiction_score - 0.5).abs() < EPS);
    assert_eq!(raised.recommendation, Recommendation::Review);

    let kept = engine.decide(DecisionInputs::new(Vec::new(), 0.0, 0.0).with_structured_score(0.1));
    assert!((kept.contradiction_score - 0.7).abs() < EPS);
}

/// Tests non-finite and out-of-range inputs still yield a bounded verdict.
#[test]
fn degenerate_inputs_are_clipped() {
    let engine = engine();

    let nan = engine.decide(DecisionInputs::new(Vec::new(), f64::NAN, f64::NAN));
    assert!(nan.contradiction_score.is_finite());
    assert!((0.0 ..= 1.0).contains(&nan.contradiction_score));
    assert_eq!(nan.recommendation, Recommendation::Reject);

    let oversized =
        engine.decide(DecisionInputs::new(vec![finding(Severity::Critical, 5.0)], 250.0, 3.0));
    assert!((oversized.model_agreement_percentage - 100.0).abs() < EPS);
    assert!((oversized.semantic_similarity - 1.0).abs() < EPS);
    assert!((oversized.contradiction_score - 0.3).abs() < EPS);
}

/// Tests degraded sources flow through to the verdict.
#[test]
fn degraded_sources_are_carried_on_the_verdict() {
    let verdict = engine().decide(
        DecisionInputs::new(Vec::new(), 100.0, 1.0)
            .with_degraded_sources(vec![ProviderId::new("offline")]),
    );

    assert_eq!(verdict.degraded_sources, vec![ProviderId::new("offline")]);
}
