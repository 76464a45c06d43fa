// crates/arbiter-core/tests/scorer.rs
// ============================================================================
// Module: Structured Scorer Tests
// Description: Sub-score arithmetic and degradation for document comparison.
// Purpose: Pin the documented scoring formula and worst-case defaults.
// Dependencies: arbiter-core
// ============================================================================
//! ## Overview
//! Exercises each sub-score of the structured scorer, the empty-document
//! worst case, and batch averaging.

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

use arbiter_core::DocumentId;
use arbiter_core::Lexicons;
use arbiter_core::ProcedureDocument;
use arbiter_core::ProcedureStep;
use arbiter_core::runtime::ScorerConfig;
use arbiter_core::runtime::StructuredScorer;

const EPS: f64 = 1e-9;

fn scorer() -> StructuredScorer {
    StructuredScorer::new(ScorerConfig::default(), Lexicons::V1)
}

fn document(id: &str, steps: Vec<ProcedureStep>) -> ProcedureDocument {
    ProcedureDocument::new(DocumentId::new(id), steps)
}

fn battery_step() -> ProcedureStep {
    ProcedureStep::new("Disconnect battery negative terminal")
        .with_tools(["10mm wrench"])
        .with_ppe(["insulated gloves"])
        .with_risks(["electric shock"])
}

/// Tests identical one-step documents score zero and pass.
#[test]
fn identical_single_step_documents_score_zero() {
    let left = document("a", vec![battery_step()]);
    let right = document("b", vec![battery_step()]);

    let score = scorer().score(&left, &right);

    assert!(score.step_diff.abs() < EPS);
    assert!(score.spec_diff.abs() < EPS);
    assert!(score.risk_diff.abs() < EPS);
    assert!(score.nli_rate.abs() < EPS);
    assert!(score.total.abs() < EPS);
    assert!(score.passed);
    assert!((score.threshold - 0.35).abs() < EPS);
}

/// Tests an empty document degrades to the worst case instead of failing.
#[test]
fn empty_document_scores_worst_case() {
    let empty = document("empty", Vec::new());
    let full = document("full", vec![ProcedureStep::new("Check voltage")]);

    let score = scorer().score(&empty, &full);

    assert!((score.step_diff - 1.0).abs() < EPS);
    assert!((score.spec_diff - 1.0).abs() < EPS);
    assert!((score.nli_rate - 1.0).abs() < EPS);
    assert!(score.risk_diff.abs() < EPS, "neither document names a risk");
    assert!((score.total - 0.85).abs() < EPS);
    assert!(!score.passed);
}

/// Tests specification keys are case-normalized and mismatched values count against the pair.
#[test]
fn spec_diff_counts_matching_keys_over_union() {
    let left = document(
        "a",
        vec![
            ProcedureStep::new("Torque the bolts")
                .with_specification("torque", "25 Nm")
                .with_specification("voltage", "12V"),
        ],
    );
    let right = document(
        "b",
        vec![
            ProcedureStep::new("Torque the bolts")
                .with_specification("Torque", "25  nm")
                .with_specification("voltage", "24V"),
        ],
    );

    let score = scorer().score(&left, &right);

    assert!((score.spec_diff - 0.5).abs() < EPS);
}

/// Tests steps without specification keys do not count as a mismatch.
#[test]
fn spec_diff_is_zero_without_keys() {
    let left = document("a", vec![ProcedureStep::new("Inspect housing")]);
    let right = document("b", vec![ProcedureStep::new("Inspect the housing")]);

    assert!(scorer().score(&left, &right).spec_diff.abs() < EPS);
}

/// Tests the risk sub-score when exactly one document names risks.
#[test]
fn risk_diff_is_one_when_only_one_side_has_risks() {
    let left = document("a", vec![ProcedureStep::new("Drain coolant").with_risks(["burns"])]);
    let right = document("b", vec![ProcedureStep::new("Drain coolant")]);

    assert!((scorer().score(&left, &right).risk_diff - 1.0).abs() < EPS);
}

/// Tests the risk sub-score uses the union over all steps.
#[test]
fn risk_diff_is_jaccard_distance_of_risk_unions() {
    let left = document(
        "a",
        vec![
            ProcedureStep::new("Step one").with_risks(["Shock"]),
            ProcedureStep::new("Step two").with_risks(["burns"]),
        ],
    );
    let right = document("b", vec![ProcedureStep::new("Step one").with_risks(["shock", "pinch"])]);

    let score = scorer().score(&left, &right);

    // union {shock, burns, pinch}, intersection {shock}
    assert!((score.risk_diff - 2.0 / 3.0).abs() < EPS);
}

/// Tests a lockout denial in the other step text counts as a safety contradiction.
#[test]
fn lockout_denial_counts_toward_nli_rate() {
    let left = document(
        "a",
        vec![ProcedureStep::new("Isolate the feeder").with_lockout_tags(["LOTO-7"])],
    );
    let right = document("b", vec![ProcedureStep::new("Isolate the feeder, lockout not required")]);

    let score = scorer().score(&left, &right);

    // "not" fires the negation check too; two hits on one pair clip at 1.
    assert!((score.nli_rate - 1.0).abs() < EPS);
}

/// Tests the antonym check fires only when the actions split across the texts.
#[test]
fn antonym_actions_in_opposite_steps_raise_nli_rate() {
    let left = document("a", vec![ProcedureStep::new("Tighten the clamp")]);
    let right = document("b", vec![ProcedureStep::new("Loosen the clamp")]);

    assert!((scorer().score(&left, &right).nli_rate - 1.0).abs() < EPS);
}

/// Tests a negation word in only one step text marks the whole pair contradictory.
#[test]
fn negation_in_one_step_text_counts_as_contradiction() {
    let left = document("a", vec![ProcedureStep::new("Disconnect the battery")]);
    let right = document("b", vec![ProcedureStep::new("Do not disconnect the battery")]);

    let score = scorer().score(&left, &right);

    assert!((score.nli_rate - 1.0).abs() < EPS);
    assert!(score.risk_diff.abs() < EPS);
    assert!(score.spec_diff.abs() < EPS);
}

/// Tests batch scoring returns zero for fewer than two documents.
#[test]
fn score_all_needs_two_documents() {
    let scorer = scorer();
    assert!(scorer.score_all(&[]).abs() < EPS);
    assert!(scorer.score_all(&[document("a", vec![battery_step()])]).abs() < EPS);
}

/// Tests batch scoring averages every unordered pair.
#[test]
fn score_all_averages_pairs() {
    let scorer = scorer();
    let a = document("a", vec![battery_step()]);
    let b = document("b", vec![battery_step()]);
    let empty = document("c", Vec::new());

    let expected = (scorer.score(&a, &b).total
        + scorer.score(&a, &empty).total
        + scorer.score(&b, &empty).total)
        / 3.0;

    assert!((scorer.score_all(&[a, b, empty]) - expected).abs() < EPS);
}

/// Tests the total respects the configured weights.
#[test]
fn total_is_weighted_sum_of_sub_scores() {
    let left = document(
        "a",
        vec![
            ProcedureStep::new("Open the valve").with_specification("pressure", "30 psi"),
            ProcedureStep::new("Start the pump").with_risks(["noise"]),
        ],
    );
    let right = document("b", vec![
        ProcedureStep::new("Close the valve").with_specification("pressure", "45 psi"),
    ]);

    let score = scorer().score(&left, &right);
    let expected = 0.35 * score.step_diff
        + 0.35 * score.spec_diff
        + 0.15 * score.risk_diff
        + 0.15 * score.nli_rate;

    assert!((score.total - expected).abs() < EPS);
    assert_eq!(score.passed, score.total <= 0.35);
}
