// crates/arbiter-core/tests/proptest_scoring.rs
// ============================================================================
// Module: Scoring Property-Based Tests
// Description: Property tests for scorer and decision invariants.
// Purpose: Detect panics and invariant breaks across generated inputs.
// ============================================================================

//! Property-based tests for scoring and verdict invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use arbiter_core::DocumentId;
use arbiter_core::Lexicons;
use arbiter_core::ModelResponse;
use arbiter_core::ProcedureDocument;
use arbiter_core::ProcedureStep;
use arbiter_core::ProviderId;
use arbiter_core::Recommendation;
use arbiter_core::Timestamp;
use arbiter_core::runtime::ClassifierConfig;
use arbiter_core::runtime::ContradictionClassifier;
use arbiter_core::runtime::DecisionConfig;
use arbiter_core::runtime::DecisionEngine;
use arbiter_core::runtime::DecisionInputs;
use arbiter_core::runtime::ScorerConfig;
use arbiter_core::runtime::SemanticAnalyzer;
use arbiter_core::runtime::SemanticConfig;
use arbiter_core::runtime::StructuredScorer;
use proptest::prelude::*;

const WORDS: &[&str] = &[
    "open", "close", "tighten", "loosen", "not", "the", "valve", "breaker", "isolate", "check",
    "without", "gloves", "lockout", "required", "never", "safe",
];

const PPE: &[&str] = &["gloves", "goggles"];

fn instruction_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1 .. 6).prop_map(|words| words.join(" "))
}

fn step_strategy() -> impl Strategy<Value = ProcedureStep> {
    (
        instruction_strategy(),
        prop::collection::vec("[a-c]{1,2}", 0 .. 3),
        prop::collection::vec(prop::sample::select(PPE), 0 .. 2),
        prop::collection::vec("[x-z]{1,2}", 0 .. 3),
        prop::option::of(("[ab]", "[0-9]{1,2}")),
        any::<bool>(),
    )
        .prop_map(|(instruction, tools, ppe, risks, spec, lockout)| {
            let mut step =
                ProcedureStep::new(instruction).with_tools(tools).with_ppe(ppe).with_risks(risks);
            if let Some((key, value)) = spec {
                step = step.with_specification(key, value);
            }
            if lockout {
                step = step.with_lockout_tags(["LOTO-1"]);
            }
            step
        })
}

fn document_strategy(min_steps: usize) -> impl Strategy<Value = ProcedureDocument> {
    prop::collection::vec(step_strategy(), min_steps .. 5)
        .prop_map(|steps| ProcedureDocument::new(DocumentId::new("doc"), steps))
}

fn response_strategy() -> impl Strategy<Value = ModelResponse> {
    (
        0.0_f64 ..= 1.0,
        prop::option::of(0.0_f64 ..= 1.0),
        prop::option::of(0.0_f64 ..= 1.0),
        prop::option::of(prop::collection::vec(-1.0_f32 .. 1.0, 3)),
        instruction_strategy(),
    )
        .prop_map(|(confidence, safety, logic, embedding, text)| {
            let mut response =
                ModelResponse::new(ProviderId::new("p"), text, confidence, Timestamp::EPOCH);
            if let Some(score) = safety {
                response = response.with_safety_score(score);
            }
            if let Some(score) = logic {
                response = response.with_logic_score(score);
            }
            if let Some(vector) = embedding {
                response = response.with_embedding(vector);
            }
            response
        })
}

fn scorer() -> StructuredScorer {
    StructuredScorer::new(ScorerConfig::default(), Lexicons::V1)
}

proptest! {
    #[test]
    fn score_is_symmetric(left in document_strategy(0), right in document_strategy(0)) {
        let scorer = scorer();
        let forward = scorer.score(&left, &right);
        let backward = scorer.score(&right, &left);
        prop_assert!((forward.total - backward.total).abs() < 1e-9);
    }

    #[test]
    fn non_empty_document_scores_zero_against_itself(document in document_strategy(1)) {
        let score = scorer().score(&document, &document);
        prop_assert!(score.total.abs() < 1e-9);
        prop_assert!(score.passed);
    }

    #[test]
    fn score_components_stay_in_unit_range(
        left in document_strategy(0),
        right in document_strategy(0),
    ) {
        let score = scorer().score(&left, &right);
        let components =
            [score.step_diff, score.spec_diff, score.risk_diff, score.nli_rate, score.total];
        for value in components {
            prop_assert!((0.0 ..= 1.0).contains(&value));
        }
        prop_assert_eq!(score.passed, score.total <= score.threshold);
    }

    #[test]
    fn verdict_respects_threshold_table(
        responses in prop::collection::vec(response_strategy(), 1 .. 5),
    ) {
        let semantic = SemanticAnalyzer::new(SemanticConfig::default()).analyze(&responses);
        let findings = ContradictionClassifier::new(ClassifierConfig::default(), Lexicons::V1)
            .classify(&responses, &semantic);
        let verdict = DecisionEngine::new(DecisionConfig::default()).decide(DecisionInputs::new(
            findings,
            semantic.agreement_percentage,
            semantic.mean_similarity,
        ));

        prop_assert!((0.0 ..= 1.0).contains(&verdict.contradiction_score));
        prop_assert!((0.0 ..= 100.0).contains(&verdict.model_agreement_percentage));
        prop_assert_eq!(verdict.consensus_achieved, verdict.contradiction_score <= 0.35);
        match verdict.recommendation {
            Recommendation::Approve => {
                prop_assert!(verdict.contradiction_score <= 0.35);
                prop_assert!(verdict.semantic_similarity >= 0.7);
            }
            Recommendation::Review => {
                prop_assert!(verdict.contradiction_score <= 0.6);
                prop_assert!(verdict.semantic_similarity >= 0.5);
            }
            Recommendation::Reject => {
                prop_assert!(
                    verdict.contradiction_score > 0.6 || verdict.semantic_similarity < 0.5
                );
            }
        }
    }
}
