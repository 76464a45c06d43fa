// crates/arbiter-core/tests/classifier.rs
// ============================================================================
// Module: Contradiction Classifier Tests
// Description: Rule coverage for the safety, logic, and compliance reviewers.
// Purpose: Pin severities, fixed confidences, and reviewer opinions.
// Dependencies: arbiter-core
// ============================================================================
//! ## Overview
//! Each rule is triggered in isolation with neutral response text so the
//! other rules stay quiet.

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
use arbiter_core::Lexicons;
use arbiter_core::ModelResponse;
use arbiter_core::ProviderId;
use arbiter_core::SemanticAnalysis;
use arbiter_core::Severity;
use arbiter_core::Timestamp;
use arbiter_core::runtime::ClassifierConfig;
use arbiter_core::runtime::ContradictionClassifier;
use arbiter_core::runtime::FindingProducer;
use arbiter_core::runtime::SemanticAnalyzer;
use arbiter_core::runtime::SemanticConfig;

fn classifier() -> ContradictionClassifier {
    ContradictionClassifier::new(ClassifierConfig::default(), Lexicons::V1)
}

fn response(provider: &str, text: &str) -> ModelResponse {
    ModelResponse::new(ProviderId::new(provider), text, 0.9, Timestamp::EPOCH)
}

fn classify(responses: &[ModelResponse]) -> Vec<ContradictionFinding> {
    let semantic = SemanticAnalyzer::new(SemanticConfig::default()).analyze(responses);
    classifier().classify(responses, &semantic)
}

/// Tests safety sub-scores 0.9, 0.55, 0.9 raise a high safety finding.
#[test]
fn safety_score_range_raises_high_finding() {
    let responses = vec![
        response("a", "Replace the fuse.").with_safety_score(0.9),
        response("b", "Replace the fuse.").with_safety_score(0.55),
        response("c", "Replace the fuse.").with_safety_score(0.9),
    ];

    let findings = classify(&responses);

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.finding_type, FindingType::Safety);
    assert_eq!(finding.severity, Severity::High);
    assert!((finding.confidence - 0.9).abs() < f64::EPSILON);
    assert_eq!(finding.rule, "safety_score_range");
    assert_eq!(finding.sources, vec![ProviderId::new("b"), ProviderId::new("a")]);
}

/// Tests a range at the threshold does not trigger.
#[test]
fn safety_score_range_at_threshold_is_quiet() {
    let responses = vec![
        response("a", "Replace the fuse.").with_safety_score(0.75),
        response("b", "Replace the fuse.").with_safety_score(0.5),
    ];

    assert!(classify(&responses).is_empty());
}

/// Tests safety keyword spread above three raises a medium finding.
#[test]
fn safety_keyword_spread_raises_medium_finding() {
    let responses = vec![
        response("a", "Danger: hazard warning, use caution, shock risk."),
        response("b", "Replace the fuse."),
    ];

    let findings = classify(&responses);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Medium);
    assert_eq!(findings[0].rule, "safety_keyword_spread");
    assert!((findings[0].confidence - 0.7).abs() < f64::EPSILON);
}

/// Tests logic score variance above 0.2 raises a medium finding.
#[test]
fn logic_score_variance_raises_medium_finding() {
    let responses = vec![
        response("a", "Replace the fuse.").with_logic_score(0.0),
        response("b", "Replace the fuse.").with_logic_score(1.0),
    ];

    let findings = classify(&responses);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].finding_type, FindingType::Logic);
    assert_eq!(findings[0].severity, Severity::Medium);
    assert!((findings[0].confidence - 0.75).abs() < f64::EPSILON);
}

/// Tests opposite polarity across responses raises a high logic finding.
#[test]
fn polarity_conflict_raises_high_finding() {
    let responses = vec![
        response("a", "This approach is safe and recommended."),
        response("b", "This approach is dangerous and invalid."),
        response("c", "Replace the fuse."),
    ];

    let findings = classify(&responses);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].finding_type, FindingType::Logic);
    assert_eq!(findings[0].severity, Severity::High);
    assert_eq!(findings[0].rule, "polarity_conflict");
    assert_eq!(findings[0].sources, vec![ProviderId::new("a"), ProviderId::new("b")]);
}

/// Tests a compliance citation gap raises a medium finding.
#[test]
fn compliance_gap_raises_medium_finding() {
    let responses = vec![
        response("a", "Follow OSHA 1910.147 during the work."),
        response("b", "Tighten the bolts."),
    ];

    let findings = classify(&responses);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].finding_type, FindingType::Compliance);
    assert_eq!(findings[0].severity, Severity::Medium);
    assert!((findings[0].confidence - 0.85).abs() < f64::EPSILON);
}

/// Tests compliance tokens are matched case-sensitively.
#[test]
fn lowercase_standard_names_are_not_citations() {
    let responses = vec![response("a", "Follow osha rules."), response("b", "Tighten the bolts.")];

    assert!(classify(&responses).is_empty());
}

/// Tests agreeing responses produce no findings and both reviewers approve.
#[test]
fn agreeing_responses_produce_no_findings() {
    let responses = vec![
        response("a", "Tighten the bolts.").with_safety_score(0.8).with_logic_score(0.8),
        response("b", "Tighten the bolts.").with_safety_score(0.85).with_logic_score(0.7),
    ];
    let semantic = SemanticAnalyzer::new(SemanticConfig::default()).analyze(&responses);

    let classification = classifier().assess(&responses, &semantic);

    assert!(classification.findings.is_empty());
    assert!(classification.safety.approves);
    assert!(classification.logic.approves);
}

/// Tests the safety reviewer objecting while the logic reviewer approves.
#[test]
fn reviewer_opinions_can_diverge() {
    let responses = vec![
        response("a", "Replace the fuse.").with_safety_score(0.95),
        response("b", "Replace the fuse.").with_safety_score(0.2),
    ];
    let semantic = SemanticAnalyzer::new(SemanticConfig::default()).analyze(&responses);

    let classification = classifier().assess(&responses, &semantic);

    assert!(!classification.safety.approves);
    assert!(classification.logic.approves);
    assert_eq!(classification.safety.reviewer, "safety_reviewer");
}

struct AlwaysCritical;

impl FindingProducer for AlwaysCritical {
    fn name(&self) -> &'static str {
        "always_critical"
    }

    fn produce(
        &self,
        responses: &[ModelResponse],
        _semantic: &SemanticAnalysis,
    ) -> Vec<ContradictionFinding> {
        vec![ContradictionFinding {
            finding_type: FindingType::Procedure,
            severity: Severity::Critical,
            description: "procedure mismatch".to_string(),
            sources: responses.iter().map(|response| response.provider_id.clone()).collect(),
            confidence: 1.0,
            rule: "always".to_string(),
        }]
    }
}

/// Tests additional producers run after the built-in reviewers.
#[test]
fn custom_producers_append_findings_in_order() {
    let responses = vec![
        response("a", "Replace the fuse.").with_safety_score(0.9),
        response("b", "Replace the fuse.").with_safety_score(0.1),
    ];
    let semantic = SemanticAnalyzer::new(SemanticConfig::default()).analyze(&responses);
    let classifier = classifier().with_producer(Box::new(AlwaysCritical));

    let findings = classifier.classify(&responses, &semantic);

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].rule, "safety_score_range");
    assert_eq!(findings[1].rule, "always");
}
