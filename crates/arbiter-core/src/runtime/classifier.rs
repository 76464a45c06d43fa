// crates/arbiter-core/src/runtime/classifier.rs
// ============================================================================
// Module: Contradiction Classifier
// Description: Rule-based finding producers for safety, logic, and compliance.
// Purpose: Turn response-level disagreement into typed, severity-ranked findings.
// Dependencies: crate::core, crate::runtime::semantic
// ============================================================================

//! ## Overview
//! Each reviewer implements [`FindingProducer`] and inspects the full response
//! set. The classifier concatenates findings in producer order, then rule
//! order, so identical inputs always yield identical finding lists. The
//! safety and logic reviewers also produce an opinion; when those opinions
//! diverge the engine opens a contradiction-resolution case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ContradictionFinding;
use crate::core::FindingType;
use crate::core::Lexicons;
use crate::core::ModelResponse;
use crate::core::ProviderId;
use crate::core::SemanticAnalysis;
use crate::core::Severity;
use crate::core::lexicon::count_matches;
use crate::runtime::semantic::population_variance;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Rule thresholds for the built-in reviewers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Safety score range above which a high-severity finding is raised.
    pub safety_score_range: f64,
    /// Safety keyword count spread above which a medium finding is raised.
    pub safety_keyword_spread: usize,
    /// Logic score variance above which a medium finding is raised.
    pub logic_score_variance: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            safety_score_range: 0.3,
            safety_keyword_spread: 3,
            logic_score_variance: 0.2,
        }
    }
}

// ============================================================================
// SECTION: Producer Trait
// ============================================================================

/// Produces contradiction findings from a response set.
pub trait FindingProducer: Send + Sync {
    /// Stable producer name used in opinions and audit output.
    fn name(&self) -> &'static str;

    /// Inspects the responses and returns findings in rule order.
    fn produce(
        &self,
        responses: &[ModelResponse],
        semantic: &SemanticAnalysis,
    ) -> Vec<ContradictionFinding>;

    /// Produces findings and condenses them into an approve/object opinion.
    fn opinion(&self, responses: &[ModelResponse], semantic: &SemanticAnalysis) -> ReviewerOpinion {
        let findings = self.produce(responses, semantic);
        ReviewerOpinion {
            reviewer: self.name(),
            approves: findings.iter().all(|finding| finding.severity < Severity::High),
            findings,
        }
    }
}

/// A reviewer's condensed stance on a response set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerOpinion {
    /// Producer name.
    pub reviewer: &'static str,
    /// True when no finding is high severity or above.
    pub approves: bool,
    /// Findings backing the opinion.
    pub findings: Vec<ContradictionFinding>,
}

impl ReviewerOpinion {
    /// One-line summary for case options.
    #[must_use]
    pub fn summary(&self) -> String {
        let stance = if self.approves { "approve" } else { "object" };
        format!("{}: {stance} ({} finding(s))", self.reviewer, self.findings.len())
    }
}

// ============================================================================
// SECTION: Safety Reviewer
// ============================================================================

/// Flags disagreement on safety scores and safety vocabulary.
#[derive(Debug, Clone)]
pub struct SafetyReviewer {
    /// Rule thresholds.
    config: ClassifierConfig,
    /// Heuristic vocabulary.
    lexicons: Lexicons,
}

impl SafetyReviewer {
    /// Creates the reviewer.
    #[must_use]
    pub const fn new(config: ClassifierConfig, lexicons: Lexicons) -> Self {
        Self {
            config,
            lexicons,
        }
    }
}

impl FindingProducer for SafetyReviewer {
    fn name(&self) -> &'static str {
        "safety_reviewer"
    }

    fn produce(
        &self,
        responses: &[ModelResponse],
        _semantic: &SemanticAnalysis,
    ) -> Vec<ContradictionFinding> {
        let mut findings = Vec::new();

        let scored: Vec<(&ProviderId, f64)> = responses
            .iter()
            .filter_map(|response| {
                response
                    .safety_score
                    .filter(|score| score.is_finite())
                    .map(|score| (&response.provider_id, score))
            })
            .collect();
        if let Some(((low_provider, low), (high_provider, high))) = extremes(&scored)
            && high - low > self.config.safety_score_range
        {
            findings.push(ContradictionFinding {
                finding_type: FindingType::Safety,
                severity: Severity::High,
                description: format!("safety scores range from {low:.2} to {high:.2}"),
                sources: distinct([low_provider, high_provider]),
                confidence: 0.9,
                rule: "safety_score_range".to_string(),
            });
        }

        if responses.len() >= 2 {
            let counts: Vec<(&ProviderId, f64)> = responses
                .iter()
                .map(|response| {
                    let count = count_matches(&response.text, self.lexicons.safety_keywords);
                    (&response.provider_id, f64::from(u32::try_from(count).unwrap_or(u32::MAX)))
                })
                .collect();
            if let Some(((low_provider, low), (high_provider, high))) = extremes(&counts)
                && high - low > keyword_spread_limit(self.config.safety_keyword_spread)
            {
                findings.push(ContradictionFinding {
                    finding_type: FindingType::Safety,
                    severity: Severity::Medium,
                    description: format!("safety keyword counts range from {low} to {high}"),
                    sources: distinct([low_provider, high_provider]),
                    confidence: 0.7,
                    rule: "safety_keyword_spread".to_string(),
                });
            }
        }
        findings
    }
}

// ============================================================================
// SECTION: Logic Reviewer
// ============================================================================

/// Flags disagreement on logic scores and response polarity.
#[derive(Debug, Clone)]
pub struct LogicReviewer {
    /// Rule thresholds.
    config: ClassifierConfig,
    /// Heuristic vocabulary.
    lexicons: Lexicons,
}

impl LogicReviewer {
    /// Creates the reviewer.
    #[must_use]
    pub const fn new(config: ClassifierConfig, lexicons: Lexicons) -> Self {
        Self {
            config,
            lexicons,
        }
    }

    /// Positive minus negative indicator count.
    fn polarity(&self, text: &str) -> i64 {
        let positive = count_matches(text, self.lexicons.positive_indicators);
        let negative = count_matches(text, self.lexicons.negative_indicators);
        i64::try_from(positive).unwrap_or(i64::MAX) - i64::try_from(negative).unwrap_or(i64::MAX)
    }
}

impl FindingProducer for LogicReviewer {
    fn name(&self) -> &'static str {
        "logic_reviewer"
    }

    fn produce(
        &self,
        responses: &[ModelResponse],
        _semantic: &SemanticAnalysis,
    ) -> Vec<ContradictionFinding> {
        let mut findings = Vec::new();

        let (providers, scores): (Vec<&ProviderId>, Vec<f64>) = responses
            .iter()
            .filter_map(|response| {
                response
                    .logic_score
                    .filter(|score| score.is_finite())
                    .map(|score| (&response.provider_id, score))
            })
            .unzip();
        let variance = population_variance(&scores);
        if scores.len() >= 2 && variance > self.config.logic_score_variance {
            findings.push(ContradictionFinding {
                finding_type: FindingType::Logic,
                severity: Severity::Medium,
                description: format!("logic score variance {variance:.3}"),
                sources: distinct(providers),
                confidence: 0.75,
                rule: "logic_score_variance".to_string(),
            });
        }

        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for response in responses {
            match self.polarity(&response.text) {
                net if net > 0 => positive.push(&response.provider_id),
                net if net < 0 => negative.push(&response.provider_id),
                _ => {}
            }
        }
        if !positive.is_empty() && !negative.is_empty() {
            findings.push(ContradictionFinding {
                finding_type: FindingType::Logic,
                severity: Severity::High,
                description: format!(
                    "{} response(s) endorse the procedure while {} oppose it",
                    positive.len(),
                    negative.len()
                ),
                sources: distinct(positive.into_iter().chain(negative)),
                confidence: 0.8,
                rule: "polarity_conflict".to_string(),
            });
        }
        findings
    }
}

// ============================================================================
// SECTION: Compliance Reviewer
// ============================================================================

/// Flags responses that disagree on which compliance standards apply.
#[derive(Debug, Clone)]
pub struct ComplianceReviewer {
    /// Heuristic vocabulary.
    lexicons: Lexicons,
}

impl ComplianceReviewer {
    /// Creates the reviewer.
    #[must_use]
    pub const fn new(lexicons: Lexicons) -> Self {
        Self {
            lexicons,
        }
    }

    /// True when the text cites a recognized standard (case-sensitive).
    fn cites_standard(&self, text: &str) -> bool {
        text.split(|ch: char| !ch.is_alphanumeric())
            .any(|token| self.lexicons.compliance_standards.contains(&token))
    }
}

impl FindingProducer for ComplianceReviewer {
    fn name(&self) -> &'static str {
        "compliance_reviewer"
    }

    fn produce(
        &self,
        responses: &[ModelResponse],
        _semantic: &SemanticAnalysis,
    ) -> Vec<ContradictionFinding> {
        if responses.len() < 2 {
            return Vec::new();
        }
        let (citing, silent): (Vec<&ModelResponse>, Vec<&ModelResponse>) =
            responses.iter().partition(|response| self.cites_standard(&response.text));
        if citing.is_empty() || silent.is_empty() {
            return Vec::new();
        }
        vec![ContradictionFinding {
            finding_type: FindingType::Compliance,
            severity: Severity::Medium,
            description: format!(
                "{} response(s) cite compliance standards, {} cite none",
                citing.len(),
                silent.len()
            ),
            sources: distinct(citing.iter().chain(&silent).map(|response| &response.provider_id)),
            confidence: 0.85,
            rule: "compliance_reference_gap".to_string(),
        }]
    }
}

// ============================================================================
// SECTION: Classifier
// ============================================================================

/// Classifier output for one response set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Findings in producer order, then rule order.
    pub findings: Vec<ContradictionFinding>,
    /// Safety reviewer opinion.
    pub safety: ReviewerOpinion,
    /// Logic reviewer opinion.
    pub logic: ReviewerOpinion,
}

/// Composes the safety, logic, and any additional finding producers.
pub struct ContradictionClassifier {
    /// Safety reviewer.
    safety: SafetyReviewer,
    /// Logic reviewer.
    logic: LogicReviewer,
    /// Additional producers, run after safety and logic.
    others: Vec<Box<dyn FindingProducer>>,
}

impl ContradictionClassifier {
    /// Creates a classifier with the built-in safety, logic, and compliance reviewers.
    #[must_use]
    pub fn new(config: ClassifierConfig, lexicons: Lexicons) -> Self {
        Self {
            safety: SafetyReviewer::new(config, lexicons),
            logic: LogicReviewer::new(config, lexicons),
            others: vec![Box::new(ComplianceReviewer::new(lexicons))],
        }
    }

    /// Appends a producer that runs after the built-in reviewers.
    #[must_use]
    pub fn with_producer(mut self, producer: Box<dyn FindingProducer>) -> Self {
        self.others.push(producer);
        self
    }

    /// Returns findings from every producer.
    #[must_use]
    pub fn classify(
        &self,
        responses: &[ModelResponse],
        semantic: &SemanticAnalysis,
    ) -> Vec<ContradictionFinding> {
        self.assess(responses, semantic).findings
    }

    /// Returns findings plus the safety and logic opinions.
    #[must_use]
    pub fn assess(
        &self,
        responses: &[ModelResponse],
        semantic: &SemanticAnalysis,
    ) -> Classification {
        let safety = self.safety.opinion(responses, semantic);
        let logic = self.logic.opinion(responses, semantic);
        let mut findings = Vec::new();
        findings.extend(safety.findings.iter().cloned());
        findings.extend(logic.findings.iter().cloned());
        for producer in &self.others {
            findings.extend(producer.produce(responses, semantic));
        }
        Classification {
            findings,
            safety,
            logic,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the minimum and maximum entries by value.
fn extremes<'a>(
    values: &[(&'a ProviderId, f64)],
) -> Option<((&'a ProviderId, f64), (&'a ProviderId, f64))> {
    let first = *values.first()?;
    Some(values.iter().fold((first, first), |(low, high), &entry| {
        (if entry.1 < low.1 { entry } else { low }, if entry.1 > high.1 { entry } else { high })
    }))
}

/// Keyword spread threshold as a float.
fn keyword_spread_limit(spread: usize) -> f64 {
    f64::from(u32::try_from(spread).unwrap_or(u32::MAX))
}

/// Deduplicates providers while preserving first-seen order.
fn distinct<'a>(providers: impl IntoIterator<Item = &'a ProviderId>) -> Vec<ProviderId> {
    let mut out: Vec<ProviderId> = Vec::new();
    for provider in providers {
        if !out.contains(provider) {
            out.push(provider.clone());
        }
    }
    out
}
