// crates/arbiter-core/src/runtime/decision.rs
// ============================================================================
// Module: Arbitration Decision Engine
// Description: Blends agreement, similarity, and findings into a verdict.
// Purpose: Map disagreement signals to approve, review, or reject.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The decision engine is pure. Every input is clipped into its valid range
//! before use and non-finite values are treated as maximal disagreement, so
//! the combined score is always a finite value in [0, 1].
//!
//! Thresholds are checked in order: approve, then review, otherwise reject.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ArbitrationVerdict;
use crate::core::ContradictionFinding;
use crate::core::LEXICON_VERSION;
use crate::core::ProviderId;
use crate::core::Recommendation;
use crate::core::Severity;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Per-severity penalty weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    /// Weight of a low finding.
    pub low: f64,
    /// Weight of a medium finding.
    pub medium: f64,
    /// Weight of a high finding.
    pub high: f64,
    /// Weight of a critical finding.
    pub critical: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 0.1,
            medium: 0.3,
            high: 0.6,
            critical: 1.0,
        }
    }
}

impl SeverityWeights {
    /// Returns the weight for a severity.
    #[must_use]
    pub const fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

/// Decision engine configuration.
///
/// # Invariants
/// - `approve_max_score <= review_max_score`.
/// - `approve_min_similarity >= review_min_similarity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Weight of the disagreement term (`1 - agreement / 100`).
    pub agreement_weight: f64,
    /// Weight of the dissimilarity term (`1 - similarity`).
    pub semantic_weight: f64,
    /// Weight of the finding penalty.
    pub findings_weight: f64,
    /// Penalty weights per severity.
    pub severity_weights: SeverityWeights,
    /// Highest score that can still approve.
    pub approve_max_score: f64,
    /// Lowest similarity that can still approve.
    pub approve_min_similarity: f64,
    /// Highest score that can still route to review.
    pub review_max_score: f64,
    /// Lowest similarity that can still route to review.
    pub review_min_similarity: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            agreement_weight: 0.4,
            semantic_weight: 0.3,
            findings_weight: 0.3,
            severity_weights: SeverityWeights::default(),
            approve_max_score: 0.35,
            approve_min_similarity: 0.7,
            review_max_score: 0.6,
            review_min_similarity: 0.5,
        }
    }
}

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Signals fed to the decision engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionInputs {
    /// Optional structured document score; the verdict score never drops below it.
    pub structured_score: Option<f64>,
    /// Classifier findings.
    pub findings: Vec<ContradictionFinding>,
    /// Agreement percentage in [0, 100].
    pub agreement_percentage: f64,
    /// Mean semantic similarity.
    pub semantic_similarity: f64,
    /// Providers that contributed degraded input.
    pub degraded_sources: Vec<ProviderId>,
    /// Lexicon version behind the findings.
    pub lexicon_version: String,
}

impl DecisionInputs {
    /// Builds inputs with no structured score and no degraded sources.
    #[must_use]
    pub fn new(
        findings: Vec<ContradictionFinding>,
        agreement_percentage: f64,
        semantic_similarity: f64,
    ) -> Self {
        Self {
            structured_score: None,
            findings,
            agreement_percentage,
            semantic_similarity,
            degraded_sources: Vec::new(),
            lexicon_version: LEXICON_VERSION.to_string(),
        }
    }

    /// Sets the structured document score.
    #[must_use]
    pub const fn with_structured_score(mut self, score: f64) -> Self {
        self.structured_score = Some(score);
        self
    }

    /// Sets the degraded sources.
    #[must_use]
    pub fn with_degraded_sources(mut self, sources: Vec<ProviderId>) -> Self {
        self.degraded_sources = sources;
        self
    }

    /// Sets the lexicon version.
    #[must_use]
    pub fn with_lexicon_version(mut self, version: impl Into<String>) -> Self {
        self.lexicon_version = version.into();
        self
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Pure verdict calculator.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    /// Weights and thresholds.
    config: DecisionConfig,
}

impl DecisionEngine {
    /// Creates a decision engine.
    #[must_use]
    pub const fn new(config: DecisionConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Finding penalty: mean of `severity weight * confidence`, clipped to [0, 1].
    #[must_use]
    pub fn findings_penalty(&self, findings: &[ContradictionFinding]) -> f64 {
        if findings.is_empty() {
            return 0.0;
        }
        let total: f64 = findings
            .iter()
            .map(|finding| {
                self.config.severity_weights.weight(finding.severity) * unit(finding.confidence)
            })
            .sum();
        let count = f64::from(u32::try_from(findings.len()).unwrap_or(u32::MAX));
        unit(total / count)
    }

    /// Combined contradiction score before any structured floor.
    #[must_use]
    pub fn combined_score(
        &self,
        findings: &[ContradictionFinding],
        agreement_percentage: f64,
        semantic_similarity: f64,
    ) -> f64 {
        let disagreement = unit(1.0 - finite_or(agreement_percentage, 0.0) / 100.0);
        let dissimilarity = unit(1.0 - finite_or(semantic_similarity, 0.0));
        let penalty = self.findings_penalty(findings);
        let config = &self.config;
        unit(config.agreement_weight.mul_add(
            disagreement,
            config.semantic_weight.mul_add(dissimilarity, config.findings_weight * penalty),
        ))
    }

    /// Produces the verdict.
    #[must_use]
    pub fn decide(&self, inputs: DecisionInputs) -> ArbitrationVerdict {
        let agreement = finite_or(inputs.agreement_percentage, 0.0).clamp(0.0, 100.0);
        let similarity = finite_or(inputs.semantic_similarity, 0.0).clamp(-1.0, 1.0);
        let combined = self.combined_score(&inputs.findings, agreement, similarity);
        let score = match inputs.structured_score {
            Some(structured) => combined.max(unit(finite_or(structured, 1.0))),
            None => combined,
        };
        ArbitrationVerdict {
            contradiction_score: score,
            findings: inputs.findings,
            consensus_achieved: score <= self.config.approve_max_score,
            model_agreement_percentage: agreement,
            semantic_similarity: similarity,
            recommendation: self.recommend(score, similarity),
            degraded_sources: inputs.degraded_sources,
            lexicon_version: inputs.lexicon_version,
        }
    }

    /// Applies the threshold table.
    fn recommend(&self, score: f64, similarity: f64) -> Recommendation {
        let config = &self.config;
        if score <= config.approve_max_score && similarity >= config.approve_min_similarity {
            Recommendation::Approve
        } else if score <= config.review_max_score && similarity >= config.review_min_similarity {
            Recommendation::Review
        } else {
            Recommendation::Reject
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Replaces non-finite values with `fallback`.
const fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Clamps into [0, 1], mapping NaN to 1.
const fn unit(value: f64) -> f64 {
    if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) }
}
