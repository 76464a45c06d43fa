// crates/arbiter-core/src/core/verdict.rs
// ============================================================================
// Module: Arbiter Verdicts
// Description: Semantic analysis results and consensus verdicts.
// Purpose: Define the immutable outputs of the analyzer and decision engine.
// Dependencies: crate::core::{finding, identifiers}, serde
// ============================================================================

//! ## Overview
//! A [`SemanticAnalysis`] summarizes cross-model similarity and agreement. An
//! [`ArbitrationVerdict`] is created once per comparison run, never mutated,
//! and persisted to the evidence ledger by the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::finding::ContradictionFinding;
use crate::core::identifiers::ProviderId;

// ============================================================================
// SECTION: Semantic Analysis
// ============================================================================

/// Cosine similarity between one unordered pair of responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseSimilarity {
    /// First provider in the pair.
    pub left: ProviderId,
    /// Second provider in the pair.
    pub right: ProviderId,
    /// Similarity value (0.5 when either embedding is unavailable).
    pub similarity: f64,
}

/// Output of the semantic agreement analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    /// Similarity of every unordered pair, in input order.
    pub pairwise: Vec<PairwiseSimilarity>,
    /// Mean pairwise similarity.
    pub mean_similarity: f64,
    /// Agreement percentage in [0, 100].
    pub agreement_percentage: f64,
    /// Providers whose embeddings were absent or unusable.
    pub degraded_sources: Vec<ProviderId>,
}

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Consensus recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Ship automatically.
    Approve,
    /// Route to a human reviewer.
    Review,
    /// Reject and route to a human reviewer.
    Reject,
}

impl Recommendation {
    /// Returns true when the recommendation requires a human.
    #[must_use]
    pub const fn needs_human(self) -> bool {
        matches!(self, Self::Review | Self::Reject)
    }

    /// Returns a stable label for the recommendation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Review => "review",
            Self::Reject => "reject",
        }
    }
}

/// Consensus verdict for one comparison run.
///
/// # Invariants
/// - `consensus_achieved == (contradiction_score <= approve threshold)`.
/// - `Approve` only when the score and similarity both clear the approve bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationVerdict {
    /// Overall contradiction score in [0, 1].
    pub contradiction_score: f64,
    /// Findings ordered by producer, then rule.
    pub findings: Vec<ContradictionFinding>,
    /// Whether automated consensus was reached.
    pub consensus_achieved: bool,
    /// Agreement percentage in [0, 100].
    pub model_agreement_percentage: f64,
    /// Mean semantic similarity.
    pub semantic_similarity: f64,
    /// Recommendation.
    pub recommendation: Recommendation,
    /// Providers that contributed degraded input.
    #[serde(default)]
    pub degraded_sources: Vec<ProviderId>,
    /// Lexicon version used by the heuristics.
    pub lexicon_version: String,
}
