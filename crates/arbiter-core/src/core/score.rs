// crates/arbiter-core/src/core/score.rs
// ============================================================================
// Module: Arbiter Contradiction Score
// Description: Weighted scalar contradiction score between two procedure documents.
// Purpose: Record the sub-scores, weights, and threshold outcome of a comparison.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ContradictionScore`] is a convex combination of four sub-scores, each
//! in [0, 1]. `passed` is always `total <= threshold`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Weights
// ============================================================================

/// Convex weights combining the four sub-scores into the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of the step difference.
    pub step: f64,
    /// Weight of the specification difference.
    pub spec: f64,
    /// Weight of the risk difference.
    pub risk: f64,
    /// Weight of the heuristic contradiction rate.
    pub nli: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            step: 0.35,
            spec: 0.35,
            risk: 0.15,
            nli: 0.15,
        }
    }
}

impl ScoreWeights {
    /// Returns the weights as a slice-friendly array.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [self.step, self.spec, self.risk, self.nli]
    }
}

// ============================================================================
// SECTION: Score
// ============================================================================

/// Structured contradiction score between two documents.
///
/// # Invariants
/// - Every sub-score lies in [0, 1].
/// - `total` is the weighted sum of the sub-scores.
/// - `passed == (total <= threshold)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContradictionScore {
    /// Step-level structural difference.
    pub step_diff: f64,
    /// Specification value difference.
    pub spec_diff: f64,
    /// Risk set difference.
    pub risk_diff: f64,
    /// Heuristic contradiction rate.
    pub nli_rate: f64,
    /// Weighted total.
    pub total: f64,
    /// Threshold applied to `total`.
    pub threshold: f64,
    /// Whether the total is within the threshold.
    pub passed: bool,
}

impl ContradictionScore {
    /// Combines sub-scores with the given weights and threshold.
    #[must_use]
    pub fn combine(
        step_diff: f64,
        spec_diff: f64,
        risk_diff: f64,
        nli_rate: f64,
        weights: &ScoreWeights,
        threshold: f64,
    ) -> Self {
        let total = weights.nli.mul_add(
            nli_rate,
            weights
                .risk
                .mul_add(risk_diff, weights.step.mul_add(step_diff, weights.spec * spec_diff)),
        );
        let total = total.clamp(0.0, 1.0);
        Self {
            step_diff,
            spec_diff,
            risk_diff,
            nli_rate,
            total,
            threshold,
            passed: total <= threshold,
        }
    }
}
