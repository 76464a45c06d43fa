// crates/arbiter-core/src/runtime/semantic.rs
// ============================================================================
// Module: Semantic Agreement Analyzer
// Description: Embedding similarity and confidence agreement across responses.
// Purpose: Quantify how closely independent model responses agree.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Pairwise cosine similarity is computed over caller-supplied embeddings.
//! Missing, empty, or dimension-mismatched vectors are scored as a neutral
//! similarity and the offending providers are reported as degraded sources.
//! Agreement is derived from the population variance of each response's
//! composite confidence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ModelResponse;
use crate::core::PairwiseSimilarity;
use crate::core::ProviderId;
use crate::core::SemanticAnalysis;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Semantic analyzer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Similarity assigned to pairs where either embedding is unusable.
    pub neutral_similarity: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            neutral_similarity: 0.5,
        }
    }
}

// ============================================================================
// SECTION: Analyzer
// ============================================================================

/// Stateless semantic agreement analyzer.
#[derive(Debug, Clone, Default)]
pub struct SemanticAnalyzer {
    /// Analyzer configuration.
    config: SemanticConfig,
}

impl SemanticAnalyzer {
    /// Creates an analyzer.
    #[must_use]
    pub const fn new(config: SemanticConfig) -> Self {
        Self {
            config,
        }
    }

    /// Cosine similarity between two vectors.
    ///
    /// Returns the neutral similarity for empty or mismatched vectors and 0
    /// when either vector has zero norm.
    #[must_use]
    pub fn cosine(&self, left: &[f32], right: &[f32]) -> f64 {
        if left.is_empty() || right.is_empty() || left.len() != right.len() {
            return self.config.neutral_similarity;
        }
        let mut dot = 0.0_f64;
        let mut norm_left = 0.0_f64;
        let mut norm_right = 0.0_f64;
        for (a, b) in left.iter().zip(right) {
            let (a, b) = (f64::from(*a), f64::from(*b));
            dot = a.mul_add(b, dot);
            norm_left = a.mul_add(a, norm_left);
            norm_right = b.mul_add(b, norm_right);
        }
        let denominator = norm_left.sqrt() * norm_right.sqrt();
        if denominator == 0.0 || !denominator.is_finite() || !dot.is_finite() {
            return 0.0;
        }
        (dot / denominator).clamp(-1.0, 1.0)
    }

    /// Pairwise similarities, mean similarity, and confidence agreement.
    #[must_use]
    pub fn analyze(&self, responses: &[ModelResponse]) -> SemanticAnalysis {
        let mut pairwise = Vec::new();
        for (index, left) in responses.iter().enumerate() {
            for right in &responses[index + 1 ..] {
                let similarity = match (left.usable_embedding(), right.usable_embedding()) {
                    (Some(a), Some(b)) => self.cosine(a, b),
                    _ => self.config.neutral_similarity,
                };
                pairwise.push(PairwiseSimilarity {
                    left: left.provider_id.clone(),
                    right: right.provider_id.clone(),
                    similarity,
                });
            }
        }
        let embedded =
            responses.iter().filter(|response| response.usable_embedding().is_some()).count();
        let mean_similarity = if embedded < 2 || pairwise.is_empty() {
            1.0
        } else {
            pairwise.iter().map(|pair| pair.similarity).sum::<f64>() / count_as_f64(pairwise.len())
        };
        SemanticAnalysis {
            pairwise,
            mean_similarity,
            agreement_percentage: agreement_percentage(responses),
            degraded_sources: degraded_sources(responses),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// `max(0, 1 - population variance of composite confidences) * 100`.
#[must_use]
pub fn agreement_percentage(responses: &[ModelResponse]) -> f64 {
    let composites: Vec<f64> = responses.iter().map(ModelResponse::composite_confidence).collect();
    ((1.0 - population_variance(&composites)).max(0.0) * 100.0).clamp(0.0, 100.0)
}

/// Population variance; zero for fewer than two values.
#[must_use]
pub fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let count = count_as_f64(values.len());
    let mean = values.iter().sum::<f64>() / count;
    values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count
}

/// Providers whose embedding is missing, empty, or off the dominant dimension.
fn degraded_sources(responses: &[ModelResponse]) -> Vec<ProviderId> {
    let reference_dimension =
        responses.iter().find_map(ModelResponse::usable_embedding).map(<[f32]>::len);
    let mut degraded: Vec<ProviderId> = Vec::new();
    for response in responses {
        let usable = match (response.usable_embedding(), reference_dimension) {
            (Some(vector), Some(dimension)) => vector.len() == dimension,
            _ => false,
        };
        if !usable && !degraded.contains(&response.provider_id) {
            degraded.push(response.provider_id.clone());
        }
    }
    degraded
}

/// Converts a collection length to `f64`.
#[allow(clippy::cast_precision_loss, reason = "Response counts are far below 2^52.")]
const fn count_as_f64(count: usize) -> f64 {
    count as f64
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
