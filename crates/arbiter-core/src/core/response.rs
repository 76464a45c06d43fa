// crates/arbiter-core/src/core/response.rs
// ============================================================================
// Module: Arbiter Model Responses
// Description: Free-text provider outputs with confidence sub-scores and embeddings.
// Purpose: Carry already-resolved provider outputs into the semantic analyzer.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A [`ModelResponse`] is produced by the provider gateway outside this crate.
//! Embeddings are attached by an external embedding service; the arbiter never
//! requests them and treats a missing embedding as degraded input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ProviderId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Model Responses
// ============================================================================

/// One provider's free-text answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Provider that produced the response.
    pub provider_id: ProviderId,
    /// Raw response text.
    pub text: String,
    /// Provider confidence in [0, 1].
    pub confidence: f64,
    /// Optional safety sub-score in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<f64>,
    /// Optional logic sub-score in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_score: Option<f64>,
    /// Optional completeness sub-score in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness_score: Option<f64>,
    /// Time the response was produced.
    pub timestamp: Timestamp,
    /// Optional embedding vector supplied by the embedding service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ModelResponse {
    /// Creates a response with only text and confidence.
    #[must_use]
    pub fn new(
        provider_id: ProviderId,
        text: impl Into<String>,
        confidence: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            provider_id,
            text: text.into(),
            confidence,
            safety_score: None,
            logic_score: None,
            completeness_score: None,
            timestamp,
            embedding: None,
        }
    }

    /// Sets the safety sub-score.
    #[must_use]
    pub const fn with_safety_score(mut self, score: f64) -> Self {
        self.safety_score = Some(score);
        self
    }

    /// Sets the logic sub-score.
    #[must_use]
    pub const fn with_logic_score(mut self, score: f64) -> Self {
        self.logic_score = Some(score);
        self
    }

    /// Sets the completeness sub-score.
    #[must_use]
    pub const fn with_completeness_score(mut self, score: f64) -> Self {
        self.completeness_score = Some(score);
        self
    }

    /// Attaches an embedding vector.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Returns the embedding when present and non-empty.
    #[must_use]
    pub fn usable_embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|vector| !vector.is_empty())
    }

    /// Mean of the confidence and every present sub-score.
    #[must_use]
    pub fn composite_confidence(&self) -> f64 {
        let parts =
            [Some(self.confidence), self.safety_score, self.logic_score, self.completeness_score];
        let (sum, count) = parts
            .iter()
            .flatten()
            .filter(|value| value.is_finite())
            .fold((0.0_f64, 0_u32), |(sum, count), value| (sum + value, count + 1));
        if count == 0 { 0.0 } else { sum / f64::from(count) }
    }
}
