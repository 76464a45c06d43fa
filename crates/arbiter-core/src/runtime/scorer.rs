// crates/arbiter-core/src/runtime/scorer.rs
// ============================================================================
// Module: Structured Difference Scorer
// Description: Field-by-field comparison of two structured procedure documents.
// Purpose: Produce the weighted scalar contradiction score between documents.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The scorer aligns steps by index and derives four sub-scores: step
//! difference, specification difference, risk difference, and a heuristic
//! contradiction rate. Every sub-score is symmetric in its two inputs and
//! missing data degrades to the worst case (1.0) instead of failing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ContradictionScore;
use crate::core::Lexicons;
use crate::core::ProcedureDocument;
use crate::core::ProcedureStep;
use crate::core::ScoreWeights;
use crate::core::lexicon::normalized_tokens;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Weights blending per-step field similarities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepSimilarityWeights {
    /// Instruction text token-set similarity.
    pub text: f64,
    /// Tool set similarity.
    pub tools: f64,
    /// PPE set similarity.
    pub ppe: f64,
    /// Risk set similarity.
    pub risks: f64,
    /// Verification set similarity.
    pub verifications: f64,
}

impl Default for StepSimilarityWeights {
    fn default() -> Self {
        Self {
            text: 0.4,
            tools: 0.2,
            ppe: 0.15,
            risks: 0.15,
            verifications: 0.1,
        }
    }
}

impl StepSimilarityWeights {
    /// Returns the weights as an array.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 5] {
        [self.text, self.tools, self.ppe, self.risks, self.verifications]
    }
}

/// Structured scorer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Sub-score weights for the total.
    pub weights: ScoreWeights,
    /// Per-step similarity blend.
    pub step_similarity: StepSimilarityWeights,
    /// Weight of the length-mismatch penalty inside the step difference.
    pub length_penalty_weight: f64,
    /// Pass threshold for the total.
    pub threshold: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            step_similarity: StepSimilarityWeights::default(),
            length_penalty_weight: 0.3,
            threshold: 0.35,
        }
    }
}

// ============================================================================
// SECTION: Scorer
// ============================================================================

/// Pure structured document comparator.
#[derive(Debug, Clone)]
pub struct StructuredScorer {
    /// Scoring configuration.
    config: ScorerConfig,
    /// Heuristic vocabulary.
    lexicons: Lexicons,
}

impl StructuredScorer {
    /// Creates a scorer from its configuration and lexicons.
    #[must_use]
    pub const fn new(config: ScorerConfig, lexicons: Lexicons) -> Self {
        Self {
            config,
            lexicons,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Scores two documents.
    #[must_use]
    pub fn score(&self, left: &ProcedureDocument, right: &ProcedureDocument) -> ContradictionScore {
        ContradictionScore::combine(
            self.step_diff(left, right),
            spec_diff(left, right),
            risk_diff(left, right),
            self.nli_rate(left, right),
            &self.config.weights,
            self.config.threshold,
        )
    }

    /// Returns the mean total over all unordered document pairs (0 for fewer
    /// than two documents).
    #[must_use]
    pub fn score_all(&self, documents: &[ProcedureDocument]) -> f64 {
        let mut sum = 0.0;
        let mut pairs = 0_u32;
        for (index, left) in documents.iter().enumerate() {
            for right in &documents[index + 1 ..] {
                sum += self.score(left, right).total;
                pairs += 1;
            }
        }
        if pairs == 0 { 0.0 } else { sum / f64::from(pairs) }
    }

    /// Length penalty blended with mean per-step dissimilarity.
    fn step_diff(&self, left: &ProcedureDocument, right: &ProcedureDocument) -> f64 {
        if left.is_empty() || right.is_empty() {
            return 1.0;
        }
        let (len_left, len_right) = (left.steps.len(), right.steps.len());
        let longest = len_left.max(len_right);
        let length_penalty = ratio(len_left.abs_diff(len_right), longest);
        let dissimilarity = mean(
            left.steps
                .iter()
                .zip(&right.steps)
                .map(|(a, b)| self.step_dissimilarity(a, b)),
        );
        let weight = self.config.length_penalty_weight;
        clamp_unit(weight.mul_add(length_penalty, (1.0 - weight) * dissimilarity))
    }

    /// Weighted dissimilarity of one aligned step pair.
    fn step_dissimilarity(&self, left: &ProcedureStep, right: &ProcedureStep) -> f64 {
        let weights = self.config.step_similarity;
        let similarities = [
            jaccard(&token_set(&left.instruction), &token_set(&right.instruction)),
            jaccard(&normalized_set(&left.tools), &normalized_set(&right.tools)),
            jaccard(&normalized_set(&left.ppe), &normalized_set(&right.ppe)),
            jaccard(&normalized_set(&left.risks), &normalized_set(&right.risks)),
            jaccard(&normalized_set(&left.verifications), &normalized_set(&right.verifications)),
        ];
        let total_weight: f64 = weights.as_array().iter().sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = weights
            .as_array()
            .iter()
            .zip(similarities)
            .map(|(weight, similarity)| weight * (1.0 - similarity))
            .sum();
        clamp_unit(weighted / total_weight)
    }

    /// Heuristic contradiction rate over aligned step pairs.
    fn nli_rate(&self, left: &ProcedureDocument, right: &ProcedureDocument) -> f64 {
        if left.is_empty() || right.is_empty() {
            return 1.0;
        }
        let mut hits = 0_usize;
        let mut pairs = 0_usize;
        for (a, b) in left.steps.iter().zip(&right.steps) {
            pairs += 1;
            if self.text_contradicts(a, b) {
                hits += 1;
            }
            if self.safety_contradicts(a, b) {
                hits += 1;
            }
        }
        clamp_unit(ratio(hits, pairs))
    }

    /// Negation or antonym-action conflict between two step texts.
    fn text_contradicts(&self, left: &ProcedureStep, right: &ProcedureStep) -> bool {
        let left_tokens = token_set(&left.instruction);
        let right_tokens = token_set(&right.instruction);
        let negated = |tokens: &BTreeSet<String>| {
            self.lexicons.negation_words.iter().any(|word| tokens.contains(*word))
        };
        if negated(&left_tokens) != negated(&right_tokens) {
            return true;
        }
        self.lexicons.antonym_actions.iter().any(|(first, second)| {
            leans_toward(&left_tokens, first, second) && leans_toward(&right_tokens, second, first)
                || leans_toward(&left_tokens, second, first)
                    && leans_toward(&right_tokens, first, second)
        })
    }

    /// One step requires PPE or lockout that the other explicitly denies.
    fn safety_contradicts(&self, left: &ProcedureStep, right: &ProcedureStep) -> bool {
        self.denies_requirements(left, right) || self.denies_requirements(right, left)
    }

    /// Returns true when `other` denies a requirement that `required` lists.
    fn denies_requirements(&self, required: &ProcedureStep, other: &ProcedureStep) -> bool {
        let text = collapse_whitespace(&other.instruction);
        let denies_ppe = !required.ppe.is_empty()
            && other.ppe.is_empty()
            && self.lexicons.ppe_denials.iter().any(|phrase| text.contains(phrase));
        let denies_lockout = !required.lockout_tags.is_empty()
            && other.lockout_tags.is_empty()
            && self.lexicons.lockout_denials.iter().any(|phrase| text.contains(phrase));
        denies_ppe || denies_lockout
    }
}

// ============================================================================
// SECTION: Sub-Scores
// ============================================================================

/// Mean specification mismatch over aligned step pairs.
fn spec_diff(left: &ProcedureDocument, right: &ProcedureDocument) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 1.0;
    }
    mean(left.steps.iter().zip(&right.steps).map(|(a, b)| {
        let specs_left = normalized_specs(&a.specifications);
        let specs_right = normalized_specs(&b.specifications);
        let keys: BTreeSet<&String> = specs_left.keys().chain(specs_right.keys()).collect();
        if keys.is_empty() {
            return 0.0;
        }
        let matching = keys
            .iter()
            .filter(|key| match (specs_left.get(**key), specs_right.get(**key)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            })
            .count();
        1.0 - ratio(matching, keys.len())
    }))
}

/// Jaccard distance between the document-wide risk unions.
fn risk_diff(left: &ProcedureDocument, right: &ProcedureDocument) -> f64 {
    let risks_left = left.risk_union();
    let risks_right = right.risk_union();
    match (risks_left.is_empty(), risks_right.is_empty()) {
        (true, true) => 0.0,
        (true, false) | (false, true) => 1.0,
        (false, false) => 1.0 - jaccard(&risks_left, &risks_right),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Jaccard similarity; two empty sets are identical.
fn jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 1.0;
    }
    ratio(left.intersection(right).count(), union)
}

/// Lower-cased whitespace token set of a text.
fn token_set(text: &str) -> BTreeSet<String> {
    normalized_tokens(text).into_iter().collect()
}

/// Case-normalized, trimmed copy of a string set.
fn normalized_set(values: &BTreeSet<String>) -> BTreeSet<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Case-normalized specification map.
fn normalized_specs(specs: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    specs
        .iter()
        .map(|(key, value)| (key.trim().to_lowercase(), collapse_whitespace(value)))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Lower-cases text and collapses runs of whitespace to single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

/// Token set contains `word` but not its `opposite`.
fn leans_toward(tokens: &BTreeSet<String>, word: &str, opposite: &str) -> bool {
    tokens.contains(word) && !tokens.contains(opposite)
}

/// Arithmetic mean; zero for an empty iterator.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) =
        values.fold((0.0_f64, 0_u32), |(sum, count), value| (sum + value, count + 1));
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}

/// `numerator / denominator` as a float; zero when the denominator is zero.
#[allow(clippy::cast_precision_loss, reason = "Step and set counts are far below 2^52.")]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

/// Clamps a value into [0, 1].
const fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
