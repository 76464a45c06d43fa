// crates/arbiter-core/src/core/finding.rs
// ============================================================================
// Module: Arbiter Contradiction Findings
// Description: Typed, severity-tagged contradictions detected between model outputs.
// Purpose: Carry rule provenance from the classifier into verdicts and the ledger.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Findings are derived per analysis run and never stored on their own; they
//! travel inside the [`crate::core::ArbitrationVerdict`] that produced them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ProviderId;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Contradiction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    /// Disagreement on hazards or protective measures.
    Safety,
    /// Disagreement in reasoning or stance.
    Logic,
    /// Disagreement in the procedure itself.
    Procedure,
    /// Disagreement on regulatory references.
    Compliance,
}

/// Finding severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Needs attention.
    Medium,
    /// Blocks automatic approval.
    High,
    /// Must be resolved by a human.
    Critical,
}

impl Severity {
    /// Returns a stable label for the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// A single detected contradiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionFinding {
    /// Contradiction category.
    pub finding_type: FindingType,
    /// Severity tag.
    pub severity: Severity,
    /// Human-readable description.
    pub description: String,
    /// Providers whose outputs contributed to the finding.
    pub sources: Vec<ProviderId>,
    /// Fixed rule confidence in [0, 1].
    pub confidence: f64,
    /// Stable identifier of the rule that fired.
    pub rule: String,
}
