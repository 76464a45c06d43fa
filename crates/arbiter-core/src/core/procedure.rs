// crates/arbiter-core/src/core/procedure.rs
// ============================================================================
// Module: Arbiter Procedure Model
// Description: Structured procedure documents produced by one generation pass.
// Purpose: Provide the immutable comparison inputs for the structured scorer.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`ProcedureDocument`] is an ordered list of [`ProcedureStep`] records.
//! Documents are produced once and only ever compared, never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DocumentId;

// ============================================================================
// SECTION: Procedure Steps
// ============================================================================

/// One step of a generated technical procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureStep {
    /// Free-text instruction.
    pub instruction: String,
    /// Required tools.
    #[serde(default)]
    pub tools: BTreeSet<String>,
    /// Required personal protective equipment.
    #[serde(default)]
    pub ppe: BTreeSet<String>,
    /// Named risks.
    #[serde(default)]
    pub risks: BTreeSet<String>,
    /// Verification checks.
    #[serde(default)]
    pub verifications: BTreeSet<String>,
    /// Specification values keyed by component (e.g. torque per fastener).
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// Lockout/tagout tags.
    #[serde(default)]
    pub lockout_tags: Vec<String>,
}

impl ProcedureStep {
    /// Creates a step with only an instruction.
    #[must_use]
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }

    /// Adds required tools.
    #[must_use]
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    /// Adds required protective equipment.
    #[must_use]
    pub fn with_ppe<I, S>(mut self, ppe: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ppe.extend(ppe.into_iter().map(Into::into));
        self
    }

    /// Adds named risks.
    #[must_use]
    pub fn with_risks<I, S>(mut self, risks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.risks.extend(risks.into_iter().map(Into::into));
        self
    }

    /// Adds verification checks.
    #[must_use]
    pub fn with_verifications<I, S>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verifications.extend(checks.into_iter().map(Into::into));
        self
    }

    /// Adds a specification value.
    #[must_use]
    pub fn with_specification(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.specifications.insert(key.into(), value.into());
        self
    }

    /// Adds lockout/tagout tags.
    #[must_use]
    pub fn with_lockout_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lockout_tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// SECTION: Procedure Documents
// ============================================================================

/// Ordered procedure document from a single generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDocument {
    /// Document identifier assigned by the document store.
    pub document_id: DocumentId,
    /// Ordered steps.
    pub steps: Vec<ProcedureStep>,
}

impl ProcedureDocument {
    /// Creates a document from its steps.
    #[must_use]
    pub fn new(document_id: DocumentId, steps: Vec<ProcedureStep>) -> Self {
        Self {
            document_id,
            steps,
        }
    }

    /// Returns true when the document has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the union of risks across all steps, lower-cased and trimmed.
    #[must_use]
    pub fn risk_union(&self) -> BTreeSet<String> {
        self.steps
            .iter()
            .flat_map(|step| step.risks.iter())
            .map(|risk| risk.trim().to_lowercase())
            .filter(|risk| !risk.is_empty())
            .collect()
    }
}
