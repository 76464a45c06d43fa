// crates/arbiter-core/src/core/hitl.rs
// ============================================================================
// Module: Arbiter HITL Cases
// Description: Human-in-the-loop review cases and their review history.
// Purpose: Define the serializable case state mutated only by submitted reviews.
// Dependencies: crate::core::{finding, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A [`HitlCase`] opens in [`CaseStatus::Pending`] and moves through
//! `in_review` and `escalated` until a terminal `approved` or `rejected`
//! status. Terminal cases never change again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::finding::Severity;
use crate::core::identifiers::CaseId;
use crate::core::identifiers::ReviewerRole;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Case subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    /// Opened because a verdict recommended review or rejection.
    ArbitrationReview,
    /// Opened because the safety and logic reviewers disagreed.
    ContradictionResolution,
}

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Opened, no review yet.
    Pending,
    /// At least one review submitted, no ruling yet.
    InReview,
    /// Escalated to a higher reviewer.
    Escalated,
    /// Terminal: approved.
    Approved,
    /// Terminal: rejected.
    Rejected,
}

impl CaseStatus {
    /// Returns true for `approved` and `rejected`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Escalated => "escalated",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Case priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
    /// Critical priority.
    Critical,
}

impl From<Severity> for CasePriority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => Self::Low,
            Severity::Medium => Self::Medium,
            Severity::High => Self::High,
            Severity::Critical => Self::Critical,
        }
    }
}

/// Reviewer decision on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Approve the content.
    Approve,
    /// Reject the content.
    Reject,
    /// Escalate to a higher authority.
    Escalate,
    /// Ask for more data before ruling.
    RequestData,
}

impl ReviewDecision {
    /// Returns a stable label for the decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Escalate => "escalate",
            Self::RequestData => "request_data",
        }
    }
}

// ============================================================================
// SECTION: Review History
// ============================================================================

/// Review submitted by a human reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    /// Reviewer identity.
    pub reviewer: String,
    /// Role the reviewer acts under.
    pub role: ReviewerRole,
    /// Decision.
    pub decision: ReviewDecision,
    /// Reviewer confidence in [0, 1].
    pub confidence: f64,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// Recorded review step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStep {
    /// Reviewer identity.
    pub reviewer: String,
    /// Role the reviewer acted under.
    pub role: ReviewerRole,
    /// Decision.
    pub decision: ReviewDecision,
    /// Reviewer confidence in [0, 1].
    pub confidence: f64,
    /// Free-text notes.
    pub notes: String,
    /// Time the review was applied.
    pub timestamp: Timestamp,
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// Human-in-the-loop review case.
///
/// # Invariants
/// - `final_decision` and `decision_maker` are only set once the case is terminal.
/// - A terminal case is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitlCase {
    /// Case identifier.
    pub case_id: CaseId,
    /// Case subtype.
    pub case_type: CaseType,
    /// Lifecycle status.
    pub status: CaseStatus,
    /// Priority.
    pub priority: CasePriority,
    /// Originating question.
    pub question: String,
    /// Summaries of the conflicting options.
    pub conflicting_options: Vec<String>,
    /// Recommended action text.
    pub recommended_action: String,
    /// Ordered review history.
    pub reviews: Vec<ReviewStep>,
    /// Frozen final decision.
    pub final_decision: Option<String>,
    /// Identity of the final decision maker.
    pub decision_maker: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
    /// Human ruling is authoritative over automated findings.
    pub overrides_ai: bool,
}
