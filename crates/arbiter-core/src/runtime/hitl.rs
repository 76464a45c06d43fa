// crates/arbiter-core/src/runtime/hitl.rs
// ============================================================================
// Module: HITL Escalation Manager
// Description: Review-case state machine with ledger-backed transitions.
// Purpose: Route non-consensus verdicts to humans and record their rulings.
// Dependencies: crate::{core, interfaces, runtime::{audit, ledger}}, serde_json
// ============================================================================

//! ## Overview
//! Cases move `pending -> in_review -> {escalated | approved | rejected}` and
//! `escalated` may return to `in_review` or terminate. Each case sits behind
//! its own mutex so reviews on one case are serialized while different cases
//! proceed in parallel.
//!
//! Every transition is written to the evidence ledger before the mutated case
//! is stored. If the ledger write fails, the stored case is left untouched.
//! Terminal cases reject every further transition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::core::ArbitrationVerdict;
use crate::core::CaseId;
use crate::core::CasePriority;
use crate::core::CaseStatus;
use crate::core::CaseType;
use crate::core::EvidenceBlockType;
use crate::core::HitlCase;
use crate::core::Recommendation;
use crate::core::ReviewDecision;
use crate::core::ReviewStep;
use crate::core::ReviewSubmission;
use crate::core::ValidatorId;
use crate::interfaces::Clock;
use crate::runtime::audit::ArbiterAuditSink;
use crate::runtime::audit::HitlAuditEvent;
use crate::runtime::ledger::EvidenceLedger;
use crate::runtime::ledger::LedgerError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// HITL manager errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HitlError {
    /// No case with this identifier exists.
    #[error("case {0} not found")]
    NotFound(CaseId),
    /// The transition is not allowed from the current status.
    #[error("case {case_id} is {}: {reason}", status.as_str())]
    InvalidState {
        /// Case identifier.
        case_id: CaseId,
        /// Status at the time of the attempt.
        status: CaseStatus,
        /// Why the transition was refused.
        reason: String,
    },
    /// Review confidence outside [0, 1].
    #[error("review confidence must be within [0, 1], got {0}")]
    InvalidConfidence(f64),
    /// The ledger refused the transition record.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Case snapshot could not be serialized.
    #[error("case payload serialization failed: {0}")]
    Payload(String),
    /// A case lock was poisoned.
    #[error("case store lock poisoned: {0}")]
    Lock(&'static str),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// HITL manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitlConfig {
    /// Reviewer roles whose approval closes a case (compared case-insensitively).
    pub final_authority_roles: Vec<String>,
}

impl Default for HitlConfig {
    fn default() -> Self {
        Self {
            final_authority_roles: vec!["administrator".to_string()],
        }
    }
}

/// Inputs for a contradiction-resolution case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContradictionCaseRequest {
    /// Originating question.
    pub question: String,
    /// Summaries of the conflicting positions.
    pub conflicting_options: Vec<String>,
    /// Suggested next action.
    pub recommended_action: String,
    /// Case priority.
    pub priority: CasePriority,
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Human-in-the-loop case manager.
pub struct HitlManager {
    /// Authority configuration.
    config: HitlConfig,
    /// Time source for case timestamps.
    clock: Arc<dyn Clock>,
    /// Ledger receiving every transition.
    ledger: Arc<EvidenceLedger>,
    /// Validator identity written on ledger blocks.
    validator: ValidatorId,
    /// Operational log.
    audit: Arc<dyn ArbiterAuditSink>,
    /// Case map; each case is independently locked.
    cases: RwLock<BTreeMap<CaseId, Arc<Mutex<HitlCase>>>>,
    /// Next case sequence number.
    next_sequence: AtomicU64,
}

impl HitlManager {
    /// Creates a manager writing to `ledger` as `validator`.
    #[must_use]
    pub fn new(
        config: HitlConfig,
        clock: Arc<dyn Clock>,
        ledger: Arc<EvidenceLedger>,
        validator: ValidatorId,
        audit: Arc<dyn ArbiterAuditSink>,
    ) -> Self {
        Self {
            config,
            clock,
            ledger,
            validator,
            audit,
            cases: RwLock::new(BTreeMap::new()),
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Opens an arbitration-review case when the verdict needs a human.
    ///
    /// # Errors
    ///
    /// Returns [`HitlError`] when the opening cannot be recorded.
    pub fn open_case_if_needed(
        &self,
        verdict: &ArbitrationVerdict,
        question: &str,
    ) -> Result<Option<HitlCase>, HitlError> {
        if !verdict.recommendation.needs_human() {
            return Ok(None);
        }
        let base = match verdict.recommendation {
            Recommendation::Reject => CasePriority::High,
            Recommendation::Approve | Recommendation::Review => CasePriority::Medium,
        };
        let priority = verdict
            .findings
            .iter()
            .map(|finding| CasePriority::from(finding.severity))
            .fold(base, CasePriority::max);
        let conflicting_options = verdict
            .findings
            .iter()
            .map(|finding| {
                format!(
                    "{} ({}): {}",
                    finding.rule,
                    finding.severity.as_str(),
                    finding.description
                )
            })
            .collect();
        let recommended_action = match verdict.recommendation {
            Recommendation::Reject => "Reject the generated content and request regeneration",
            Recommendation::Approve | Recommendation::Review => {
                "Review the conflicting findings before release"
            }
        };
        let case = self.new_case(
            CaseType::ArbitrationReview,
            priority,
            question.to_string(),
            conflicting_options,
            recommended_action.to_string(),
            false,
        );
        self.open(case).map(Some)
    }

    /// Opens a contradiction-resolution case. Human rulings on it override
    /// automated findings; the case always starts pending.
    ///
    /// # Errors
    ///
    /// Returns [`HitlError`] when the opening cannot be recorded.
    pub fn open_contradiction_case(
        &self,
        request: ContradictionCaseRequest,
    ) -> Result<HitlCase, HitlError> {
        let case = self.new_case(
            CaseType::ContradictionResolution,
            request.priority,
            request.question,
            request.conflicting_options,
            request.recommended_action,
            true,
        );
        self.open(case)
    }

    /// Applies a review to a case.
    ///
    /// # Errors
    ///
    /// Returns [`HitlError::NotFound`] for unknown cases,
    /// [`HitlError::InvalidState`] for terminal cases,
    /// [`HitlError::InvalidConfidence`] for confidences outside [0, 1], and
    /// ledger errors when the review cannot be recorded. No mutation occurs
    /// on error.
    pub fn submit_review(
        &self,
        case_id: &CaseId,
        submission: ReviewSubmission,
    ) -> Result<HitlCase, HitlError> {
        let entry = self.entry(case_id)?;
        let mut guard = entry.lock().map_err(|_| HitlError::Lock("case"))?;
        if guard.status.is_terminal() {
            return Err(HitlError::InvalidState {
                case_id: case_id.clone(),
                status: guard.status,
                reason: "terminal cases accept no further reviews".to_string(),
            });
        }
        if !(0.0 ..= 1.0).contains(&submission.confidence) {
            return Err(HitlError::InvalidConfidence(submission.confidence));
        }

        let now = self.clock.now();
        let mut updated = guard.clone();
        updated.status = match submission.decision {
            ReviewDecision::Escalate => CaseStatus::Escalated,
            ReviewDecision::Approve if self.has_final_authority(submission.role.as_str()) => {
                CaseStatus::Approved
            }
            ReviewDecision::Reject => CaseStatus::Rejected,
            ReviewDecision::Approve | ReviewDecision::RequestData => CaseStatus::InReview,
        };
        if updated.status.is_terminal() {
            updated.final_decision = Some(submission.decision.as_str().to_string());
            updated.decision_maker = Some(submission.reviewer.clone());
        }
        let step = ReviewStep {
            reviewer: submission.reviewer,
            role: submission.role,
            decision: submission.decision,
            confidence: submission.confidence,
            notes: submission.notes,
            timestamp: now,
        };
        updated.reviews.push(step.clone());
        updated.updated_at = now;

        let payload = json!({
            "case": to_payload(&updated)?,
            "review": to_payload(&step)?,
        });
        self.ledger.record(payload, EvidenceBlockType::HumanReview, &self.validator)?;
        *guard = updated.clone();
        drop(guard);

        self.emit("review_submitted", &updated, Some(step.reviewer), Some(step.decision));
        Ok(updated)
    }

    /// Freezes the final human decision and approves the case.
    ///
    /// # Errors
    ///
    /// Returns [`HitlError::NotFound`] for unknown cases and
    /// [`HitlError::InvalidState`] when the case has no reviews or is already
    /// terminal.
    pub fn finalize(
        &self,
        case_id: &CaseId,
        final_decision: &str,
        decision_maker: &str,
    ) -> Result<HitlCase, HitlError> {
        let entry = self.entry(case_id)?;
        let mut guard = entry.lock().map_err(|_| HitlError::Lock("case"))?;
        if guard.status.is_terminal() {
            return Err(HitlError::InvalidState {
                case_id: case_id.clone(),
                status: guard.status,
                reason: "case is already closed".to_string(),
            });
        }
        if guard.reviews.is_empty() {
            return Err(HitlError::InvalidState {
                case_id: case_id.clone(),
                status: guard.status,
                reason: "finalization requires at least one review".to_string(),
            });
        }

        let mut updated = guard.clone();
        updated.status = CaseStatus::Approved;
        updated.final_decision = Some(final_decision.to_string());
        updated.decision_maker = Some(decision_maker.to_string());
        updated.updated_at = self.clock.now();

        let payload = json!({
            "case": to_payload(&updated)?,
        });
        self.ledger.record(payload, EvidenceBlockType::HumanApproval, &self.validator)?;
        *guard = updated.clone();
        drop(guard);

        self.emit("case_finalized", &updated, Some(decision_maker.to_string()), None);
        Ok(updated)
    }

    /// Returns a snapshot of one case.
    ///
    /// # Errors
    ///
    /// Returns [`HitlError::NotFound`] for unknown cases.
    pub fn case(&self, case_id: &CaseId) -> Result<HitlCase, HitlError> {
        let entry = self.entry(case_id)?;
        let guard = entry.lock().map_err(|_| HitlError::Lock("case"))?;
        Ok(guard.clone())
    }

    /// Returns snapshots of every case, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`HitlError::Lock`] when a lock is poisoned.
    pub fn cases(&self, status: Option<CaseStatus>) -> Result<Vec<HitlCase>, HitlError> {
        let entries: Vec<Arc<Mutex<HitlCase>>> =
            self.cases.read().map_err(|_| HitlError::Lock("cases"))?.values().cloned().collect();
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            let case = entry.lock().map_err(|_| HitlError::Lock("case"))?.clone();
            if status.is_none_or(|wanted| case.status == wanted) {
                out.push(case);
            }
        }
        Ok(out)
    }

    /// Builds a pending case with a fresh identifier.
    fn new_case(
        &self,
        case_type: CaseType,
        priority: CasePriority,
        question: String,
        conflicting_options: Vec<String>,
        recommended_action: String,
        overrides_ai: bool,
    ) -> HitlCase {
        let now = self.clock.now();
        HitlCase {
            case_id: CaseId::from_sequence(self.next_sequence.fetch_add(1, Ordering::SeqCst)),
            case_type,
            status: CaseStatus::Pending,
            priority,
            question,
            conflicting_options,
            recommended_action,
            reviews: Vec::new(),
            final_decision: None,
            decision_maker: None,
            created_at: now,
            updated_at: now,
            overrides_ai,
        }
    }

    /// Records and stores a freshly built case.
    fn open(&self, case: HitlCase) -> Result<HitlCase, HitlError> {
        let payload = json!({
            "case": to_payload(&case)?,
        });
        self.ledger.record(payload, EvidenceBlockType::HitlCaseOpened, &self.validator)?;
        self.cases
            .write()
            .map_err(|_| HitlError::Lock("cases"))?
            .insert(case.case_id.clone(), Arc::new(Mutex::new(case.clone())));
        self.emit("case_opened", &case, None, None);
        Ok(case)
    }

    /// Looks up the lock for one case.
    fn entry(&self, case_id: &CaseId) -> Result<Arc<Mutex<HitlCase>>, HitlError> {
        self.cases
            .read()
            .map_err(|_| HitlError::Lock("cases"))?
            .get(case_id)
            .cloned()
            .ok_or_else(|| HitlError::NotFound(case_id.clone()))
    }

    /// True when the role may close a case by approving it.
    fn has_final_authority(&self, role: &str) -> bool {
        let role = role.trim();
        self.config
            .final_authority_roles
            .iter()
            .any(|authority| authority.eq_ignore_ascii_case(role))
    }

    /// Emits a HITL audit event.
    fn emit(
        &self,
        event: &'static str,
        case: &HitlCase,
        reviewer: Option<String>,
        decision: Option<ReviewDecision>,
    ) {
        self.audit.record_hitl(&HitlAuditEvent {
            event,
            timestamp_ms: self.clock.now().as_unix_millis(),
            case_id: case.case_id.clone(),
            case_type: case.case_type,
            status: case.status,
            reviewer,
            decision,
        });
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a case artifact for a ledger payload.
fn to_payload<T: Serialize>(value: &T) -> Result<serde_json::Value, HitlError> {
    serde_json::to_value(value).map_err(|err| HitlError::Payload(err.to_string()))
}
