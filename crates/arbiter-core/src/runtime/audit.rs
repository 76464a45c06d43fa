// crates/arbiter-core/src/runtime/audit.rs
// ============================================================================
// Module: Arbiter Audit Logging
// Description: Structured audit events for scoring, ledger, and HITL activity.
// Purpose: Emit JSON-line operational logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are the arbiter's operational log. They are separate from the
//! evidence ledger: sinks may drop events, the ledger never does. Events carry
//! identifiers, scores, and statuses only, never raw response text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::CaseId;
use crate::core::CaseStatus;
use crate::core::CaseType;
use crate::core::EvidenceBlockId;
use crate::core::EvidenceBlockType;
use crate::core::ProviderId;
use crate::core::Recommendation;
use crate::core::ReviewDecision;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scoring audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringAuditEvent {
    /// Event identifier (`document_score`, `verdict`).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Contradiction score produced.
    pub score: f64,
    /// Recommendation when the event is a verdict.
    pub recommendation: Option<Recommendation>,
    /// Number of findings.
    pub findings: usize,
    /// Providers that contributed degraded input.
    pub degraded_sources: Vec<ProviderId>,
    /// Whether the verdict was served from the memoization cache.
    pub cached: bool,
}

/// Ledger audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerAuditEvent {
    /// Event identifier (`ledger_commit`, `ledger_rejected`, `ledger_verify`).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Block identifier when applicable.
    pub block_id: Option<EvidenceBlockId>,
    /// Block type when applicable.
    pub block_type: Option<EvidenceBlockType>,
    /// Outcome label (`ok`, `integrity_violation`, `persist_failed`, `compromised`, ...).
    pub outcome: &'static str,
    /// Optional error detail.
    pub detail: Option<String>,
}

/// HITL audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HitlAuditEvent {
    /// Event identifier (`case_opened`, `review_submitted`, `case_finalized`).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Case identifier.
    pub case_id: CaseId,
    /// Case subtype.
    pub case_type: CaseType,
    /// Status after the transition.
    pub status: CaseStatus,
    /// Reviewer identity when applicable.
    pub reviewer: Option<String>,
    /// Review decision when applicable.
    pub decision: Option<ReviewDecision>,
}

impl LedgerAuditEvent {
    /// Builds a ledger event.
    #[must_use]
    pub fn new(
        event: &'static str,
        at: Timestamp,
        block_id: Option<EvidenceBlockId>,
        block_type: Option<EvidenceBlockType>,
        outcome: &'static str,
    ) -> Self {
        Self {
            event,
            timestamp_ms: at.as_unix_millis(),
            block_id,
            block_type,
            outcome,
            detail: None,
        }
    }

    /// Attaches an error detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for arbiter events.
pub trait ArbiterAuditSink: Send + Sync {
    /// Record a scoring event.
    fn record_scoring(&self, event: &ScoringAuditEvent);

    /// Record a ledger event.
    fn record_ledger(&self, _event: &LedgerAuditEvent) {}

    /// Record a HITL event.
    fn record_hitl(&self, _event: &HitlAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ArbiterAuditSink for StderrAuditSink {
    fn record_scoring(&self, event: &ScoringAuditEvent) {
        write_stderr(event);
    }

    fn record_ledger(&self, event: &LedgerAuditEvent) {
        write_stderr(event);
    }

    fn record_hitl(&self, event: &HitlAuditEvent) {
        write_stderr(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event.
    fn write_line<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl ArbiterAuditSink for FileAuditSink {
    fn record_scoring(&self, event: &ScoringAuditEvent) {
        self.write_line(event);
    }

    fn record_ledger(&self, event: &LedgerAuditEvent) {
        self.write_line(event);
    }

    fn record_hitl(&self, event: &HitlAuditEvent) {
        self.write_line(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ArbiterAuditSink for NoopAuditSink {
    fn record_scoring(&self, _event: &ScoringAuditEvent) {}

    fn record_ledger(&self, _event: &LedgerAuditEvent) {}

    fn record_hitl(&self, _event: &HitlAuditEvent) {}
}

/// Writes one serialized event to stderr.
fn write_stderr<T: Serialize>(event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(std::io::stderr(), "{payload}");
    }
}
