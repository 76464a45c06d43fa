// crates/arbiter-core/src/runtime/mod.rs
// ============================================================================
// Module: Arbiter Runtime
// Description: Scoring, analysis, decision, HITL, and evidence components.
// Purpose: Execute arbitration runs and record them in the evidence ledger.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the arbitration pipeline leaf-first: the
//! structured scorer and semantic analyzer feed the classifier, which feeds
//! the decision engine. The HITL manager and evidence ledger hold the only
//! mutable state. [`ArbitrationEngine`] wires the components together.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod cache;
pub mod classifier;
pub mod clock;
pub mod decision;
pub mod engine;
pub mod hitl;
pub mod ledger;
pub mod scorer;
pub mod semantic;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ArbiterAuditSink;
pub use audit::FileAuditSink;
pub use audit::HitlAuditEvent;
pub use audit::LedgerAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::ScoringAuditEvent;
pub use audit::StderrAuditSink;
pub use cache::CacheConfig;
pub use cache::VerdictCache;
pub use classifier::Classification;
pub use classifier::ClassifierConfig;
pub use classifier::ComplianceReviewer;
pub use classifier::ContradictionClassifier;
pub use classifier::FindingProducer;
pub use classifier::LogicReviewer;
pub use classifier::ReviewerOpinion;
pub use classifier::SafetyReviewer;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use decision::DecisionConfig;
pub use decision::DecisionEngine;
pub use decision::DecisionInputs;
pub use decision::SeverityWeights;
pub use engine::ArbitrationEngine;
pub use engine::ArbitrationOutcome;
pub use engine::ArbitrationRequest;
pub use engine::Assessment;
pub use engine::DEFAULT_CASE_QUESTION;
pub use engine::EngineError;
pub use engine::EngineHost;
pub use engine::EngineSettings;
pub use hitl::ContradictionCaseRequest;
pub use hitl::HitlConfig;
pub use hitl::HitlError;
pub use hitl::HitlManager;
pub use ledger::EvidenceLedger;
pub use ledger::LedgerError;
pub use scorer::ScorerConfig;
pub use scorer::StepSimilarityWeights;
pub use scorer::StructuredScorer;
pub use semantic::SemanticAnalyzer;
pub use semantic::SemanticConfig;
pub use store::InMemoryEvidenceStore;
