// crates/arbiter-core/src/core/mod.rs
// ============================================================================
// Module: Arbiter Core Types
// Description: Canonical data model for documents, responses, verdicts, and evidence.
// Purpose: Provide stable, serializable types shared by every arbiter component.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types define procedure documents, model responses, contradiction
//! findings, verdicts, HITL cases, and ledger blocks. These types are the
//! canonical source of truth for any derived API surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod evidence;
pub mod finding;
pub mod hashing;
pub mod hitl;
pub mod identifiers;
pub mod lexicon;
pub mod procedure;
pub mod response;
pub mod score;
pub mod time;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use evidence::ChainIntegrityReport;
pub use evidence::ChainStatus;
pub use evidence::EvidenceBlock;
pub use evidence::EvidenceBlockType;
pub use evidence::EvidenceFilter;
pub use finding::ContradictionFinding;
pub use finding::FindingType;
pub use finding::Severity;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::SigningKey;
pub use hitl::CasePriority;
pub use hitl::CaseStatus;
pub use hitl::CaseType;
pub use hitl::HitlCase;
pub use hitl::ReviewDecision;
pub use hitl::ReviewStep;
pub use hitl::ReviewSubmission;
pub use identifiers::CaseId;
pub use identifiers::DocumentId;
pub use identifiers::EvidenceBlockId;
pub use identifiers::ProviderId;
pub use identifiers::ReviewerRole;
pub use identifiers::ValidatorId;
pub use lexicon::LEXICON_VERSION;
pub use lexicon::Lexicons;
pub use procedure::ProcedureDocument;
pub use procedure::ProcedureStep;
pub use response::ModelResponse;
pub use score::ContradictionScore;
pub use score::ScoreWeights;
pub use time::Timestamp;
pub use verdict::ArbitrationVerdict;
pub use verdict::PairwiseSimilarity;
pub use verdict::Recommendation;
pub use verdict::SemanticAnalysis;
