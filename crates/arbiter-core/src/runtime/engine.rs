// crates/arbiter-core/src/runtime/engine.rs
// ============================================================================
// Module: Arbitration Engine
// Description: Facade wiring scorer, analyzer, classifier, decision, HITL, and ledger.
// Purpose: Expose the arbiter operations to embedding hosts.
// Dependencies: crate::{core, interfaces, runtime}, serde_json
// ============================================================================

//! ## Overview
//! The engine owns one instance of every component and passes explicit
//! references between them. Data flows one way: responses are analyzed,
//! classified, and decided; the verdict is written to the ledger; a review
//! case is opened when the verdict or the automated reviewers call for a
//! human. Scoring entry points never fail. Ledger and HITL entry points
//! return [`EngineError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::ArbitrationVerdict;
use crate::core::CaseId;
use crate::core::CasePriority;
use crate::core::ChainIntegrityReport;
use crate::core::ContradictionScore;
use crate::core::EvidenceBlock;
use crate::core::EvidenceBlockId;
use crate::core::EvidenceBlockType;
use crate::core::EvidenceFilter;
use crate::core::HitlCase;
use crate::core::Lexicons;
use crate::core::ModelResponse;
use crate::core::ProcedureDocument;
use crate::core::ReviewSubmission;
use crate::core::SigningKey;
use crate::core::ValidatorId;
use crate::interfaces::Clock;
use crate::interfaces::EvidenceBlockSink;
use crate::runtime::audit::ArbiterAuditSink;
use crate::runtime::audit::ScoringAuditEvent;
use crate::runtime::cache::CacheConfig;
use crate::runtime::cache::VerdictCache;
use crate::runtime::classifier::ClassifierConfig;
use crate::runtime::classifier::ContradictionClassifier;
use crate::runtime::classifier::ReviewerOpinion;
use crate::runtime::decision::DecisionConfig;
use crate::runtime::decision::DecisionEngine;
use crate::runtime::decision::DecisionInputs;
use crate::runtime::hitl::ContradictionCaseRequest;
use crate::runtime::hitl::HitlConfig;
use crate::runtime::hitl::HitlError;
use crate::runtime::hitl::HitlManager;
use crate::runtime::ledger::EvidenceLedger;
use crate::runtime::ledger::LedgerError;
use crate::runtime::scorer::ScorerConfig;
use crate::runtime::scorer::StructuredScorer;
use crate::runtime::semantic::SemanticAnalyzer;
use crate::runtime::semantic::SemanticConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine facade errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ledger failure, including integrity violations.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// HITL failure, including unknown cases and invalid transitions.
    #[error(transparent)]
    Hitl(#[from] HitlError),
    /// Evidence payload could not be serialized.
    #[error("evidence payload serialization failed: {0}")]
    Payload(String),
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Question recorded on cases opened through [`ArbitrationEngine::open_case_if_needed`].
pub const DEFAULT_CASE_QUESTION: &str = "Automated arbitration did not reach consensus";

/// Component configuration for an engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Structured scorer configuration.
    pub scorer: ScorerConfig,
    /// Semantic analyzer configuration.
    pub semantic: SemanticConfig,
    /// Classifier thresholds.
    pub classifier: ClassifierConfig,
    /// Decision weights and thresholds.
    pub decision: DecisionConfig,
    /// HITL authority configuration.
    pub hitl: HitlConfig,
    /// Verdict cache bounds.
    pub cache: CacheConfig,
    /// Validator identity written on engine-produced blocks.
    pub validator: ValidatorId,
    /// Heuristic vocabulary.
    pub lexicons: Lexicons,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scorer: ScorerConfig::default(),
            semantic: SemanticConfig::default(),
            classifier: ClassifierConfig::default(),
            decision: DecisionConfig::default(),
            hitl: HitlConfig::default(),
            cache: CacheConfig::default(),
            validator: ValidatorId::new("arbiter"),
            lexicons: Lexicons::V1,
        }
    }
}

/// Host-provided collaborators.
pub struct EngineHost {
    /// Ledger signing key.
    pub signing_key: SigningKey,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Durable block persistence.
    pub sink: Arc<dyn EvidenceBlockSink>,
    /// Operational log.
    pub audit: Arc<dyn ArbiterAuditSink>,
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Verdict plus the reviewer opinions behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Consensus verdict.
    pub verdict: ArbitrationVerdict,
    /// Safety reviewer opinion.
    pub safety: ReviewerOpinion,
    /// Logic reviewer opinion.
    pub logic: ReviewerOpinion,
}

impl Assessment {
    /// True when the safety and logic reviewers disagree.
    #[must_use]
    pub const fn reviewers_disagree(&self) -> bool {
        self.safety.approves != self.logic.approves
    }
}

/// Inputs for a full arbitration run.
#[derive(Debug, Clone, Copy)]
pub struct ArbitrationRequest<'a> {
    /// Question the responses answer.
    pub question: &'a str,
    /// Model responses to compare.
    pub responses: &'a [ModelResponse],
    /// Structured documents derived from the responses; two or more feed the
    /// structured score.
    pub documents: &'a [ProcedureDocument],
}

/// Result of a full arbitration run.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrationOutcome {
    /// Consensus verdict.
    pub verdict: ArbitrationVerdict,
    /// Ledger block recording the verdict.
    pub evidence_block: EvidenceBlockId,
    /// Review case opened for a review/reject verdict.
    pub review_case: Option<HitlCase>,
    /// Case opened because the automated reviewers disagreed.
    pub contradiction_case: Option<HitlCase>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Arbitration facade.
pub struct ArbitrationEngine {
    /// Structured document scorer.
    scorer: StructuredScorer,
    /// Semantic agreement analyzer.
    analyzer: SemanticAnalyzer,
    /// Finding producers.
    classifier: ContradictionClassifier,
    /// Verdict calculator.
    decision: DecisionEngine,
    /// Evidence ledger shared with the HITL manager.
    ledger: Arc<EvidenceLedger>,
    /// Case manager.
    hitl: HitlManager,
    /// Optional memoization in front of the decision path.
    cache: Option<VerdictCache<Assessment>>,
    /// Time source for audit events.
    clock: Arc<dyn Clock>,
    /// Operational log.
    audit: Arc<dyn ArbiterAuditSink>,
    /// Validator identity for engine-produced blocks.
    validator: ValidatorId,
    /// Lexicon version stamped on verdicts.
    lexicon_version: &'static str,
}

impl ArbitrationEngine {
    /// Builds an engine with a fresh ledger.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ledger`] when the genesis block cannot be created.
    pub fn new(settings: EngineSettings, host: EngineHost) -> Result<Self, EngineError> {
        let ledger = EvidenceLedger::new(
            host.signing_key,
            Arc::clone(&host.clock),
            host.sink,
            Arc::clone(&host.audit),
        )?;
        Ok(Self::with_ledger(settings, Arc::new(ledger), host.clock, host.audit))
    }

    /// Builds an engine around an existing (for example restored) ledger.
    #[must_use]
    pub fn with_ledger(
        settings: EngineSettings,
        ledger: Arc<EvidenceLedger>,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn ArbiterAuditSink>,
    ) -> Self {
        let hitl = HitlManager::new(
            settings.hitl,
            Arc::clone(&clock),
            Arc::clone(&ledger),
            settings.validator.clone(),
            Arc::clone(&audit),
        );
        let cache =
            settings.cache.enabled.then(|| VerdictCache::new(settings.cache, Arc::clone(&clock)));
        Self {
            scorer: StructuredScorer::new(settings.scorer, settings.lexicons),
            analyzer: SemanticAnalyzer::new(settings.semantic),
            classifier: ContradictionClassifier::new(settings.classifier, settings.lexicons),
            decision: DecisionEngine::new(settings.decision),
            ledger,
            hitl,
            cache,
            clock,
            audit,
            validator: settings.validator,
            lexicon_version: settings.lexicons.version,
        }
    }

    /// Returns the evidence ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Arc<EvidenceLedger> {
        &self.ledger
    }

    /// Returns the HITL manager.
    #[must_use]
    pub const fn hitl(&self) -> &HitlManager {
        &self.hitl
    }

    // ------------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------------

    /// Scores two structured documents.
    #[must_use]
    pub fn score_documents(
        &self,
        left: &ProcedureDocument,
        right: &ProcedureDocument,
    ) -> ContradictionScore {
        self.scorer.score(left, right)
    }

    /// Mean pairwise total over a document batch.
    #[must_use]
    pub fn score_batch(&self, documents: &[ProcedureDocument]) -> f64 {
        self.scorer.score_all(documents)
    }

    /// Runs semantic analysis, classification, and decision for a response set.
    #[must_use]
    pub fn analyze_responses(&self, responses: &[ModelResponse]) -> ArbitrationVerdict {
        self.assess(responses, None).verdict
    }

    /// Like [`ArbitrationEngine::analyze_responses`], keeping reviewer opinions
    /// and blending an optional structured document score.
    #[must_use]
    pub fn assess(&self, responses: &[ModelResponse], structured_score: Option<f64>) -> Assessment {
        let key = self
            .cache
            .as_ref()
            .and_then(|_| VerdictCache::<Assessment>::key_for(&(responses, structured_score)).ok());
        if let (Some(cache), Some(key)) = (&self.cache, &key)
            && let Some(hit) = cache.get(key)
        {
            self.emit_verdict(&hit.verdict, true);
            return hit;
        }

        let semantic = self.analyzer.analyze(responses);
        let classification = self.classifier.assess(responses, &semantic);
        let mut inputs = DecisionInputs::new(
            classification.findings,
            semantic.agreement_percentage,
            semantic.mean_similarity,
        )
        .with_degraded_sources(semantic.degraded_sources)
        .with_lexicon_version(self.lexicon_version);
        if let Some(score) = structured_score {
            inputs = inputs.with_structured_score(score);
        }
        let assessment = Assessment {
            verdict: self.decision.decide(inputs),
            safety: classification.safety,
            logic: classification.logic,
        };

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, assessment.clone());
        }
        self.emit_verdict(&assessment.verdict, false);
        assessment
    }

    // ------------------------------------------------------------------------
    // Arbitration With Evidence
    // ------------------------------------------------------------------------

    /// Assesses the responses, records the verdict, and opens any needed cases.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the verdict or a case opening cannot be
    /// recorded.
    pub fn arbitrate_responses(
        &self,
        request: ArbitrationRequest<'_>,
    ) -> Result<ArbitrationOutcome, EngineError> {
        let structured_score =
            (request.documents.len() >= 2).then(|| self.scorer.score_all(request.documents));
        let assessment = self.assess(request.responses, structured_score);

        let payload = json!({
            "question": request.question,
            "structured_score": structured_score,
            "verdict": to_payload(&assessment.verdict)?,
        });
        let block =
            self.ledger.record(payload, EvidenceBlockType::ArbitrationVerdict, &self.validator)?;

        let review_case = self.hitl.open_case_if_needed(&assessment.verdict, request.question)?;
        let contradiction_case = if assessment.reviewers_disagree() {
            Some(self.hitl.open_contradiction_case(ContradictionCaseRequest {
                question: request.question.to_string(),
                conflicting_options: vec![
                    assessment.safety.summary(),
                    assessment.logic.summary(),
                ],
                recommended_action: "Resolve the safety and logic reviewer disagreement"
                    .to_string(),
                priority: CasePriority::High,
            })?)
        } else {
            None
        };

        Ok(ArbitrationOutcome {
            verdict: assessment.verdict,
            evidence_block: block.block_id,
            review_case,
            contradiction_case,
        })
    }

    /// Scores two documents and records the score in the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the score cannot be recorded.
    pub fn record_document_score(
        &self,
        left: &ProcedureDocument,
        right: &ProcedureDocument,
    ) -> Result<(ContradictionScore, EvidenceBlockId), EngineError> {
        let score = self.scorer.score(left, right);
        let payload = json!({
            "left_document": left.document_id,
            "right_document": right.document_id,
            "score": to_payload(&score)?,
        });
        let block =
            self.ledger.record(payload, EvidenceBlockType::ContradictionScore, &self.validator)?;
        self.audit.record_scoring(&ScoringAuditEvent {
            event: "document_score",
            timestamp_ms: self.clock.now().as_unix_millis(),
            score: score.total,
            recommendation: None,
            findings: 0,
            degraded_sources: Vec::new(),
            cached: false,
        });
        Ok((score, block.block_id))
    }

    // ------------------------------------------------------------------------
    // HITL
    // ------------------------------------------------------------------------

    /// Opens a review case when the verdict needs a human.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Hitl`] when the opening cannot be recorded.
    pub fn open_case_if_needed(
        &self,
        verdict: &ArbitrationVerdict,
    ) -> Result<Option<HitlCase>, EngineError> {
        Ok(self.hitl.open_case_if_needed(verdict, DEFAULT_CASE_QUESTION)?)
    }

    /// Applies a human review.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Hitl`] for unknown cases or invalid transitions.
    pub fn submit_review(
        &self,
        case_id: &CaseId,
        submission: ReviewSubmission,
    ) -> Result<HitlCase, EngineError> {
        Ok(self.hitl.submit_review(case_id, submission)?)
    }

    /// Freezes the final human decision.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Hitl`] for unknown cases or invalid transitions.
    pub fn finalize_decision(
        &self,
        case_id: &CaseId,
        final_decision: &str,
        decision_maker: &str,
    ) -> Result<HitlCase, EngineError> {
        Ok(self.hitl.finalize(case_id, final_decision, decision_maker)?)
    }

    /// Returns a case snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Hitl`] for unknown cases.
    pub fn case(&self, case_id: &CaseId) -> Result<HitlCase, EngineError> {
        Ok(self.hitl.case(case_id)?)
    }

    // ------------------------------------------------------------------------
    // Evidence
    // ------------------------------------------------------------------------

    /// Appends a pending block.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ledger`] when the block cannot be prepared.
    pub fn append_evidence(
        &self,
        payload: Value,
        block_type: EvidenceBlockType,
        validator: &ValidatorId,
    ) -> Result<EvidenceBlockId, EngineError> {
        Ok(self.ledger.append(payload, block_type, validator)?)
    }

    /// Commits a pending block, re-linking it if other evidence landed first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ledger`] on integrity violations or persistence
    /// failures; nothing is committed in those cases.
    pub fn commit_evidence(
        &self,
        block_id: &EvidenceBlockId,
    ) -> Result<EvidenceBlock, EngineError> {
        Ok(self.ledger.commit(block_id)?)
    }

    /// Verifies the whole committed chain.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ledger`] when the chain lock is poisoned.
    pub fn verify_chain_integrity(&self) -> Result<ChainIntegrityReport, EngineError> {
        Ok(self.ledger.verify_chain_integrity()?)
    }

    /// Filters committed blocks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ledger`] when the chain lock is poisoned.
    pub fn query_evidence(
        &self,
        filter: &EvidenceFilter,
    ) -> Result<Vec<EvidenceBlock>, EngineError> {
        Ok(self.ledger.query(filter)?)
    }

    /// Emits a verdict audit event.
    fn emit_verdict(&self, verdict: &ArbitrationVerdict, cached: bool) {
        self.audit.record_scoring(&ScoringAuditEvent {
            event: "verdict",
            timestamp_ms: self.clock.now().as_unix_millis(),
            score: verdict.contradiction_score,
            recommendation: Some(verdict.recommendation),
            findings: verdict.findings.len(),
            degraded_sources: verdict.degraded_sources.clone(),
            cached,
        });
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a value for a ledger payload.
fn to_payload<T: Serialize>(value: &T) -> Result<Value, EngineError> {
    serde_json::to_value(value).map_err(|err| EngineError::Payload(err.to_string()))
}
