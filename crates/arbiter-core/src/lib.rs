// crates/arbiter-core/src/lib.rs
// ============================================================================
// Module: Procedure Arbiter Core Library
// Description: Public API surface for the contradiction arbitration engine.
// Purpose: Expose core types, interfaces, and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Procedure Arbiter decides whether independently generated procedures and
//! model responses agree well enough to ship automatically. It scores
//! structured documents, measures semantic agreement, classifies
//! contradictions, and produces a verdict. Verdicts that need a human open a
//! review case, and every verdict and ruling is written to a hash-chained,
//! signed evidence ledger.
//!
//! The crate is a library boundary: document stores, provider gateways, and
//! embedding services stay with the host and plug in through
//! [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::Clock;
pub use interfaces::EvidenceBlockSink;
pub use interfaces::SinkError;
pub use runtime::ArbitrationEngine;
pub use runtime::ArbitrationOutcome;
pub use runtime::ArbitrationRequest;
pub use runtime::EngineError;
pub use runtime::EngineHost;
pub use runtime::EngineSettings;
pub use runtime::EvidenceLedger;
pub use runtime::HitlError;
pub use runtime::HitlManager;
pub use runtime::InMemoryEvidenceStore;
pub use runtime::LedgerError;
pub use runtime::ManualClock;
pub use runtime::SystemClock;
