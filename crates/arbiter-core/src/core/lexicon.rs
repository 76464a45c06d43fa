// crates/arbiter-core/src/core/lexicon.rs
// ============================================================================
// Module: Arbiter Lexicons
// Description: Versioned static word tables used by contradiction heuristics.
// Purpose: Keep rule vocabulary auditable and testable apart from scoring logic.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every heuristic in the scorer and classifier draws its vocabulary from a
//! [`Lexicons`] value. The tables below are the `v1` set; any change to them
//! must bump [`LEXICON_VERSION`] because verdicts recorded in the ledger name
//! the version they were produced with.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Versioning
// ============================================================================

/// Version tag of the built-in lexicon tables.
pub const LEXICON_VERSION: &str = "v1";

// ============================================================================
// SECTION: Tables
// ============================================================================

/// Negation words; a step pair contradicts when exactly one text carries one.
pub const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "do-not", "cannot", "can't", "shouldn't", "mustn't",
    "without", "avoid", "none", "neither", "nor",
];

/// Opposing action verbs.
pub const ANTONYM_ACTIONS: &[(&str, &str)] = &[
    ("connect", "disconnect"),
    ("open", "close"),
    ("start", "stop"),
    ("enable", "disable"),
    ("install", "remove"),
    ("increase", "decrease"),
    ("tighten", "loosen"),
];

/// Phrases that explicitly deny a need for protective equipment.
pub const PPE_DENIAL_PHRASES: &[&str] = &[
    "no ppe",
    "ppe not required",
    "ppe is not required",
    "without ppe",
    "no protective equipment",
    "protective equipment not required",
    "protective equipment is not required",
    "no gloves needed",
    "no need for ppe",
];

/// Phrases that explicitly deny a need for lockout/tagout.
pub const LOCKOUT_DENIAL_PHRASES: &[&str] = &[
    "no lockout",
    "lockout not required",
    "lockout is not required",
    "without lockout",
    "no loto",
    "loto not required",
    "no tagout",
    "no need to lock out",
    "no need for lockout",
];

/// Safety keywords counted per response.
pub const SAFETY_KEYWORDS: &[&str] =
    &["danger", "hazard", "warning", "caution", "risk", "unsafe", "prohibited"];

/// Positive polarity indicators.
pub const POSITIVE_INDICATORS: &[&str] = &[
    "safe",
    "correct",
    "recommended",
    "approved",
    "acceptable",
    "proceed",
    "valid",
    "effective",
    "compliant",
];

/// Negative polarity indicators.
pub const NEGATIVE_INDICATORS: &[&str] = &[
    "unsafe",
    "incorrect",
    "avoid",
    "never",
    "invalid",
    "dangerous",
    "ineffective",
    "noncompliant",
    "prohibited",
];

/// Recognized compliance-standard tokens (matched case-sensitively).
pub const COMPLIANCE_STANDARDS: &[&str] = &["OSHA", "EPA", "DOT", "FDA", "NFPA", "ANSI", "IEEE"];

// ============================================================================
// SECTION: Lexicon Set
// ============================================================================

/// Bundle of the word tables consumed by the heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lexicons {
    /// Version tag recorded with every verdict.
    pub version: &'static str,
    /// Negation words.
    pub negation_words: &'static [&'static str],
    /// Opposing action verb pairs.
    pub antonym_actions: &'static [(&'static str, &'static str)],
    /// PPE denial phrases.
    pub ppe_denials: &'static [&'static str],
    /// Lockout denial phrases.
    pub lockout_denials: &'static [&'static str],
    /// Safety keywords.
    pub safety_keywords: &'static [&'static str],
    /// Positive polarity indicators.
    pub positive_indicators: &'static [&'static str],
    /// Negative polarity indicators.
    pub negative_indicators: &'static [&'static str],
    /// Compliance-standard tokens.
    pub compliance_standards: &'static [&'static str],
}

impl Lexicons {
    /// The built-in `v1` tables.
    pub const V1: Self = Self {
        version: LEXICON_VERSION,
        negation_words: NEGATION_WORDS,
        antonym_actions: ANTONYM_ACTIONS,
        ppe_denials: PPE_DENIAL_PHRASES,
        lockout_denials: LOCKOUT_DENIAL_PHRASES,
        safety_keywords: SAFETY_KEYWORDS,
        positive_indicators: POSITIVE_INDICATORS,
        negative_indicators: NEGATIVE_INDICATORS,
        compliance_standards: COMPLIANCE_STANDARDS,
    };
}

impl Default for Lexicons {
    fn default() -> Self {
        Self::V1
    }
}

// ============================================================================
// SECTION: Tokenization
// ============================================================================

/// Splits text into lower-cased whitespace tokens with edge punctuation trimmed.
#[must_use]
pub fn normalized_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.trim_matches(|ch: char| !ch.is_alphanumeric() && ch != '\'' && ch != '-')
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Counts tokens of `text` that appear in `words`.
#[must_use]
pub fn count_matches(text: &str, words: &[&str]) -> usize {
    normalized_tokens(text).iter().filter(|token| words.contains(&token.as_str())).count()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
