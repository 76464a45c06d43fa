// crates/arbiter-config/src/config/tests.rs
// ============================================================================
// Module: Arbiter Configuration Unit Tests
// Description: Unit tests for section validators and path helpers.
// Purpose: Pin the limits enforced before any component is built.
// ============================================================================

//! ## Overview
//! Exercises the private validators directly so each limit is checked in
//! isolation from TOML parsing.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use arbiter_core::runtime::CacheConfig;
use arbiter_core::runtime::DecisionConfig;
use arbiter_core::runtime::HitlConfig;

use super::MAX_CACHE_ENTRIES;
use super::MAX_PATH_COMPONENT_LENGTH;
use super::MAX_TOTAL_PATH_LENGTH;
use super::validate_cache;
use super::validate_convex;
use super::validate_decision;
use super::validate_hitl;
use super::validate_path_string;

#[test]
fn convex_weights_accept_rounding_noise() {
    assert!(validate_convex("w", &[0.1, 0.2, 0.7]).is_ok());
    assert!(validate_convex("w", &[0.35, 0.35, 0.15, 0.15]).is_ok());
}

#[test]
fn convex_weights_reject_negative_and_unbalanced() {
    let negative = validate_convex("w", &[1.5, -0.5]).unwrap_err();
    assert!(negative.to_string().contains("non-negative"));

    let short = validate_convex("w", &[0.2, 0.2]).unwrap_err();
    assert!(short.to_string().contains("sum to 1"));

    assert!(validate_convex("w", &[f64::NAN, 1.0]).is_err());
}

#[test]
fn decision_thresholds_must_be_ordered() {
    let config = DecisionConfig {
        approve_max_score: 0.7,
        review_max_score: 0.6,
        ..DecisionConfig::default()
    };
    assert!(validate_decision(&config).unwrap_err().to_string().contains("approve_max_score"));

    let config = DecisionConfig {
        approve_min_similarity: 0.4,
        ..DecisionConfig::default()
    };
    assert!(validate_decision(&config).unwrap_err().to_string().contains("approve_min_similarity"));
}

#[test]
fn hitl_roles_must_be_present() {
    let empty = HitlConfig {
        final_authority_roles: Vec::new(),
    };
    assert!(validate_hitl(&empty).is_err());

    let blank = HitlConfig {
        final_authority_roles: vec!["  ".to_string()],
    };
    assert!(validate_hitl(&blank).is_err());
}

#[test]
fn cache_bounds_only_apply_when_enabled() {
    let disabled = CacheConfig {
        enabled: false,
        ttl_ms: 0,
        max_entries: 0,
    };
    assert!(validate_cache(&disabled).is_ok());

    let oversized = CacheConfig {
        max_entries: MAX_CACHE_ENTRIES + 1,
        ..CacheConfig::default()
    };
    assert!(validate_cache(&oversized).is_err());
}

#[test]
fn path_strings_are_length_limited() {
    assert!(validate_path_string("audit.path", "./logs/audit.jsonl").is_ok());
    assert!(validate_path_string("audit.path", "   ").is_err());
    assert!(validate_path_string("audit.path", &"a".repeat(MAX_TOTAL_PATH_LENGTH + 1)).is_err());
    let component = "b".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
    let error = validate_path_string("audit.path", &format!("logs/{component}")).unwrap_err();
    assert!(error.to_string().contains("component too long"));
}
