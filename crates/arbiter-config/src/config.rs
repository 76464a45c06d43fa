// crates/arbiter-config/src/config.rs
// ============================================================================
// Module: Arbiter Configuration
// Description: Configuration loading, validation, and engine construction.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: arbiter-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every component section is optional and falls back to the documented
//! defaults; the `[ledger]` section is required because the signing key has
//! no fallback. Weight tables must be convex and threshold pairs ordered.
//!
//! Security posture: config inputs are untrusted. The signing key is never
//! stored in the file; the file names the environment variable that holds it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use arbiter_core::ArbitrationEngine;
use arbiter_core::EngineHost;
use arbiter_core::EngineSettings;
use arbiter_core::EvidenceBlockSink;
use arbiter_core::Lexicons;
use arbiter_core::SigningKey;
use arbiter_core::SystemClock;
use arbiter_core::ValidatorId;
use arbiter_core::runtime::ArbiterAuditSink;
use arbiter_core::runtime::CacheConfig;
use arbiter_core::runtime::ClassifierConfig;
use arbiter_core::runtime::DecisionConfig;
use arbiter_core::runtime::FileAuditSink;
use arbiter_core::runtime::HitlConfig;
use arbiter_core::runtime::NoopAuditSink;
use arbiter_core::runtime::ScorerConfig;
use arbiter_core::runtime::SemanticConfig;
use arbiter_core::runtime::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "arbiter.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ARBITER_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of final-authority roles.
pub(crate) const MAX_AUTHORITY_ROLES: usize = 32;
/// Maximum number of cached verdicts.
pub(crate) const MAX_CACHE_ENTRIES: usize = 65_536;
/// Tolerance when checking that weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
/// Default validator identity for engine-produced blocks.
const DEFAULT_VALIDATOR: &str = "arbiter";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Procedure arbiter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ArbiterConfig {
    /// Structured scorer weights and threshold.
    #[serde(default)]
    pub scoring: ScorerConfig,
    /// Semantic analyzer configuration.
    #[serde(default)]
    pub semantic: SemanticConfig,
    /// Classifier rule thresholds.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Decision weights and recommendation thresholds.
    #[serde(default)]
    pub decision: DecisionConfig,
    /// HITL authority configuration.
    #[serde(default)]
    pub hitl: HitlConfig,
    /// Evidence ledger configuration (required).
    pub ledger: LedgerConfig,
    /// Verdict cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Evidence ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Name of the environment variable holding the signing key.
    pub signing_key_env: String,
    /// Validator identity written on engine-produced blocks.
    #[serde(default = "default_validator")]
    pub validator: String,
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// Append-only JSON lines file.
    File,
    /// Discard audit events.
    None,
}

/// Audit sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path; required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl ArbiterConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path argument wins, then [`CONFIG_ENV_VAR`], then `arbiter.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_scoring(&self.scoring)?;
        validate_semantic(&self.semantic)?;
        validate_classifier(&self.classifier)?;
        validate_decision(&self.decision)?;
        validate_hitl(&self.hitl)?;
        self.ledger.validate()?;
        validate_cache(&self.cache)?;
        self.audit.validate()
    }

    /// Reads the signing key from the environment variable named by
    /// `ledger.signing_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the variable is unset or the key
    /// is shorter than 32 bytes.
    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        self.signing_key_from(|name| env::var(name).ok())
    }

    /// Resolves the signing key through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the lookup yields nothing or the
    /// key is too short.
    pub fn signing_key_from<F>(&self, lookup: F) -> Result<SigningKey, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let name = self.ledger.signing_key_env.as_str();
        let secret = lookup(name).ok_or_else(|| {
            ConfigError::Invalid(format!("signing key variable {name} is not set"))
        })?;
        SigningKey::new(secret.into_bytes())
            .map_err(|err| ConfigError::Invalid(format!("ledger.signing_key_env: {err}")))
    }

    /// Returns the component settings described by this configuration.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            scorer: self.scoring,
            semantic: self.semantic,
            classifier: self.classifier,
            decision: self.decision,
            hitl: self.hitl.clone(),
            cache: self.cache,
            validator: ValidatorId::new(self.ledger.validator.trim()),
            lexicons: Lexicons::V1,
        }
    }

    /// Opens the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn ArbiterAuditSink>, ConfigError> {
        match (self.audit.sink, self.audit.path.as_deref()) {
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
        }
    }

    /// Builds an engine with the wall clock and the given key and block sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit sink cannot be opened or the
    /// ledger cannot be initialized.
    pub fn build_engine(
        &self,
        signing_key: SigningKey,
        sink: Arc<dyn EvidenceBlockSink>,
    ) -> Result<ArbitrationEngine, ConfigError> {
        let host = EngineHost {
            signing_key,
            clock: Arc::new(SystemClock),
            sink,
            audit: self.audit_sink()?,
        };
        ArbitrationEngine::new(self.engine_settings(), host)
            .map_err(|err| ConfigError::Build(err.to_string()))
    }

    /// Builds an engine, reading the signing key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the key is missing or weak, or when
    /// [`ArbiterConfig::build_engine`] fails.
    pub fn build_engine_from_env(
        &self,
        sink: Arc<dyn EvidenceBlockSink>,
    ) -> Result<ArbitrationEngine, ConfigError> {
        self.build_engine(self.signing_key()?, sink)
    }
}

impl LedgerConfig {
    /// Validates ledger identity settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.signing_key_env.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid(
                "ledger.signing_key_env must be non-empty".to_string(),
            ));
        }
        if name.contains('=') || name.contains('\0') {
            return Err(ConfigError::Invalid(
                "ledger.signing_key_env must be a valid environment variable name".to_string(),
            ));
        }
        if self.validator.trim().is_empty() {
            return Err(ConfigError::Invalid("ledger.validator must be non-empty".to_string()));
        }
        Ok(())
    }
}

impl AuditConfig {
    /// Validates the sink selection.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(path)) => validate_path_string("audit.path", path),
            (_, None) => Ok(()),
        }
    }
}

/// Default validator identity.
fn default_validator() -> String {
    DEFAULT_VALIDATOR.to_string()
}

// ============================================================================
// SECTION: Section Validation
// ============================================================================

/// Validates structured scoring weights and thresholds.
fn validate_scoring(config: &ScorerConfig) -> Result<(), ConfigError> {
    validate_convex("scoring.weights", &config.weights.as_array())?;
    let step = config.step_similarity.as_array();
    if step.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
        return Err(ConfigError::Invalid(
            "scoring.step_similarity weights must be non-negative".to_string(),
        ));
    }
    if step.iter().sum::<f64>() <= 0.0 {
        return Err(ConfigError::Invalid(
            "scoring.step_similarity weights must not all be zero".to_string(),
        ));
    }
    validate_unit("scoring.length_penalty_weight", config.length_penalty_weight)?;
    validate_unit("scoring.threshold", config.threshold)
}

/// Validates the neutral similarity value.
fn validate_semantic(config: &SemanticConfig) -> Result<(), ConfigError> {
    let value = config.neutral_similarity;
    if !value.is_finite() || !(-1.0 ..= 1.0).contains(&value) {
        return Err(ConfigError::Invalid(
            "semantic.neutral_similarity must be within [-1, 1]".to_string(),
        ));
    }
    Ok(())
}

/// Validates classifier rule thresholds.
fn validate_classifier(config: &ClassifierConfig) -> Result<(), ConfigError> {
    validate_unit("classifier.safety_score_range", config.safety_score_range)?;
    validate_unit("classifier.logic_score_variance", config.logic_score_variance)
}

/// Validates decision weights and threshold ordering.
fn validate_decision(config: &DecisionConfig) -> Result<(), ConfigError> {
    validate_convex(
        "decision weights",
        &[config.agreement_weight, config.semantic_weight, config.findings_weight],
    )?;
    let severity = config.severity_weights;
    for (field, value) in [
        ("decision.severity_weights.low", severity.low),
        ("decision.severity_weights.medium", severity.medium),
        ("decision.severity_weights.high", severity.high),
        ("decision.severity_weights.critical", severity.critical),
        ("decision.approve_max_score", config.approve_max_score),
        ("decision.review_max_score", config.review_max_score),
        ("decision.approve_min_similarity", config.approve_min_similarity),
        ("decision.review_min_similarity", config.review_min_similarity),
    ] {
        validate_unit(field, value)?;
    }
    if config.approve_max_score > config.review_max_score {
        return Err(ConfigError::Invalid(
            "decision.approve_max_score must not exceed decision.review_max_score".to_string(),
        ));
    }
    if config.approve_min_similarity < config.review_min_similarity {
        return Err(ConfigError::Invalid(
            "decision.approve_min_similarity must be at least decision.review_min_similarity"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validates the final-authority role list.
fn validate_hitl(config: &HitlConfig) -> Result<(), ConfigError> {
    if config.final_authority_roles.is_empty() {
        return Err(ConfigError::Invalid(
            "hitl.final_authority_roles must be non-empty".to_string(),
        ));
    }
    if config.final_authority_roles.len() > MAX_AUTHORITY_ROLES {
        return Err(ConfigError::Invalid("too many hitl.final_authority_roles entries".to_string()));
    }
    if config.final_authority_roles.iter().any(|role| role.trim().is_empty()) {
        return Err(ConfigError::Invalid(
            "hitl.final_authority_roles entries must be non-empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates cache bounds.
fn validate_cache(config: &CacheConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }
    if config.ttl_ms == 0 {
        return Err(ConfigError::Invalid("cache.ttl_ms must be greater than zero".to_string()));
    }
    if config.max_entries == 0 || config.max_entries > MAX_CACHE_ENTRIES {
        return Err(ConfigError::Invalid(format!(
            "cache.max_entries must be within 1..={MAX_CACHE_ENTRIES}"
        )));
    }
    Ok(())
}

/// Requires non-negative finite weights summing to one.
fn validate_convex(field: &str, weights: &[f64]) -> Result<(), ConfigError> {
    if weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
        return Err(ConfigError::Invalid(format!("{field} must be non-negative")));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::Invalid(format!("{field} must sum to 1 (got {sum})")));
    }
    Ok(())
}

/// Requires a finite value within [0, 1].
fn validate_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0 ..= 1.0).contains(&value) {
        return Err(ConfigError::Invalid(format!("{field} must be within [0, 1]")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Engine construction failed.
    #[error("engine construction failed: {0}")]
    Build(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
