// crates/arbiter-core/src/core/hashing.rs
// ============================================================================
// Module: Arbiter Canonical Hashing and Signing
// Description: RFC 8785 JSON canonicalization, content hashing, and HMAC signatures.
// Purpose: Provide deterministic digests and keyed signatures for ledger blocks.
// Dependencies: serde, serde_jcs, sha2, hmac, subtle
// ============================================================================

//! ## Overview
//! All structured values are hashed over their RFC 8785 (JCS) canonical JSON
//! form so digests are stable across field ordering and platforms. Ledger
//! signatures are HMAC-SHA256 over the lowercase hex block hash and are
//! compared in constant time.
//!
//! Security posture: the signing key is mandatory input with no fallback.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum signing key length in bytes.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// HMAC-SHA256 instance used for block signatures.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Supported hash algorithms for arbiter artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing.
    Sha256,
}

/// Default hash algorithm for the arbiter.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

/// Deterministic content hash representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Creates a new digest from raw bytes.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }
}

// ============================================================================
// SECTION: Signing Key
// ============================================================================

/// Secret key used to sign ledger blocks.
///
/// # Invariants
/// - At least [`MIN_SIGNING_KEY_BYTES`] bytes long.
/// - Never rendered by `Debug`.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Creates a signing key from raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::WeakKey`] when the key is shorter than
    /// [`MIN_SIGNING_KEY_BYTES`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, HashError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SIGNING_KEY_BYTES {
            return Err(HashError::WeakKey {
                actual: bytes.len(),
                minimum: MIN_SIGNING_KEY_BYTES,
            });
        }
        Ok(Self(bytes))
    }

    /// Returns the secret key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").field("len", &self.0.len()).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes or signatures.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
    /// Signing key is too short.
    #[error("signing key too short: {actual} bytes (minimum {minimum})")]
    WeakKey {
        /// Provided key length.
        actual: usize,
        /// Required minimum length.
        minimum: usize,
    },
    /// Signature computation failed.
    #[error("failed to compute signature: {0}")]
    Signature(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON using the provided algorithm.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes using the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            HashDigest::new(HashAlgorithm::Sha256, &digest)
        }
    }
}

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// Computes a lowercase hex HMAC-SHA256 signature over `message`.
///
/// # Errors
///
/// Returns [`HashError::Signature`] when the MAC cannot be initialized.
pub fn sign_hex(key: &SigningKey, message: &[u8]) -> Result<String, HashError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|err| HashError::Signature(err.to_string()))?;
    mac.update(message);
    Ok(hex_encode(&mac.finalize().into_bytes()))
}

/// Compares two hex strings in constant time.
#[must_use]
pub fn constant_time_eq(left: &str, right: &str) -> bool {
    left.as_bytes().ct_eq(right.as_bytes()).into()
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
