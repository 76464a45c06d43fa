// crates/arbiter-core/src/runtime/cache.rs
// ============================================================================
// Module: Verdict Cache
// Description: Time- and capacity-bounded memoization of analysis results.
// Purpose: Skip recomputation for identical response sets.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Entries are keyed by the canonical JSON hash of the inputs and expire
//! after a fixed TTL measured on the injected clock. When full, expired
//! entries are dropped first, then the oldest entry. The cache sits in front
//! of the decision path only; ledger writes happen on hits and misses alike.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::HashError;
use crate::core::Timestamp;
use crate::core::hashing::hash_canonical_json;
use crate::interfaces::Clock;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether memoization is active.
    pub enabled: bool,
    /// Entry lifetime in milliseconds.
    pub ttl_ms: u64,
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: 60_000,
            max_entries: 256,
        }
    }
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Cached value with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// Cached value.
    value: V,
    /// Insertion time.
    inserted_at: Timestamp,
}

/// Bounded memoization cache.
pub struct VerdictCache<V> {
    /// Bounds.
    config: CacheConfig,
    /// Time source for expiry.
    clock: Arc<dyn Clock>,
    /// Entries by input hash.
    entries: Mutex<BTreeMap<String, CacheEntry<V>>>,
}

impl<V: Clone> VerdictCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Derives the cache key for a serializable input.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the input has no canonical JSON form.
    pub fn key_for<T: Serialize + ?Sized>(input: &T) -> Result<String, HashError> {
        Ok(hash_canonical_json(DEFAULT_HASH_ALGORITHM, input)?.value)
    }

    /// Returns a live entry, dropping it if it has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.config.enabled {
            return None;
        }
        let now = self.clock.now();
        let mut entries = self.entries.lock().ok()?;
        let live = entries.get(key).is_some_and(|entry| self.is_live(entry, now));
        if live {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    /// Stores a value, evicting expired then oldest entries when full.
    pub fn insert(&self, key: String, value: V) {
        if !self.config.enabled || self.config.max_entries == 0 {
            return;
        }
        let now = self.clock.now();
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if !entries.contains_key(&key) && entries.len() >= self.config.max_entries {
            entries.retain(|_, entry| self.is_live(entry, now));
            while entries.len() >= self.config.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(oldest) => {
                        entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Number of stored entries, live or not.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// True while the entry is younger than the TTL.
    fn is_live(&self, entry: &CacheEntry<V>, now: Timestamp) -> bool {
        now.millis_since(entry.inserted_at) < self.config.ttl_ms
    }
}
