//! Verification cache keyed by base58 candidate.
//!
//! Entries are never evicted. A lookup older than the TTL is treated as a
//! miss and the next verification overwrites it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::rpc::AccountInfo;

/// Outcome of a completed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationResult {
    /// Account exists and holds lamports
    Positive(AccountInfo),
    /// No account, or an account with zero lamports
    Negative,
}

impl VerificationResult {
    pub fn from_lookup(lookup: Option<AccountInfo>) -> Self {
        match lookup {
            Some(info) if info.exists() => Self::Positive(info),
            _ => Self::Negative,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCacheEntry {
    pub key: String,
    pub result: VerificationResult,
    pub stored_at: DateTime<Utc>,
}

pub struct VerificationCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, VerificationCacheEntry>>,
}

impl VerificationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh entry for `key`, if any.
    pub fn get(&self, key: &str) -> Option<VerificationResult> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;

        let age = (self.clock.now() - entry.stored_at)
            .to_std()
            .unwrap_or_default();
        if age >= self.ttl {
            debug!("Cache entry for {} expired: age={}s", key, age.as_secs());
            return None;
        }

        Some(entry.result.clone())
    }

    pub fn insert(&self, key: &str, result: VerificationResult) {
        let entry = VerificationCacheEntry {
            key: key.to_string(),
            result,
            stored_at: self.clock.now(),
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
