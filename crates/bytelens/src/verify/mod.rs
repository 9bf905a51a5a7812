//! Account verification orchestrator.
//!
//! Resolves public-key candidates against live endpoints:
//!
//! 1. fresh cache entry: use it, no network call
//! 2. otherwise walk the endpoint list in order until one answers
//! 3. cache positive and negative answers; failures are reported, not cached
//!
//! Candidates are processed either in batches (one combined request per
//! group, fixed delay between groups) or sequentially (one request per
//! candidate, fixed delay between calls). A failed candidate never stops the
//! rest of the list.

mod account;
mod cache;
mod endpoints;
mod job;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::codec::base58;
use crate::config::EngineConfig;
use crate::rpc::{FailureCategory, RpcError, RpcRequest, RpcTransport};
use crate::suggestion::{ByteRange, Suggestion, SuggestionKind};

pub use account::AccountFetcher;
pub use cache::{VerificationCache, VerificationCacheEntry, VerificationResult};
pub use endpoints::EndpointPool;
pub use job::{SelectionCheck, VerificationJob};

pub const KEY_LEN: usize = 32;

/// Zero-byte count up to which a funded key earns full confidence
const ZERO_BYTE_ALLOWANCE: usize = 20;

/// A 32-byte window whose base58 rendering looks like an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCandidate {
    pub address: String,
    pub offset: usize,
    /// Zero bytes in the original window
    pub zero_bytes: usize,
}

impl KeyCandidate {
    /// Build a candidate from a 32-byte window.
    ///
    /// Returns `None` for all-zero windows and renderings that fail the
    /// strict address check.
    pub fn from_window(offset: usize, window: &[u8]) -> Option<Self> {
        if window.len() != KEY_LEN {
            return None;
        }
        let zero_bytes = window.iter().filter(|&&b| b == 0).count();
        if zero_bytes == KEY_LEN {
            return None;
        }
        let address = base58::encode(window);
        if !base58::is_plausible_address(&address) {
            return None;
        }
        Some(Self {
            address,
            offset,
            zero_bytes,
        })
    }

    pub fn range(&self) -> ByteRange {
        ByteRange::with_len(self.offset, KEY_LEN)
    }
}

/// Confidence for a funded key given the zero-byte count of its window.
pub fn key_confidence(zero_bytes: usize) -> f64 {
    if zero_bytes <= ZERO_BYTE_ALLOWANCE {
        1.0
    } else {
        let penalty = 0.05 * (zero_bytes - ZERO_BYTE_ALLOWANCE) as f64;
        (0.95 - penalty).max(0.7)
    }
}

pub fn key_suggestion(candidate: &KeyCandidate, info: &crate::rpc::AccountInfo) -> Suggestion {
    Suggestion::new(
        SuggestionKind::PublicKey,
        candidate.range(),
        candidate.address.clone(),
        key_confidence(candidate.zero_bytes),
    )
    .with_metadata(info.clone())
}

/// Per-candidate outcome of a verification run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Resolved {
        result: VerificationResult,
        from_cache: bool,
    },
    Failed(RpcError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub address: String,
    pub offset: usize,
    pub category: FailureCategory,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub positive: usize,
    pub negative: usize,
    pub cache_hits: usize,
    pub failures: Vec<VerificationFailure>,
    /// Set when results were dropped because the buffer was replaced
    pub stale: bool,
}

impl VerificationReport {
    fn record(&mut self, candidate: &KeyCandidate, outcome: &Outcome) {
        match outcome {
            Outcome::Resolved { result, from_cache } => {
                if *from_cache {
                    self.cache_hits += 1;
                }
                if result.is_positive() {
                    self.positive += 1;
                } else {
                    self.negative += 1;
                }
            }
            Outcome::Failed(error) => self.failures.push(VerificationFailure {
                address: candidate.address.clone(),
                offset: candidate.offset,
                category: error.category(),
                message: error.to_string(),
            }),
        }
    }

    pub fn processed(&self) -> usize {
        self.positive + self.negative + self.failures.len()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rpc_requests: u64,
    pub rpc_failures: u64,
}

#[derive(Debug, Clone)]
struct Schedule {
    batching: bool,
    batch_size: usize,
    batch_delay: Duration,
    sequential_delay: Duration,
}

pub struct Verifier {
    pool: EndpointPool,
    cache: Arc<VerificationCache>,
    schedule: Schedule,
    metrics: Mutex<Metrics>,
    next_id: AtomicU64,
}

impl Verifier {
    pub fn new(
        config: &EngineConfig,
        transport: Arc<dyn RpcTransport>,
        cache: Arc<VerificationCache>,
    ) -> Self {
        Self {
            pool: EndpointPool::from_config(config, transport),
            cache,
            schedule: Schedule {
                batching: config.batching,
                batch_size: config.batch_size.max(1),
                batch_delay: config.batch_delay,
                sequential_delay: config.sequential_delay,
            },
            metrics: Mutex::new(Metrics::default()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn cache(&self) -> &Arc<VerificationCache> {
        &self.cache
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.lock().clone()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn cached(&self, address: &str) -> Option<VerificationResult> {
        let hit = self.cache.get(address);
        let mut metrics = self.metrics.lock();
        if hit.is_some() {
            metrics.cache_hits += 1;
            debug!("Cache hit for {}", address);
        } else {
            metrics.cache_misses += 1;
        }
        hit
    }

    /// Resolve a single address: cache first, then endpoint fallback.
    pub async fn lookup(&self, address: &str) -> Outcome {
        if let Some(result) = self.cached(address) {
            return Outcome::Resolved {
                result,
                from_cache: true,
            };
        }
        self.fetch(address).await
    }

    async fn fetch(&self, address: &str) -> Outcome {
        self.metrics.lock().rpc_requests += 1;
        match self.pool.get_account(self.next_id(), address).await {
            Ok(lookup) => {
                let result = VerificationResult::from_lookup(lookup);
                self.cache.insert(address, result.clone());
                Outcome::Resolved {
                    result,
                    from_cache: false,
                }
            }
            Err(e) => {
                self.metrics.lock().rpc_failures += 1;
                warn!("Verification failed for {}: {}", address, e);
                Outcome::Failed(e)
            }
        }
    }

    /// Process every candidate, invoking `on_outcome` as each resolves.
    pub async fn verify_all<F>(&self, candidates: &[KeyCandidate], mut on_outcome: F) -> VerificationReport
    where
        F: FnMut(&KeyCandidate, &Outcome) + Send,
    {
        let mut report = VerificationReport::default();
        let mut emit = |candidate: &KeyCandidate, outcome: Outcome| {
            report.record(candidate, &outcome);
            on_outcome(candidate, &outcome);
        };

        if self.schedule.batching {
            self.run_batched(candidates, &mut emit).await;
        } else {
            self.run_sequential(candidates, &mut emit).await;
        }

        info!(
            "Verified {} candidates: {} positive, {} negative, {} failed ({} from cache)",
            candidates.len(),
            report.positive,
            report.negative,
            report.failures.len(),
            report.cache_hits
        );
        report
    }

    async fn run_sequential<E>(&self, candidates: &[KeyCandidate], emit: &mut E)
    where
        E: FnMut(&KeyCandidate, Outcome) + Send,
    {
        let mut calls = 0usize;
        for candidate in candidates {
            if let Some(result) = self.cached(&candidate.address) {
                emit(
                    candidate,
                    Outcome::Resolved {
                        result,
                        from_cache: true,
                    },
                );
                continue;
            }

            if calls > 0 && !self.schedule.sequential_delay.is_zero() {
                tokio::time::sleep(self.schedule.sequential_delay).await;
            }
            calls += 1;

            let outcome = self.fetch(&candidate.address).await;
            emit(candidate, outcome);
        }
    }

    async fn run_batched<E>(&self, candidates: &[KeyCandidate], emit: &mut E)
    where
        E: FnMut(&KeyCandidate, Outcome) + Send,
    {
        let mut misses = Vec::new();
        for candidate in candidates {
            match self.cached(&candidate.address) {
                Some(result) => emit(
                    candidate,
                    Outcome::Resolved {
                        result,
                        from_cache: true,
                    },
                ),
                None => misses.push(candidate),
            }
        }

        for (index, group) in misses.chunks(self.schedule.batch_size).enumerate() {
            if index > 0 && !self.schedule.batch_delay.is_zero() {
                tokio::time::sleep(self.schedule.batch_delay).await;
            }

            let outcomes = self.fetch_group(group).await;
            for candidate in group {
                let outcome = outcomes
                    .get(&candidate.address)
                    .cloned()
                    .unwrap_or_else(|| {
                        Outcome::Failed(RpcError::Decode(format!(
                            "no response for {}",
                            candidate.address
                        )))
                    });
                emit(*candidate, outcome);
            }
        }
    }

    /// One combined request for a group; responses are matched by id.
    async fn fetch_group(&self, group: &[&KeyCandidate]) -> HashMap<String, Outcome> {
        let mut requests: Vec<RpcRequest> = Vec::new();
        let mut by_id: HashMap<u64, String> = HashMap::new();
        for candidate in group {
            if by_id.values().any(|a| *a == candidate.address) {
                continue;
            }
            let id = self.next_id();
            by_id.insert(id, candidate.address.clone());
            requests.push(RpcRequest::get_account_info(id, &candidate.address));
        }

        self.metrics.lock().rpc_requests += 1;
        let mut outcomes = HashMap::new();

        let responses = match self.pool.get_accounts_batch(&requests).await {
            Ok(responses) => responses,
            Err(e) => {
                self.metrics.lock().rpc_failures += 1;
                warn!("Batch of {} failed on every endpoint: {}", requests.len(), e);
                for address in by_id.into_values() {
                    outcomes.insert(address, Outcome::Failed(e.clone()));
                }
                return outcomes;
            }
        };

        if responses.len() != requests.len() {
            debug!(
                "Batch returned {} responses for {} requests",
                responses.len(),
                requests.len()
            );
        }

        for response in responses {
            let Some(address) = response.id.and_then(|id| by_id.remove(&id)) else {
                continue;
            };
            let outcome = match response.into_lookup() {
                Ok(lookup) => {
                    let result = VerificationResult::from_lookup(lookup);
                    self.cache.insert(&address, result.clone());
                    Outcome::Resolved {
                        result,
                        from_cache: false,
                    }
                }
                Err(e) => Outcome::Failed(e),
            };
            outcomes.insert(address, outcome);
        }

        let expected = requests.len();
        let actual = expected - by_id.len();
        for address in by_id.into_values() {
            outcomes.insert(
                address,
                Outcome::Failed(RpcError::BatchMismatch { expected, actual }),
            );
        }

        outcomes
    }
}
