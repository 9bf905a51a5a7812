//! Engine configuration.
//!
//! The engine consumes these settings but does not own where they come from;
//! the CLI reads them from a TOML settings file.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use bytelens::config::{EngineConfig, Endpoint};
//!
//! let config = EngineConfig::builder()
//!     .endpoint(Endpoint::new("https://api.mainnet-beta.solana.com"))
//!     .request_timeout(Duration::from_secs(5))
//!     .batching(true)
//!     .build();
//! assert_eq!(config.endpoints.len(), 1);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";

/// Candidates per combined request in batched mode
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_SEQUENTIAL_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Verification cache time-to-live (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// An RPC endpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
        }
    }

    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ordered; consulted front to back on each fallback
    pub endpoints: Vec<Endpoint>,
    /// Per-request timeout; exceeding it counts as an endpoint failure
    pub request_timeout: Duration,
    /// Batched (one combined request per group) vs sequential verification
    pub batching: bool,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub sequential_delay: Duration,
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![Endpoint::new(DEFAULT_ENDPOINT)],
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            batching: false,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            sequential_delay: DEFAULT_SEQUENTIAL_DELAY,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    endpoints: Vec<Endpoint>,
    request_timeout: Option<Duration>,
    batching: Option<bool>,
    batch_size: Option<usize>,
    batch_delay: Option<Duration>,
    sequential_delay: Option<Duration>,
    cache_ttl: Option<Duration>,
}

impl EngineConfigBuilder {
    /// Append an endpoint to the fallback order
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn endpoints<I: IntoIterator<Item = Endpoint>>(mut self, endpoints: I) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn batching(mut self, enabled: bool) -> Self {
        self.batching = Some(enabled);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size.max(1));
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn sequential_delay(mut self, delay: Duration) -> Self {
        self.sequential_delay = Some(delay);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Build the configuration
    pub fn build(self) -> EngineConfig {
        let default = EngineConfig::default();
        EngineConfig {
            endpoints: if self.endpoints.is_empty() {
                default.endpoints
            } else {
                self.endpoints
            },
            request_timeout: self.request_timeout.unwrap_or(default.request_timeout),
            batching: self.batching.unwrap_or(default.batching),
            batch_size: self.batch_size.unwrap_or(default.batch_size),
            batch_delay: self.batch_delay.unwrap_or(default.batch_delay),
            sequential_delay: self.sequential_delay.unwrap_or(default.sequential_delay),
            cache_ttl: self.cache_ttl.unwrap_or(default.cache_ttl),
        }
    }
}
