use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Batch response size mismatch: expected {expected}, got {actual}")]
    BatchMismatch { expected: usize, actual: usize },

    #[error("No RPC endpoints configured")]
    NoEndpoints,
}

/// User-facing failure buckets. Reporting only; nothing here drives retries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FailureCategory {
    Auth,
    RateLimited,
    Forbidden,
    ServerError,
    Unavailable,
    Rejected,
    Timeout,
    Network,
    Rpc,
    MalformedResponse,
}

impl FailureCategory {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Auth => "endpoint requires authentication",
            Self::RateLimited => "endpoint is rate limiting requests",
            Self::Forbidden => "endpoint refused access",
            Self::ServerError => "endpoint returned a server error",
            Self::Unavailable => "endpoint is unavailable",
            Self::Rejected => "endpoint rejected the request",
            Self::Timeout => "request timed out",
            Self::Network => "network error",
            Self::Rpc => "RPC returned an error",
            Self::MalformedResponse => "response could not be parsed",
        }
    }
}

impl RpcError {
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Http { status } => match *status {
                401 => FailureCategory::Auth,
                403 => FailureCategory::Forbidden,
                429 => FailureCategory::RateLimited,
                502..=504 => FailureCategory::Unavailable,
                500..=599 => FailureCategory::ServerError,
                _ => FailureCategory::Rejected,
            },
            Self::Timeout(_) => FailureCategory::Timeout,
            Self::Transport(_) => FailureCategory::Network,
            Self::Rpc { .. } => FailureCategory::Rpc,
            Self::Decode(_) | Self::BatchMismatch { .. } => FailureCategory::MalformedResponse,
            Self::NoEndpoints => FailureCategory::Unavailable,
        }
    }
}

/// RPC error objects whose message means "no such account".
pub fn is_not_found_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("not found") || lower.contains("could not find account")
}
