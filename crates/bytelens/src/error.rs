use thiserror::Error;

use crate::rpc::RpcError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    #[error("Invalid base58 input: {0}")]
    InvalidBase58(String),

    #[error("Address must decode to 32 bytes, got {0}")]
    InvalidAddressLength(usize),

    #[error("Range {start}..{end} is outside the loaded buffer ({len} bytes)")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Range {start}..{end} overlaps decoded byte at offset {offset}")]
    RangeConflict {
        start: usize,
        end: usize,
        offset: usize,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(String),

    #[error("Annotation not found: {0}")]
    AnnotationNotFound(usize),

    #[error("Invalid annotation name: {0:?}")]
    InvalidName(String),

    #[error("No buffer loaded")]
    NoBufferLoaded,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Pattern database error: {0}")]
    PatternDatabase(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
