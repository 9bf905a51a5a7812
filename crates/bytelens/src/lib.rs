//! # bytelens
//!
//! Byte annotation and verification engine.
//!
//! This crate provides:
//! - Numeric, hex and base58 codecs
//! - Per-byte state tracking (free, staged, decoded)
//! - A heuristic detector pipeline producing ranked suggestions
//! - On-demand interpretation of a selected byte run
//! - An annotation registry for accepted decodings
//! - Asynchronous account verification with caching and endpoint fallback
//!
//! ## Feature Flags
//!
//! - `http` (default): `reqwest`-backed [`rpc::HttpTransport`].

pub mod annotation;
pub mod clock;
pub mod codec;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod hexdump;
pub mod interpret;
pub mod patterns;
pub mod prelude;
pub mod rpc;
pub mod state;
pub mod suggestion;
pub mod verify;

pub use annotation::{Annotation, AnnotationRegistry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Endpoint, EngineConfig, EngineConfigBuilder};
pub use engine::{Engine, Selection};
pub use error::{Error, Result};
pub use interpret::{Interpretation, InterpretationKind, interpret};
pub use patterns::PatternDatabase;
#[cfg(feature = "http")]
pub use rpc::HttpTransport;
pub use rpc::{AccountInfo, FailureCategory, RpcError, RpcTransport};
pub use state::{ByteState, ByteStateTracker};
pub use suggestion::{
    BoardEvent, BoardObserver, ByteRange, LiveBoard, Suggestion, SuggestionKind,
};
pub use verify::{
    AccountFetcher, KeyCandidate, Metrics, VerificationCache, VerificationJob,
    VerificationReport, Verifier,
};
