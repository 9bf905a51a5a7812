//! Prelude module for convenient imports
//!
//! ```ignore
//! use bytelens::prelude::*;
//! ```
//!
//! Brings the engine, its configuration, the suggestion and annotation
//! types and the injected collaborator traits into scope.

// Engine and configuration
pub use crate::config::{Endpoint, EngineConfig, EngineConfigBuilder};
pub use crate::engine::{Engine, Selection};

// Error handling
pub use crate::error::{Error, Result};

// Suggestions and annotations
pub use crate::annotation::Annotation;
pub use crate::interpret::{Interpretation, InterpretationKind};
pub use crate::suggestion::{BoardEvent, BoardObserver, ByteRange, Suggestion, SuggestionKind};

// Collaborators
pub use crate::clock::{Clock, SystemClock};
pub use crate::patterns::PatternDatabase;
pub use crate::rpc::{AccountInfo, RpcTransport};
pub use crate::verify::VerificationReport;
