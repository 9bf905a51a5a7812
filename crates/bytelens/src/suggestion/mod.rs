//! Candidate interpretations produced by the detectors and the verifier.

mod board;
mod set;

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::rpc::AccountInfo;

pub use board::{BoardEvent, BoardObserver, LiveBoard};
pub use set::{DISPLAY_THRESHOLD, SuggestionSet};

/// Half-open byte interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn with_len(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<Range<usize>> for ByteRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Discriminator,
    U32,
    I32,
    U64,
    Timestamp,
    Text,
    /// Match from the pattern database, tagged with its category
    Pattern(String),
    PublicKey,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discriminator => f.write_str("Discriminator"),
            Self::U32 => f.write_str("u32"),
            Self::I32 => f.write_str("i32"),
            Self::U64 => f.write_str("u64"),
            Self::Timestamp => f.write_str("Timestamp"),
            Self::Text => f.write_str("String"),
            Self::Pattern(category) => write!(f, "Pattern:{}", category),
            Self::PublicKey => f.write_str("PublicKey"),
        }
    }
}

/// Dedupe key: one suggestion per `(range, kind)`.
pub type SuggestionKey = (ByteRange, SuggestionKind);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub range: ByteRange,
    pub value: String,
    pub confidence: f64,
    /// Account details for verified public keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AccountInfo>,
}

impl Suggestion {
    pub fn new(kind: SuggestionKind, range: ByteRange, value: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind,
            range,
            value: value.into(),
            confidence,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: AccountInfo) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn key(&self) -> SuggestionKey {
        (self.range, self.kind.clone())
    }

    /// Exactly 1.0; gates one-click acceptance.
    pub fn is_max_confidence(&self) -> bool {
        self.confidence == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_overlap() {
        let a = ByteRange::new(4, 8);
        assert!(a.overlaps(&ByteRange::new(7, 9)));
        assert!(!a.overlaps(&ByteRange::new(8, 12)));
        assert!(!a.overlaps(&ByteRange::new(0, 4)));
        assert_eq!(a.len(), 4);
        assert_eq!(a.to_string(), "[4, 8)");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(SuggestionKind::U32.to_string(), "u32");
        assert_eq!(
            SuggestionKind::Pattern("constants".to_string()).to_string(),
            "Pattern:constants"
        );
    }

    #[test]
    fn test_max_confidence_is_exact() {
        let range = ByteRange::with_len(0, 32);
        assert!(Suggestion::new(SuggestionKind::PublicKey, range, "k", 1.0).is_max_confidence());
        assert!(!Suggestion::new(SuggestionKind::PublicKey, range, "k", 0.999).is_max_confidence());
    }
}
