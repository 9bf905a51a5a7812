//! Heuristic detector pipeline.
//!
//! Every detector sees the buffer and the byte states and only reports
//! ranges whose bytes are all `Free`. Detectors never see each other's
//! output from the same pass.
//!
//! The public-key detector is special: it produces candidates for the
//! verifier rather than suggestions, since its suggestions only exist once
//! an account has been confirmed.

pub mod constants;
mod discriminator;
mod numeric;
mod patterns;
mod pubkey;
mod strings;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::patterns::PatternDatabase;
use crate::state::ByteStateTracker;
use crate::suggestion::Suggestion;
use crate::verify::KeyCandidate;

pub use discriminator::DiscriminatorDetector;
pub use numeric::{NumericDetector, timestamp_confidence};
pub use patterns::PatternDetector;
pub use pubkey::PublicKeyDetector;
pub use strings::{StringDetector, string_confidence};

/// Everything a detector may look at during one pass.
pub struct ScanContext<'a> {
    pub bytes: &'a [u8],
    pub state: &'a ByteStateTracker,
    /// Buffer came from an account's data (enables discriminator handling)
    pub is_account_data: bool,
    pub now: DateTime<Utc>,
}

impl ScanContext<'_> {
    pub fn is_free(&self, start: usize, len: usize) -> bool {
        start + len <= self.bytes.len() && self.state.is_range_free(start, start + len)
    }
}

pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    fn scan(&self, ctx: &ScanContext<'_>) -> Vec<Suggestion>;
}

/// Result of one synchronous pass.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub suggestions: Vec<Suggestion>,
    /// Windows to hand to the verifier
    pub candidates: Vec<KeyCandidate>,
}

pub struct DetectorPipeline {
    detectors: Vec<Box<dyn Detector>>,
    keys: PublicKeyDetector,
}

impl DetectorPipeline {
    pub fn new(patterns: PatternDatabase) -> Self {
        Self {
            detectors: vec![
                Box::new(DiscriminatorDetector),
                Box::new(NumericDetector),
                Box::new(StringDetector),
                Box::new(PatternDetector::new(patterns)),
            ],
            keys: PublicKeyDetector,
        }
    }

    pub fn run(&self, ctx: &ScanContext<'_>) -> ScanOutput {
        let mut output = ScanOutput::default();
        for detector in &self.detectors {
            let found = detector.scan(ctx);
            debug!("{} detector: {} suggestions", detector.name(), found.len());
            output.suggestions.extend(found);
        }
        output.candidates = self.keys.candidates(ctx);
        debug!("{} public key candidates", output.candidates.len());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::SuggestionKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_pipeline_collects_all_detectors() {
        let mut bytes = vec![0xAAu8; 8];
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(b"token mint");
        let state = ByteStateTracker::new(bytes.len());
        let ctx = ScanContext {
            bytes: &bytes,
            state: &state,
            is_account_data: true,
            now: now(),
        };

        let output = DetectorPipeline::new(PatternDatabase::new()).run(&ctx);
        let kinds: Vec<&SuggestionKind> = output.suggestions.iter().map(|s| &s.kind).collect();
        assert!(kinds.contains(&&SuggestionKind::Discriminator));
        assert!(kinds.contains(&&SuggestionKind::U32));
        assert!(kinds.contains(&&SuggestionKind::Text));
        assert!(output.candidates.is_empty());
    }

    #[test]
    fn test_decoded_bytes_are_invisible() {
        let bytes = 1000u32.to_le_bytes().to_vec();
        let mut state = ByteStateTracker::new(4);
        state.mark_decoded(0..4);
        let ctx = ScanContext {
            bytes: &bytes,
            state: &state,
            is_account_data: false,
            now: now(),
        };
        let output = DetectorPipeline::new(PatternDatabase::new()).run(&ctx);
        assert!(output.suggestions.is_empty());
    }
}
