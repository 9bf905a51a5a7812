//! Verification work bound to one board generation.
//!
//! Jobs are plain futures; the caller decides whether to await them inline
//! or hand them to `tokio::spawn`. Results for a replaced buffer are dropped
//! by the board's generation check.

use std::sync::Arc;

use tracing::debug;

use super::{KeyCandidate, Outcome, VerificationReport, VerificationResult, Verifier, key_suggestion};
use crate::interpret::InterpretationKind;
use crate::rpc::RpcError;
use crate::suggestion::{BoardEvent, ByteRange, LiveBoard};

/// Verify every public-key candidate from one detector pass.
pub struct VerificationJob {
    generation: u64,
    candidates: Vec<KeyCandidate>,
    verifier: Arc<Verifier>,
    board: Arc<LiveBoard>,
}

impl VerificationJob {
    pub fn new(
        generation: u64,
        candidates: Vec<KeyCandidate>,
        verifier: Arc<Verifier>,
        board: Arc<LiveBoard>,
    ) -> Self {
        Self {
            generation,
            candidates,
            verifier,
            board,
        }
    }

    pub fn candidates(&self) -> &[KeyCandidate] {
        &self.candidates
    }

    pub async fn run(self) -> VerificationReport {
        let Self {
            generation,
            candidates,
            verifier,
            board,
        } = self;

        let mut stale = false;
        let mut report = verifier
            .verify_all(&candidates, |candidate, outcome| match outcome {
                Outcome::Resolved {
                    result: VerificationResult::Positive(info),
                    ..
                } => {
                    if !board.apply(generation, key_suggestion(candidate, info)) {
                        stale = true;
                    }
                }
                Outcome::Resolved { .. } => {}
                Outcome::Failed(error) => {
                    if board.generation() == generation {
                        board.notify(&BoardEvent::VerificationFailed {
                            address: candidate.address.clone(),
                            category: error.category(),
                        });
                    }
                }
            })
            .await;

        report.stale = stale || board.generation() != generation;
        if report.stale {
            debug!("Verification finished for a replaced buffer; results dropped");
        } else {
            board.notify(&BoardEvent::VerificationFinished {
                positive: report.positive,
                negative: report.negative,
                failed: report.failures.len(),
            });
        }
        report
    }
}

/// Existence check behind a 32-byte selection's public-key reading.
///
/// Rewrites the reading in place: first to a pending marker, then to the
/// resolved description.
pub struct SelectionCheck {
    generation: u64,
    address: String,
    range: ByteRange,
    verifier: Arc<Verifier>,
    board: Arc<LiveBoard>,
}

impl SelectionCheck {
    pub fn new(
        generation: u64,
        address: String,
        range: ByteRange,
        verifier: Arc<Verifier>,
        board: Arc<LiveBoard>,
    ) -> Self {
        Self {
            generation,
            address,
            range,
            verifier,
            board,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the final reading text, or `None` if the selection was replaced.
    pub async fn run(self) -> Option<String> {
        self.show(format!("{} (checking…)", self.address))?;

        let text = match self.verifier.lookup(&self.address).await {
            Outcome::Resolved {
                result: VerificationResult::Positive(info),
                ..
            } => format!(
                "{} ({} lamports, owner {})",
                self.address, info.lamports, info.owner
            ),
            Outcome::Resolved { .. } => format!("{} (empty account)", self.address),
            Outcome::Failed(error) => failed_text(&self.address, &error),
        };

        self.show(text.clone())?;
        Some(text)
    }

    fn show(&self, text: String) -> Option<()> {
        self.board
            .update_reading(self.generation, self.range, InterpretationKind::PublicKey, text)
            .then_some(())
    }
}

fn failed_text(address: &str, error: &RpcError) -> String {
    format!("{} (check failed: {})", address, error.category().describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::{EngineConfig, Endpoint};
    use crate::interpret::Interpretation;
    use crate::rpc::mock::{MockTransport, funded};
    use crate::suggestion::{BoardObserver, SuggestionKind};
    use crate::verify::VerificationCache;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Events(Mutex<Vec<BoardEvent>>);

    impl BoardObserver for Events {
        fn on_event(&self, event: &BoardEvent) {
            self.0.lock().push(event.clone());
        }
    }

    fn key_window(seed: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = seed.wrapping_mul(7).wrapping_add(i as u8) | 0x80;
        }
        bytes
    }

    fn verifier(transport: MockTransport) -> Arc<Verifier> {
        let config = EngineConfig::builder()
            .endpoint(Endpoint::new("https://a"))
            .sequential_delay(Duration::ZERO)
            .build();
        let cache = Arc::new(VerificationCache::new(config.cache_ttl, Arc::new(SystemClock)));
        Arc::new(Verifier::new(&config, Arc::new(transport), cache))
    }

    #[tokio::test]
    async fn test_positive_results_become_suggestions() {
        let funded_key = KeyCandidate::from_window(0, &key_window(1)).unwrap();
        let empty_key = KeyCandidate::from_window(32, &key_window(2)).unwrap();
        let verifier = verifier(MockTransport::new().with_account(&funded_key.address, funded(9)));

        let board = Arc::new(LiveBoard::new());
        let events = Arc::new(Events::default());
        board.subscribe(events.clone());
        let generation = board.begin_generation();

        let job = VerificationJob::new(
            generation,
            vec![funded_key.clone(), empty_key],
            verifier,
            board.clone(),
        );
        let report = job.run().await;

        assert_eq!(report.positive, 1);
        assert_eq!(report.negative, 1);
        assert!(!report.stale);

        let max = board.max_confidence();
        assert_eq!(max.len(), 1);
        assert_eq!(max[0].kind, SuggestionKind::PublicKey);
        assert_eq!(max[0].value, funded_key.address);
        assert_eq!(max[0].metadata.as_ref().map(|m| m.lamports), Some(9));

        assert!(events.0.lock().contains(&BoardEvent::VerificationFinished {
            positive: 1,
            negative: 1,
            failed: 0,
        }));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let key = KeyCandidate::from_window(0, &key_window(3)).unwrap();
        let verifier = verifier(MockTransport::new().with_account(&key.address, funded(1)));
        let board = Arc::new(LiveBoard::new());
        let generation = board.begin_generation();

        for _ in 0..2 {
            VerificationJob::new(generation, vec![key.clone()], verifier.clone(), board.clone())
                .run()
                .await;
        }
        assert_eq!(board.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_generation_is_dropped() {
        let key = KeyCandidate::from_window(0, &key_window(4)).unwrap();
        let verifier = verifier(MockTransport::new().with_account(&key.address, funded(1)));
        let board = Arc::new(LiveBoard::new());
        let old = board.begin_generation();
        board.begin_generation();

        let report = VerificationJob::new(old, vec![key], verifier, board.clone())
            .run()
            .await;
        assert!(report.stale);
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn test_selection_check_rewrites_reading() {
        let window = key_window(5);
        let key = KeyCandidate::from_window(0, &window).unwrap();
        let verifier = verifier(MockTransport::new().with_account(&key.address, funded(77)));
        let board = Arc::new(LiveBoard::new());
        let generation = board.begin_generation();
        let range = ByteRange::new(0, 32);
        board.set_selection(
            generation,
            vec![Interpretation::new(InterpretationKind::PublicKey, range, key.address.clone())],
        );

        let text = SelectionCheck::new(generation, key.address.clone(), range, verifier, board.clone())
            .run()
            .await
            .unwrap();

        assert!(text.contains("77 lamports"));
        assert_eq!(board.selection()[0].value, text);
    }

    #[tokio::test]
    async fn test_selection_check_reports_empty_account() {
        let key = KeyCandidate::from_window(0, &key_window(6)).unwrap();
        let board = Arc::new(LiveBoard::new());
        let generation = board.begin_generation();
        let range = ByteRange::new(0, 32);
        board.set_selection(
            generation,
            vec![Interpretation::new(InterpretationKind::PublicKey, range, key.address.clone())],
        );

        let text = SelectionCheck::new(generation, key.address.clone(), range, verifier(MockTransport::new()), board)
            .run()
            .await;
        assert_eq!(text, Some(format!("{} (empty account)", key.address)));
    }
}
