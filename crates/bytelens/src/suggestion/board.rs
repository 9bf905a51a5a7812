//! Shared live state: the suggestion set and the current selection readings.
//!
//! The engine and in-flight verification jobs both write here. Every buffer
//! load starts a new generation; writes tagged with an older generation are
//! dropped so results from a replaced buffer never land on the new one.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::{ByteRange, Suggestion, SuggestionKey, SuggestionSet};
use crate::interpret::{Interpretation, InterpretationKind};
use crate::rpc::FailureCategory;

/// State-change notification for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    SuggestionsChanged { total: usize, ranked: usize },
    SelectionChanged,
    VerificationFailed {
        address: String,
        category: FailureCategory,
    },
    VerificationFinished {
        positive: usize,
        negative: usize,
        failed: usize,
    },
}

pub trait BoardObserver: Send + Sync {
    fn on_event(&self, event: &BoardEvent);
}

#[derive(Debug, Default)]
struct BoardInner {
    generation: u64,
    suggestions: SuggestionSet,
    selection: Vec<Interpretation>,
    /// Accepted ranges; late results overlapping them are discarded
    decoded: Vec<ByteRange>,
}

#[derive(Default)]
pub struct LiveBoard {
    inner: Mutex<BoardInner>,
    observers: RwLock<Vec<Arc<dyn BoardObserver>>>,
}

impl LiveBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn BoardObserver>) {
        self.observers.write().push(observer);
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Start a new generation, discarding all suggestions and readings.
    pub fn begin_generation(&self) -> u64 {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.suggestions.clear();
            inner.selection.clear();
            inner.decoded.clear();
            inner.generation
        };
        debug!("Board generation {}", generation);
        self.notify_suggestions();
        generation
    }

    /// Merge a batch of detector output; returns how many were new.
    pub fn merge(&self, generation: u64, suggestions: Vec<Suggestion>) -> usize {
        let added = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return 0;
            }
            suggestions
                .into_iter()
                .map(|s| inner.suggestions.upsert(s))
                .filter(|added| *added)
                .count()
        };
        self.notify_suggestions();
        added
    }

    /// Apply a single (possibly asynchronous) result. Idempotent per key.
    ///
    /// Returns `false` when the result is stale. A current result that
    /// overlaps an accepted range is discarded without being offered.
    pub fn apply(&self, generation: u64, suggestion: Suggestion) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                debug!(
                    "Dropping stale result for {} (generation {} != {})",
                    suggestion.range, generation, inner.generation
                );
                return false;
            }
            if inner.decoded.iter().any(|r| r.overlaps(&suggestion.range)) {
                debug!("Dropping result for {}: bytes already decoded", suggestion.range);
                return true;
            }
            inner.suggestions.upsert(suggestion);
        }
        self.notify_suggestions();
        true
    }

    /// Record an accepted range and drop every suggestion overlapping it.
    pub fn mark_decoded(&self, range: ByteRange) -> usize {
        let removed = {
            let mut inner = self.inner.lock();
            inner.decoded.push(range);
            inner.suggestions.remove_overlapping(&range)
        };
        if removed > 0 {
            self.notify_suggestions();
        }
        removed
    }

    /// Forget an accepted range after its annotation is removed.
    pub fn release(&self, range: ByteRange) {
        self.inner.lock().decoded.retain(|r| *r != range);
    }

    pub fn get(&self, key: &SuggestionKey) -> Option<Suggestion> {
        self.inner.lock().suggestions.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().suggestions.is_empty()
    }

    pub fn all(&self) -> Vec<Suggestion> {
        self.inner.lock().suggestions.iter().cloned().collect()
    }

    pub fn ranked(&self) -> Vec<Suggestion> {
        self.inner.lock().suggestions.ranked()
    }

    pub fn max_confidence(&self) -> Vec<Suggestion> {
        self.inner.lock().suggestions.max_confidence()
    }

    pub fn set_selection(&self, generation: u64, readings: Vec<Interpretation>) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return false;
            }
            inner.selection = readings;
        }
        self.notify(&BoardEvent::SelectionChanged);
        true
    }

    pub fn selection(&self) -> Vec<Interpretation> {
        self.inner.lock().selection.clone()
    }

    /// Rewrite the displayed value of one selection reading in place.
    pub fn update_reading(
        &self,
        generation: u64,
        range: ByteRange,
        kind: InterpretationKind,
        value: String,
    ) -> bool {
        let updated = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return false;
            }
            match inner
                .selection
                .iter_mut()
                .find(|r| r.range == range && r.kind == kind)
            {
                Some(reading) => {
                    reading.value = value;
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify(&BoardEvent::SelectionChanged);
        }
        updated
    }

    pub fn notify(&self, event: &BoardEvent) {
        for observer in self.observers.read().iter() {
            observer.on_event(event);
        }
    }

    fn notify_suggestions(&self) {
        let event = {
            let inner = self.inner.lock();
            BoardEvent::SuggestionsChanged {
                total: inner.suggestions.len(),
                ranked: inner.suggestions.ranked().len(),
            }
        };
        self.notify(&event);
    }
}
