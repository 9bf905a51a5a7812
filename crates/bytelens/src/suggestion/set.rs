//! Keyed suggestion storage with discovery order and confidence ranking.

use std::collections::{BTreeMap, HashMap};

use super::{ByteRange, Suggestion, SuggestionKey};

/// Suggestions below this confidence are kept but not ranked for display.
pub const DISPLAY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Default)]
pub struct SuggestionSet {
    /// Discovery sequence -> suggestion
    entries: BTreeMap<u64, Suggestion>,
    index: HashMap<SuggestionKey, u64>,
    next_seq: u64,
}

impl SuggestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.next_seq = 0;
    }

    /// Insert or replace by `(range, kind)`.
    ///
    /// Replacing keeps the original discovery position. Returns `true` when a
    /// new entry was added.
    pub fn upsert(&mut self, suggestion: Suggestion) -> bool {
        let key = suggestion.key();
        if let Some(seq) = self.index.get(&key) {
            self.entries.insert(*seq, suggestion);
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(key, seq);
        self.entries.insert(seq, suggestion);
        true
    }

    pub fn get(&self, key: &SuggestionKey) -> Option<&Suggestion> {
        self.index.get(key).and_then(|seq| self.entries.get(seq))
    }

    pub fn remove(&mut self, key: &SuggestionKey) -> Option<Suggestion> {
        let seq = self.index.remove(key)?;
        self.entries.remove(&seq)
    }

    /// Drop every suggestion overlapping `range`.
    pub fn remove_overlapping(&mut self, range: &ByteRange) -> usize {
        let doomed: Vec<SuggestionKey> = self
            .entries
            .values()
            .filter(|s| s.range.overlaps(range))
            .map(Suggestion::key)
            .collect();
        for key in &doomed {
            self.remove(key);
        }
        doomed.len()
    }

    /// All suggestions in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.entries.values()
    }

    /// Display ranking: confidence >= threshold, highest first, stable on ties.
    pub fn ranked(&self) -> Vec<Suggestion> {
        let mut ranked: Vec<Suggestion> = self
            .entries
            .values()
            .filter(|s| s.confidence >= DISPLAY_THRESHOLD)
            .cloned()
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked
    }

    /// Suggestions eligible for one-click acceptance.
    pub fn max_confidence(&self) -> Vec<Suggestion> {
        self.entries
            .values()
            .filter(|s| s.is_max_confidence())
            .cloned()
            .collect()
    }
}
