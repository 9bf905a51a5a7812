//! Per-byte state tracking for the loaded buffer.
//!
//! Every byte is `Free`, `Staged` (part of the operator's current selection)
//! or `Decoded` (owned by an accepted annotation). Detectors only look at
//! ranges that are entirely `Free`.
//!
//! Index violations are programming errors and panic; user-facing callers
//! validate ranges before reaching the tracker.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ByteState {
    #[default]
    Free,
    Staged,
    Decoded,
}

#[derive(Debug, Clone, Default)]
pub struct ByteStateTracker {
    states: Vec<ByteState>,
}

impl ByteStateTracker {
    pub fn new(len: usize) -> Self {
        Self {
            states: vec![ByteState::Free; len],
        }
    }

    /// Reset to `len` bytes, all `Free`.
    pub fn reset(&mut self, len: usize) {
        self.states.clear();
        self.states.resize(len, ByteState::Free);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, index: usize) -> ByteState {
        self.states[index]
    }

    pub fn states(&self) -> &[ByteState] {
        &self.states
    }

    pub fn is_free(&self, index: usize) -> bool {
        self.states[index] == ByteState::Free
    }

    /// True iff every index in `start..end` is `Free`.
    pub fn is_range_free(&self, start: usize, end: usize) -> bool {
        self.check_range(start, end);
        self.states[start..end]
            .iter()
            .all(|s| *s == ByteState::Free)
    }

    /// First `Decoded` index in the range, if any.
    pub fn first_decoded(&self, range: &Range<usize>) -> Option<usize> {
        self.check_range(range.start, range.end);
        self.states[range.clone()]
            .iter()
            .position(|s| *s == ByteState::Decoded)
            .map(|i| range.start + i)
    }

    /// Mark a range `Decoded`, clearing any `Staged` marks inside it.
    pub fn mark_decoded(&mut self, range: Range<usize>) {
        self.check_range(range.start, range.end);
        for state in &mut self.states[range] {
            *state = ByteState::Decoded;
        }
    }

    /// Return a range to `Free`.
    pub fn release(&mut self, range: Range<usize>) {
        self.check_range(range.start, range.end);
        for state in &mut self.states[range] {
            *state = ByteState::Free;
        }
    }

    /// Toggle staged membership of a single byte.
    ///
    /// The staged bytes always form one contiguous run:
    /// - staging a byte adjacent to the run extends it
    /// - staging a byte elsewhere starts a new run
    /// - un-staging an edge byte shrinks the run
    /// - un-staging an interior byte clears the run
    ///
    /// `Decoded` bytes cannot be staged; returns whether anything changed.
    pub fn toggle_staged(&mut self, index: usize) -> bool {
        match self.states[index] {
            ByteState::Decoded => false,
            ByteState::Staged => {
                let run = self.staged_run();
                let is_edge = run
                    .as_ref()
                    .is_some_and(|r| index == r.start || index + 1 == r.end);
                if is_edge {
                    self.states[index] = ByteState::Free;
                } else {
                    self.clear_staged();
                }
                true
            }
            ByteState::Free => {
                let adjacent = self.staged_run().is_some_and(|r| {
                    index + 1 == r.start || index == r.end
                });
                if !adjacent {
                    self.clear_staged();
                }
                self.states[index] = ByteState::Staged;
                true
            }
        }
    }

    pub fn clear_staged(&mut self) {
        for state in &mut self.states {
            if *state == ByteState::Staged {
                *state = ByteState::Free;
            }
        }
    }

    /// The contiguous staged run, if any.
    pub fn staged_run(&self) -> Option<Range<usize>> {
        let start = self.states.iter().position(|s| *s == ByteState::Staged)?;
        let len = self.states[start..]
            .iter()
            .take_while(|s| **s == ByteState::Staged)
            .count();
        Some(start..start + len)
    }

    /// Ascending staged indices.
    pub fn staged_indices(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == ByteState::Staged)
            .map(|(i, _)| i)
            .collect()
    }

    /// Maximal runs of `Free` bytes, in offset order.
    pub fn free_runs(&self) -> Vec<Range<usize>> {
        let mut runs = Vec::new();
        let mut start = None;
        for (i, state) in self.states.iter().enumerate() {
            match (state, start) {
                (ByteState::Free, None) => start = Some(i),
                (ByteState::Free, Some(_)) => {}
                (_, Some(s)) => {
                    runs.push(s..i);
                    start = None;
                }
                (_, None) => {}
            }
        }
        if let Some(s) = start {
            runs.push(s..self.states.len());
        }
        runs
    }

    pub fn count(&self, state: ByteState) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }

    fn check_range(&self, start: usize, end: usize) {
        assert!(
            start <= end && end <= self.states.len(),
            "byte range {}..{} out of bounds for {} bytes",
            start,
            end,
            self.states.len()
        );
    }
}
