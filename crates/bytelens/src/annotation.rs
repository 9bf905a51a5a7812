//! Accepted field decodings.
//!
//! The registry is the only writer of `Decoded` byte state. Listing order is
//! always by offset; indices handed to `remove`/`rename` refer to that order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::state::ByteStateTracker;
use crate::suggestion::ByteRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub kind: String,
    pub range: ByteRange,
    pub value: String,
    pub offset: usize,
}

/// Default name: kind slug plus the offset in hex, e.g. `u32_0004`.
pub fn auto_name(kind: &str, offset: usize) -> String {
    let slug: String = kind
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = slug.trim_matches('_');
    format!("{}_{:04x}", slug, offset)
}

#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    annotations: Vec<Annotation>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a decoding over `range`, marking its bytes `Decoded`.
    ///
    /// Fails without touching any state if the range is out of bounds, empty
    /// or overlaps an already decoded byte. Staged bytes inside the range are
    /// absorbed.
    pub fn accept(
        &mut self,
        state: &mut ByteStateTracker,
        kind: &str,
        range: ByteRange,
        value: &str,
        name: Option<&str>,
    ) -> Result<&Annotation> {
        if range.is_empty() || range.end > state.len() {
            return Err(Error::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: state.len(),
            });
        }
        if let Some(offset) = state.first_decoded(&range.as_range()) {
            return Err(Error::RangeConflict {
                start: range.start,
                end: range.end,
                offset,
            });
        }

        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => auto_name(kind, range.start),
        };

        state.mark_decoded(range.as_range());

        let annotation = Annotation {
            name,
            kind: kind.to_string(),
            range,
            value: value.to_string(),
            offset: range.start,
        };
        info!(
            "Accepted {} {} at {}: {}",
            annotation.kind, annotation.name, annotation.range, annotation.value
        );

        let index = self
            .annotations
            .partition_point(|a| a.offset <= annotation.offset);
        self.annotations.insert(index, annotation);
        Ok(&self.annotations[index])
    }

    /// Remove by list index, returning its bytes to `Free`.
    pub fn remove(&mut self, state: &mut ByteStateTracker, index: usize) -> Result<Annotation> {
        if index >= self.annotations.len() {
            return Err(Error::AnnotationNotFound(index));
        }
        let annotation = self.annotations.remove(index);
        state.release(annotation.range.as_range());
        info!("Removed {} at {}", annotation.name, annotation.range);
        Ok(annotation)
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }
        let annotation = self
            .annotations
            .get_mut(index)
            .ok_or(Error::AnnotationNotFound(index))?;
        annotation.name = name.to_string();
        Ok(())
    }

    pub fn list(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.annotations.get(index)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Total bytes covered by annotations
    pub fn covered_bytes(&self) -> usize {
        self.annotations.iter().map(|a| a.range.len()).sum()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.annotations)?)
    }

    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        info!(
            "Exported {} annotations to {}",
            self.annotations.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}
