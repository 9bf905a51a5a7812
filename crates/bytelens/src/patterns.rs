//! Read-only database of known byte patterns.
//!
//! On disk the database is JSON of the shape
//! `{ "<category>": { "<hex pattern>": "<description>" } }`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const CATEGORY_DISCRIMINATORS: &str = "discriminators";
pub const CATEGORY_CONSTANTS: &str = "constants";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub category: String,
    /// Lowercase hex, no separators
    pub hex: String,
    pub bytes: Vec<u8>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternDatabase {
    categories: BTreeMap<String, BTreeMap<String, String>>,
}

impl PatternDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let db: Self = serde_json::from_str(json)?;
        db.validate()?;
        Ok(db)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let db = Self::from_json(&content)?;
        debug!(
            "Loaded {} patterns from {}",
            db.len(),
            path.as_ref().display()
        );
        Ok(db)
    }

    /// Load, degrading to an empty database on any failure.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(db) => db,
            Err(e) => {
                warn!(
                    "Pattern database {} unavailable, continuing without patterns: {}",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        for (category, patterns) in &self.categories {
            for hex in patterns.keys() {
                if hex.is_empty() || ::hex::decode(hex).is_err() {
                    return Err(Error::PatternDatabase(format!(
                        "{}: invalid hex pattern {:?}",
                        category, hex
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, category: &str, hex: &str, description: &str) -> Result<()> {
        let hex = hex.to_ascii_lowercase();
        if hex.is_empty() || ::hex::decode(&hex).is_err() {
            return Err(Error::PatternDatabase(format!("invalid hex pattern {:?}", hex)));
        }
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(hex, description.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(category, pattern, description)` triple, in category order.
    pub fn entries(&self) -> Vec<PatternEntry> {
        self.categories
            .iter()
            .flat_map(|(category, patterns)| {
                patterns.iter().filter_map(move |(hex, description)| {
                    let hex = hex.to_ascii_lowercase();
                    let bytes = ::hex::decode(&hex).ok()?;
                    Some(PatternEntry {
                        category: category.clone(),
                        hex,
                        bytes,
                        description: description.clone(),
                    })
                })
            })
            .collect()
    }
}
