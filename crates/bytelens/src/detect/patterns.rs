use memchr::memmem;

use super::constants::{
    PATTERN_CONSTANT_CONFIDENCE, PATTERN_DEFAULT_CONFIDENCE, PATTERN_DISCRIMINATOR_CONFIDENCE,
};
use super::{Detector, ScanContext};
use crate::patterns::{CATEGORY_CONSTANTS, CATEGORY_DISCRIMINATORS, PatternDatabase, PatternEntry};
use crate::suggestion::{ByteRange, Suggestion, SuggestionKind};

/// Known byte sequences from the pattern database.
pub struct PatternDetector {
    entries: Vec<PatternEntry>,
}

impl PatternDetector {
    pub fn new(db: PatternDatabase) -> Self {
        Self {
            entries: db.entries(),
        }
    }

    fn confidence(category: &str) -> f64 {
        match category {
            CATEGORY_DISCRIMINATORS => PATTERN_DISCRIMINATOR_CONFIDENCE,
            CATEGORY_CONSTANTS => PATTERN_CONSTANT_CONFIDENCE,
            _ => PATTERN_DEFAULT_CONFIDENCE,
        }
    }
}

impl Detector for PatternDetector {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn scan(&self, ctx: &ScanContext<'_>) -> Vec<Suggestion> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let runs = ctx.state.free_runs();
        let mut found = Vec::new();

        for entry in &self.entries {
            let finder = memmem::Finder::new(&entry.bytes);
            for run in &runs {
                for pos in finder.find_iter(&ctx.bytes[run.clone()]) {
                    let start = run.start + pos;
                    found.push(Suggestion::new(
                        SuggestionKind::Pattern(entry.category.clone()),
                        ByteRange::with_len(start, entry.bytes.len()),
                        format!("{} ({})", entry.description, entry.hex),
                        Self::confidence(&entry.category),
                    ));
                }
            }
        }

        found
    }
}
