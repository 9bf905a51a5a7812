use std::sync::LazyLock;

use regex::Regex;

use super::constants::*;
use super::{Detector, ScanContext};
use crate::suggestion::{ByteRange, Suggestion, SuggestionKind};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
static HEX_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]+$").unwrap());
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?|wss?|ftp|ipfs|ar)://").unwrap());

fn is_printable(b: u8) -> bool {
    (32..=126).contains(&b)
}

/// Confidence for a printable run, or `None` if it is not text-like at all.
pub fn string_confidence(text: &str) -> Option<f64> {
    let len = text.chars().count();
    let letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if len < MIN_STRING_LEN || letters == 0 {
        return None;
    }
    if (letters as f64) / (len as f64) < MIN_LETTER_RATIO {
        return None;
    }

    let tokens: Vec<String> = text.split_whitespace().map(str::to_ascii_lowercase).collect();
    let known = tokens.iter().filter(|t| is_dictionary_word(t)).count();
    if known > 0 {
        return Some(0.7 + 0.2 * known as f64 / tokens.len() as f64);
    }

    let mut confidence = STRING_BASE_CONFIDENCE;
    if IDENTIFIER.is_match(text) {
        confidence = 0.65;
    }
    if HEX_STRING.is_match(text) {
        confidence = 0.6;
    }
    if EMAIL.is_match(text) {
        confidence = 0.95;
    }
    if URL.is_match(text) {
        confidence = 0.95;
    }
    Some(confidence)
}

/// Printable ASCII runs that look like words, identifiers, emails or URLs.
pub struct StringDetector;

impl Detector for StringDetector {
    fn name(&self) -> &'static str {
        "string"
    }

    fn scan(&self, ctx: &ScanContext<'_>) -> Vec<Suggestion> {
        let bytes = ctx.bytes;
        let mut found = Vec::new();
        let mut start = 0;

        while start < bytes.len() {
            let usable = |i: usize| ctx.state.is_free(i) && is_printable(bytes[i]);
            if bytes[start] == 0 || !usable(start) {
                start += 1;
                continue;
            }

            let mut end = start;
            while end < bytes.len() && end - start < MAX_STRING_LEN && usable(end) {
                end += 1;
            }

            // Printable bytes are ASCII, so this cannot fail
            if let Ok(text) = std::str::from_utf8(&bytes[start..end])
                && let Some(confidence) = string_confidence(text)
                && confidence > STRING_KEEP_ABOVE
            {
                found.push(Suggestion::new(
                    SuggestionKind::Text,
                    ByteRange::new(start, end),
                    text,
                    confidence,
                ));
            }
            start = end;
        }

        found
    }
}
