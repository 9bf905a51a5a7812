//! Hex buffer parsing and formatting utilities.

use crate::error::{Error, Result};

/// Parse a hex buffer, ignoring whitespace and `0x` prefixes.
///
/// # Examples
///
/// ```
/// use bytelens::codec::hex::parse_hex_buffer;
///
/// assert_eq!(parse_hex_buffer("0x01 02").unwrap(), vec![1, 2]);
/// assert_eq!(parse_hex_buffer("0xDEAD 0xbeef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
/// ```
pub fn parse_hex_buffer(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .split_whitespace()
        .map(|chunk| chunk.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();

    if cleaned.len() % 2 != 0 {
        return Err(Error::InvalidHex(format!(
            "odd number of hex digits ({})",
            cleaned.len()
        )));
    }

    ::hex::decode(&cleaned).map_err(|e| Error::InvalidHex(e.to_string()))
}

/// Format an offset as a hex string with 0x prefix.
pub fn format_offset(offset: usize) -> String {
    format!("0x{:X}", offset)
}

/// Lowercase hex rendering used for discriminators and pattern matching.
pub fn to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}
