//! Value tables and thresholds for the heuristic detectors
//!
//! # Numeric classes
//!
//! A 4-byte window is classified by the first class that matches:
//!
//! ```text
//!   special value   0.90   sentinels, type limits, well-known constants
//!   round decimal   0.80   10, 100, 1000, ...
//!   repeated digit  0.75   111, 2222, 55555, ...
//!   timestamp       0.75   +0.10 if seconds == 0, 0.90 if minutes also 0
//!   power of two    0.70   2..=1048576
//! ```
//!
//! 8-byte windows only use the first two classes, always at 0.80.

// ============================================================================
// Confidences
// ============================================================================

pub const DISCRIMINATOR_CONFIDENCE: f64 = 0.95;

pub const SPECIAL_CONFIDENCE: f64 = 0.9;
pub const ROUND_CONFIDENCE: f64 = 0.8;
pub const REPEATED_CONFIDENCE: f64 = 0.75;
pub const TIMESTAMP_CONFIDENCE: f64 = 0.75;
pub const TIMESTAMP_WHOLE_MINUTE_CONFIDENCE: f64 = 0.85;
pub const TIMESTAMP_WHOLE_HOUR_CONFIDENCE: f64 = 0.9;
pub const POWER_OF_TWO_CONFIDENCE: f64 = 0.7;
pub const WIDE_CONFIDENCE: f64 = 0.8;

pub const PATTERN_DISCRIMINATOR_CONFIDENCE: f64 = 0.95;
pub const PATTERN_CONSTANT_CONFIDENCE: f64 = 0.85;
pub const PATTERN_DEFAULT_CONFIDENCE: f64 = 0.8;

// ============================================================================
// Numeric tables
// ============================================================================

/// Discriminator length at the start of account data
pub const DISCRIMINATOR_LEN: usize = 8;

/// Unsigned values worth flagging on sight
pub const SPECIAL_VALUES: &[u64] = &[
    1,
    0xFF,
    0x100,
    0xFFFF,
    0x1_0000,
    60,
    3_600,
    86_400,
    604_800,
    31_536_000,
    1_000_000_000, // lamports per SOL
    0x7FFF_FFFF,
    0xFFFF_FFFF,
    0xDEAD_BEEF,
    0xCAFE_BABE,
    0x7FFF_FFFF_FFFF_FFFF,
    u64::MAX,
];

/// Negative 32-bit sentinels
pub const SPECIAL_SIGNED: &[i32] = &[-1, i32::MIN];

/// Powers of ten from 10 up to 10^18
pub const ROUND_VALUES: &[u64] = &[
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// Shortest repeated-digit run that counts (111, not 11)
pub const MIN_REPEATED_DIGITS: usize = 3;

/// Upper bound for the power-of-two class
pub const MAX_POWER_OF_TWO: u64 = 1 << 20;

// ============================================================================
// Timestamps
// ============================================================================

/// 2000-01-01T00:00:00Z
pub const TIMESTAMP_MIN: i64 = 946_684_800;
/// 2100-01-01T00:00:00Z
pub const TIMESTAMP_MAX: i64 = 4_102_444_800;

/// Average Gregorian year in seconds
pub const SECONDS_PER_YEAR: i64 = 31_556_952;

/// Distance from "now" the background scan tolerates
pub const DETECTOR_TIMESTAMP_YEARS: i64 = 5;
/// Distance from "now" the selection interpreter tolerates
pub const SELECTION_TIMESTAMP_YEARS: i64 = 100;

// ============================================================================
// Strings
// ============================================================================

pub const MIN_STRING_LEN: usize = 3;
pub const MAX_STRING_LEN: usize = 128;
pub const MIN_LETTER_RATIO: f64 = 0.6;
pub const STRING_BASE_CONFIDENCE: f64 = 0.5;
pub const STRING_KEEP_ABOVE: f64 = 0.6;

/// Common words and identifiers seen in on-chain records
pub const DICTIONARY: &[&str] = &[
    "account", "admin", "amount", "authority", "balance", "bump", "collection", "config",
    "creator", "data", "decimals", "error", "fee", "hello", "id", "info", "key", "market",
    "metadata", "mint", "name", "nft", "none", "null", "order", "owner", "pool", "price",
    "program", "reward", "seed", "solana", "stake", "state", "success", "supply", "symbol",
    "test", "the", "token", "true", "false", "type", "uri", "user", "value", "vault",
    "version", "world",
];

pub fn is_special(value: u64) -> bool {
    SPECIAL_VALUES.contains(&value)
}

pub fn is_round(value: u64) -> bool {
    ROUND_VALUES.contains(&value)
}

/// 111, 2222, 99999 and so on (decimal, one digit repeated).
pub fn is_repeated_digit(value: u64) -> bool {
    let digits = value.to_string();
    let bytes = digits.as_bytes();
    bytes.len() >= MIN_REPEATED_DIGITS && bytes[0] != b'0' && bytes.iter().all(|&b| b == bytes[0])
}

pub fn is_dictionary_word(token: &str) -> bool {
    DICTIONARY.contains(&token)
}
