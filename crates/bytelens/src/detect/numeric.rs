use chrono::{DateTime, Utc};

use super::constants::*;
use super::{Detector, ScanContext};
use crate::codec::numeric::{is_power_of_two, read_i32_le, read_u32_le, read_u64_le};
use crate::suggestion::{ByteRange, Suggestion, SuggestionKind};

/// Confidence for `secs` as a Unix timestamp, if it is plausible at all.
///
/// Plausible means strictly inside 2000..2100 and no more than `years`
/// away from `now`.
pub fn timestamp_confidence(secs: i64, now: DateTime<Utc>, years: i64) -> Option<f64> {
    if secs <= TIMESTAMP_MIN || secs >= TIMESTAMP_MAX {
        return None;
    }
    if (secs - now.timestamp()).abs() > years * SECONDS_PER_YEAR {
        return None;
    }
    let confidence = if secs % 3600 == 0 {
        TIMESTAMP_WHOLE_HOUR_CONFIDENCE
    } else if secs % 60 == 0 {
        TIMESTAMP_WHOLE_MINUTE_CONFIDENCE
    } else {
        TIMESTAMP_CONFIDENCE
    };
    Some(confidence)
}

pub(crate) fn format_timestamp(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => format!("{} ({})", secs, dt.format("%Y-%m-%d %H:%M:%S UTC")),
        None => secs.to_string(),
    }
}

/// Special, round, repeated-digit, timestamp and power-of-two values in
/// 4-byte windows; special and round values in 8-byte windows.
pub struct NumericDetector;

impl NumericDetector {
    fn classify_u32(window: &[u8], now: DateTime<Utc>) -> Option<(SuggestionKind, String, f64)> {
        let unsigned = read_u32_le(window, 0)?;
        let signed = read_i32_le(window, 0)?;
        let value = u64::from(unsigned);

        if signed < 0 && SPECIAL_SIGNED.contains(&signed) {
            return Some((SuggestionKind::I32, signed.to_string(), SPECIAL_CONFIDENCE));
        }
        if is_special(value) {
            return Some((SuggestionKind::U32, value.to_string(), SPECIAL_CONFIDENCE));
        }
        if is_round(value) {
            return Some((SuggestionKind::U32, value.to_string(), ROUND_CONFIDENCE));
        }
        if is_repeated_digit(value) {
            return Some((SuggestionKind::U32, value.to_string(), REPEATED_CONFIDENCE));
        }
        let secs = i64::from(unsigned);
        if let Some(confidence) = timestamp_confidence(secs, now, DETECTOR_TIMESTAMP_YEARS) {
            return Some((SuggestionKind::Timestamp, format_timestamp(secs), confidence));
        }
        if value > 1 && value <= MAX_POWER_OF_TWO && is_power_of_two(value) {
            return Some((SuggestionKind::U32, value.to_string(), POWER_OF_TWO_CONFIDENCE));
        }
        None
    }

    fn classify_u64(window: &[u8]) -> Option<(SuggestionKind, String, f64)> {
        let value = read_u64_le(window, 0)?;
        (is_special(value) || is_round(value))
            .then(|| (SuggestionKind::U64, value.to_string(), WIDE_CONFIDENCE))
    }
}

impl Detector for NumericDetector {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn scan(&self, ctx: &ScanContext<'_>) -> Vec<Suggestion> {
        let mut found = Vec::new();

        for width in [4usize, 8] {
            if ctx.bytes.len() < width {
                continue;
            }
            for offset in 0..=ctx.bytes.len() - width {
                let window = &ctx.bytes[offset..offset + width];
                if window.iter().all(|&b| b == 0) || !ctx.is_free(offset, width) {
                    continue;
                }
                let classified = if width == 4 {
                    Self::classify_u32(window, ctx.now)
                } else {
                    Self::classify_u64(window)
                };
                if let Some((kind, value, confidence)) = classified {
                    found.push(Suggestion::new(
                        kind,
                        ByteRange::with_len(offset, width),
                        value,
                        confidence,
                    ));
                }
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex::parse_hex_buffer;
    use crate::state::ByteStateTracker;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn scan(bytes: &[u8]) -> Vec<Suggestion> {
        let state = ByteStateTracker::new(bytes.len());
        NumericDetector.scan(&ScanContext {
            bytes,
            state: &state,
            is_account_data: false,
            now: now(),
        })
    }

    #[test]
    fn test_u64_one() {
        let bytes = parse_hex_buffer("0100000000000000").unwrap();
        let found = scan(&bytes);

        let wide: Vec<_> = found.iter().filter(|s| s.kind == SuggestionKind::U64).collect();
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0].value, "1");
        assert_eq!(wide[0].range, ByteRange::new(0, 8));
        assert_eq!(wide[0].confidence, 0.8);

        // No other reading claims the full 8 bytes
        assert!(found
            .iter()
            .filter(|s| s.range == ByteRange::new(0, 8))
            .all(|s| s.kind == SuggestionKind::U64));
    }

    #[test]
    fn test_round_thousand_is_not_a_timestamp() {
        let found = scan(&[0xE8, 0x03, 0x00, 0x00]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, SuggestionKind::U32);
        assert_eq!(found[0].value, "1000");
        assert!(found[0].confidence >= 0.8);
    }

    #[test]
    fn test_priority_order() {
        let cases: [(u32, SuggestionKind, f64); 4] = [
            (86_400, SuggestionKind::U32, 0.9),
            (100_000, SuggestionKind::U32, 0.8),
            (22_222, SuggestionKind::U32, 0.75),
            (4_096, SuggestionKind::U32, 0.7),
        ];
        for (value, kind, confidence) in cases {
            let found = scan(&value.to_le_bytes());
            assert_eq!(found.len(), 1, "value {}", value);
            assert_eq!(found[0].kind, kind);
            assert_eq!(found[0].confidence, confidence, "value {}", value);
        }
    }

    #[test]
    fn test_negative_sentinel() {
        let found = scan(&(-1i32).to_le_bytes());
        assert_eq!(found[0].kind, SuggestionKind::I32);
        assert_eq!(found[0].value, "-1");
        assert_eq!(found[0].confidence, 0.9);
    }

    #[test]
    fn test_timestamp_confidence_steps() {
        // 2025-06-01T10:00:00Z
        let hour = 1_748_772_000u32;
        let found = scan(&hour.to_le_bytes());
        assert_eq!(found[0].kind, SuggestionKind::Timestamp);
        assert_eq!(found[0].confidence, 0.9);
        assert!(found[0].value.contains("2025-06-01 10:00:00 UTC"));

        assert_eq!(scan(&(hour + 60).to_le_bytes())[0].confidence, 0.85);
        assert_eq!(scan(&(hour + 61).to_le_bytes())[0].confidence, 0.75);
    }

    #[test]
    fn test_timestamp_must_be_near_now() {
        // 2005, inside 2000..2100 but more than five years ago
        assert_eq!(timestamp_confidence(1_104_537_600, now(), 5), None);
        assert!(timestamp_confidence(1_104_537_600, now(), 100).is_some());
        assert_eq!(timestamp_confidence(946_684_800, now(), 100), None);
    }

    #[test]
    fn test_power_of_two_bounds() {
        assert!(scan(&2u32.to_le_bytes()).iter().any(|s| s.confidence == 0.7));
        assert!(scan(&(1u32 << 21).to_le_bytes()).is_empty());
    }

    #[test]
    fn test_windows_slide_one_byte() {
        let mut bytes = vec![0xABu8];
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        let found = scan(&bytes);
        assert!(found.iter().any(|s| s.range == ByteRange::new(1, 5) && s.value == "1000"));
    }
}
