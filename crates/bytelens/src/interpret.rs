//! On-demand readings for a user selection.
//!
//! Unlike the detectors this is not a scan: given the selected indices it
//! produces one reading per applicable width, always anchored at the first
//! selected byte.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::base58;
use crate::codec::numeric::{
    format_float, read_f32_le, read_f64_le, read_i32_le, read_u8, read_u16_be, read_u16_le,
    read_u32_le, read_u64_le,
};
use crate::detect::constants::SELECTION_TIMESTAMP_YEARS;
use crate::detect::timestamp_confidence;
use crate::error::{Error, Result};
use crate::suggestion::ByteRange;
use crate::verify::KEY_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationKind {
    U8,
    Bool,
    OptionTag,
    BumpSeed,
    U16Le,
    U16Be,
    U32,
    I32,
    F32,
    Timestamp,
    U64,
    F64,
    PublicKey,
}

impl InterpretationKind {
    pub fn width(&self) -> usize {
        match self {
            Self::U8 | Self::Bool | Self::OptionTag | Self::BumpSeed => 1,
            Self::U16Le | Self::U16Be => 2,
            Self::U32 | Self::I32 | Self::F32 | Self::Timestamp => 4,
            Self::U64 | Self::F64 => 8,
            Self::PublicKey => KEY_LEN,
        }
    }
}

impl fmt::Display for InterpretationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::U8 => "u8",
            Self::Bool => "bool",
            Self::OptionTag => "Option",
            Self::BumpSeed => "bump seed",
            Self::U16Le => "u16 (LE)",
            Self::U16Be => "u16 (BE)",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::Timestamp => "Timestamp",
            Self::U64 => "u64",
            Self::F64 => "f64",
            Self::PublicKey => "PublicKey",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub kind: InterpretationKind,
    pub range: ByteRange,
    pub value: String,
}

impl Interpretation {
    pub fn new(kind: InterpretationKind, range: ByteRange, value: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            value: value.into(),
        }
    }
}

fn format_f32(value: f32) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        format_float(f64::from(value))
    }
}

/// Readings for the bytes at `indices` (ascending, distinct).
///
/// Returns an empty list for an empty selection.
pub fn interpret(bytes: &[u8], indices: &[usize], now: DateTime<Utc>) -> Result<Vec<Interpretation>> {
    if indices.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidSelection(
            "indices must be ascending and distinct".to_string(),
        ));
    }
    if let Some(&last) = indices.last()
        && last >= bytes.len()
    {
        return Err(Error::RangeOutOfBounds {
            start: indices[0],
            end: last + 1,
            len: bytes.len(),
        });
    }

    let selected: Vec<u8> = indices.iter().map(|&i| bytes[i]).collect();
    let k = selected.len();
    let mut readings = Vec::new();
    if k == 0 {
        return Ok(readings);
    }

    let range = |width: usize| ByteRange::new(indices[0], indices[width - 1] + 1);
    let mut push = |kind: InterpretationKind, value: String| {
        readings.push(Interpretation::new(kind, range(kind.width()), value));
    };

    if let Some(byte) = read_u8(&selected, 0) {
        push(InterpretationKind::U8, byte.to_string());
        if byte <= 1 {
            let (flag, tag) = if byte == 1 { ("true", "Some") } else { ("false", "None") };
            push(InterpretationKind::Bool, flag.to_string());
            push(InterpretationKind::OptionTag, tag.to_string());
        }
        if byte >= 252 {
            push(InterpretationKind::BumpSeed, byte.to_string());
        }
    }

    if let (Some(le), Some(be)) = (read_u16_le(&selected, 0), read_u16_be(&selected, 0)) {
        push(InterpretationKind::U16Le, le.to_string());
        push(InterpretationKind::U16Be, be.to_string());
    }

    if let (Some(unsigned), Some(signed), Some(float)) = (
        read_u32_le(&selected, 0),
        read_i32_le(&selected, 0),
        read_f32_le(&selected, 0),
    ) {
        push(InterpretationKind::U32, unsigned.to_string());
        push(InterpretationKind::I32, signed.to_string());
        push(InterpretationKind::F32, format_f32(float));

        let secs = i64::from(unsigned);
        if timestamp_confidence(secs, now, SELECTION_TIMESTAMP_YEARS).is_some()
            && let Some(dt) = DateTime::from_timestamp(secs, 0)
        {
            push(InterpretationKind::Timestamp, dt.to_rfc3339());
        }
    }

    if let (Some(unsigned), Some(float)) = (read_u64_le(&selected, 0), read_f64_le(&selected, 0)) {
        push(InterpretationKind::U64, unsigned.to_string());
        push(InterpretationKind::F64, format_float(float));
    }

    if k == KEY_LEN {
        push(InterpretationKind::PublicKey, base58::encode(&selected));
    }

    Ok(readings)
}
