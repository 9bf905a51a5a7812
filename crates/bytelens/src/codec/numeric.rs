//! Fixed-width integer and float readers.
//!
//! All readers return `None` when the value would run past the end of the
//! buffer, so callers never index out of bounds.

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}

pub fn read_u8(bytes: &[u8], offset: usize) -> Option<u8> {
    bytes.get(offset).copied()
}

pub fn read_u16_le(bytes: &[u8], offset: usize) -> Option<u16> {
    read_array(bytes, offset).map(u16::from_le_bytes)
}

pub fn read_u16_be(bytes: &[u8], offset: usize) -> Option<u16> {
    read_array(bytes, offset).map(u16::from_be_bytes)
}

pub fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    read_array(bytes, offset).map(u32::from_le_bytes)
}

pub fn read_i32_le(bytes: &[u8], offset: usize) -> Option<i32> {
    read_array(bytes, offset).map(i32::from_le_bytes)
}

pub fn read_u64_le(bytes: &[u8], offset: usize) -> Option<u64> {
    read_array(bytes, offset).map(u64::from_le_bytes)
}

pub fn read_f32_le(bytes: &[u8], offset: usize) -> Option<f32> {
    read_array(bytes, offset).map(f32::from_le_bytes)
}

pub fn read_f64_le(bytes: &[u8], offset: usize) -> Option<f64> {
    read_array(bytes, offset).map(f64::from_le_bytes)
}

/// Render a float for display; non-finite values get a stable label.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        format!("{}", value)
    }
}

/// Check if a number is a power of two
pub fn is_power_of_two(n: u64) -> bool {
    n > 0 && (n & (n - 1)) == 0
}
