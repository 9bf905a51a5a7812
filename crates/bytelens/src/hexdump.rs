//! Classic hexdump rendering.
//!
//! ```text
//! 0x000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```
//!
//! When a state tracker is supplied, decoded bytes print as `..` in the hex
//! columns and a space in the ASCII gutter.

use std::fmt::Write;

use crate::state::{ByteState, ByteStateTracker};

const ROW: usize = 16;

pub fn render(bytes: &[u8], mask: Option<&ByteStateTracker>) -> String {
    let mut out = String::new();
    let decoded = |i: usize| mask.is_some_and(|m| i < m.len() && m.get(i) == ByteState::Decoded);

    for (row, chunk) in bytes.chunks(ROW).enumerate() {
        let base = row * ROW;
        let _ = write!(out, "0x{:03X}: ", base);

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                out.push(' ');
            }
            if decoded(base + j) {
                out.push_str(".. ");
            } else {
                let _ = write!(out, "{:02X} ", byte);
            }
        }
        for j in chunk.len()..ROW {
            if j == 8 {
                out.push(' ');
            }
            out.push_str("   ");
        }

        out.push_str(" |");
        for (j, byte) in chunk.iter().enumerate() {
            let c = if decoded(base + j) {
                ' '
            } else if (0x20..0x7F).contains(byte) {
                *byte as char
            } else {
                '.'
            };
            out.push(c);
        }
        for _ in chunk.len()..ROW {
            out.push(' ');
        }
        out.push_str("|\n");
    }

    out
}
