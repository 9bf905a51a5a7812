use super::ScanContext;
use crate::verify::{KEY_LEN, KeyCandidate};

/// 32-byte windows that could be addresses.
///
/// Windows sit on a 32-byte grid from the start of the buffer, for raw hex
/// and account data alike.
pub struct PublicKeyDetector;

impl PublicKeyDetector {
    pub fn candidates(&self, ctx: &ScanContext<'_>) -> Vec<KeyCandidate> {
        (0..ctx.bytes.len())
            .step_by(KEY_LEN)
            .filter(|&offset| ctx.is_free(offset, KEY_LEN))
            .filter_map(|offset| {
                KeyCandidate::from_window(offset, &ctx.bytes[offset..offset + KEY_LEN])
            })
            .collect()
    }
}
