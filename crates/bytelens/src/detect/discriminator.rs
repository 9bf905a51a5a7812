use super::constants::{DISCRIMINATOR_CONFIDENCE, DISCRIMINATOR_LEN};
use super::{Detector, ScanContext};
use crate::codec::hex::to_hex;
use crate::suggestion::{ByteRange, Suggestion, SuggestionKind};

/// 8-byte type tag at the start of account data.
pub struct DiscriminatorDetector;

impl Detector for DiscriminatorDetector {
    fn name(&self) -> &'static str {
        "discriminator"
    }

    fn scan(&self, ctx: &ScanContext<'_>) -> Vec<Suggestion> {
        if !ctx.is_account_data || !ctx.is_free(0, DISCRIMINATOR_LEN) {
            return Vec::new();
        }
        vec![Suggestion::new(
            SuggestionKind::Discriminator,
            ByteRange::new(0, DISCRIMINATOR_LEN),
            to_hex(&ctx.bytes[..DISCRIMINATOR_LEN]),
            DISCRIMINATOR_CONFIDENCE,
        )]
    }
}
