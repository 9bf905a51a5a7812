//! Pure byte codecs: numeric readers, base58 and hex.

pub mod base58;
pub mod hex;
pub mod numeric;
