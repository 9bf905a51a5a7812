//! Base58 (Bitcoin/Solana alphabet) helpers on top of `bs58`.

use crate::error::{Error, Result};

pub const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length bounds of a base58-rendered 32-byte address
pub const ADDRESS_MIN_LEN: usize = 32;
pub const ADDRESS_MAX_LEN: usize = 44;

pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

pub fn decode(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| Error::InvalidBase58(format!("{}: {}", s, e)))
}

/// Strict alphabet check (no `0`, `O`, `I`, `l`, no whitespace).
pub fn is_strict_base58(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| ALPHABET.as_bytes().contains(&b))
}

/// Syntactic address check: alphabet plus 32..=44 characters.
pub fn is_plausible_address(s: &str) -> bool {
    (ADDRESS_MIN_LEN..=ADDRESS_MAX_LEN).contains(&s.len()) && is_strict_base58(s)
}

/// Decode an address, requiring exactly 32 bytes.
pub fn decode_address(s: &str) -> Result<[u8; 32]> {
    let s = s.trim();
    if !is_strict_base58(s) {
        return Err(Error::InvalidBase58(s.to_string()));
    }
    let bytes = decode(s)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| Error::InvalidAddressLength(len))
}
