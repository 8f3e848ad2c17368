//! Shared Crypto Helpers
//!
//! Keccak-256 and EIP-55 address checksumming, used by the encoder,
//! recovery, and wire layers alike.

use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Convert raw 20-byte address bytes to an EIP-55 checksummed address string
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// Case-insensitive address equality, tolerant of a missing 0x prefix
pub fn addresses_equal(a: &str, b: &str) -> bool {
    let norm = |s: &str| s.trim_start_matches("0x").trim_start_matches("0X").to_lowercase();
    norm(a) == norm(b)
}
