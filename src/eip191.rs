//! Ethereum Personal Message Signing (EIP-191)
//!
//! Implements personal_sign on top of the same signing and recovery
//! primitives the typed data path uses; only the digest differs.
//! Reference: https://eips.ethereum.org/EIPS/eip-191
//!
//! Format: "\x19Ethereum Signed Message:\n" + len(message) + message

use crate::eip712::{recover_address, sign_hash, verify_signature, Eip712Signature, SignatureError};
use crate::utils::crypto::keccak256;

/// Ethereum message prefix for personal_sign
const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hash a message with the Ethereum personal sign prefix
pub fn personal_sign_hash(message: &[u8]) -> [u8; 32] {
    let prefix = format!("{}{}", ETH_MESSAGE_PREFIX, message.len());
    let mut data = Vec::with_capacity(prefix.len() + message.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Sign a message using Ethereum personal_sign
///
/// Returns a recoverable signature with r, s, v components.
pub fn personal_sign(
    message: &[u8],
    private_key: &[u8],
) -> Result<Eip712Signature, SignatureError> {
    let hash = personal_sign_hash(message);
    sign_hash(&hash, private_key)
}

/// Sign a hex-encoded message (with or without 0x prefix)
pub fn personal_sign_hex(
    hex_message: &str,
    private_key: &[u8],
) -> Result<Eip712Signature, SignatureError> {
    let message = hex::decode(hex_message.trim_start_matches("0x"))
        .map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
    personal_sign(&message, private_key)
}

/// Recover the checksummed signer address from a personal_sign signature
pub fn recover_personal_signer(
    message: &[u8],
    signature: &Eip712Signature,
) -> Result<String, SignatureError> {
    let hash = personal_sign_hash(message);
    recover_address(&hash, signature)
}

/// Verify a personal_sign signature against a claimed signer
pub fn verify_personal_sign(
    message: &[u8],
    signature: &Eip712Signature,
    claimed_signer: &str,
) -> Result<bool, SignatureError> {
    let hash = personal_sign_hash(message);
    verify_signature(&hash, signature, claimed_signer)
}
