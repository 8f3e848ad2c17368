//! Signature Encoding and Decoding
//!
//! A signature travels as a 65-byte payload: r (32 bytes), s (32 bytes)
//! and the recovery byte v. On the wire it is a 130-character hex string
//! with an optional 0x prefix. Parsing splits at fixed offsets and never
//! reinterprets v; recovery id rules are applied at recovery time.

use super::types::Eip712Error;
use zeroize::Zeroize;

/// Errors from signature parsing, signing and recovery
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature: expected 130 hex chars, got {0}")]
    InvalidHexLength(usize),

    #[error("Invalid signature: expected 65 bytes, got {0}")]
    InvalidByteLength(usize),

    #[error("Invalid signature hex: {0}")]
    InvalidHex(String),

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error(transparent)]
    TypedData(#[from] Eip712Error),
}

/// EIP-712 signature components
#[derive(Debug, Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct Eip712Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// v component (recovery byte, canonically 27 or 28)
    pub v: u8,
}

impl Eip712Signature {
    /// Create from raw components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Parse from a hex string with optional 0x prefix
    ///
    /// The string must decode to exactly 65 bytes. Hex digits are accepted
    /// in either case. The v byte is carried through untouched, even when
    /// it is not a canonical 27 or 28.
    pub fn from_hex(sig: &str) -> Result<Self, SignatureError> {
        let stripped = sig
            .strip_prefix("0x")
            .or_else(|| sig.strip_prefix("0X"))
            .unwrap_or(sig);

        if stripped.len() != 130 {
            return Err(SignatureError::InvalidHexLength(stripped.len()));
        }

        let bytes =
            hex::decode(stripped).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Create from a 65-byte signature (r || s || v)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != 65 {
            return Err(SignatureError::InvalidByteLength(bytes.len()));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);
        let v = bytes[64];

        Ok(Self { r, s, v })
    }

    /// Convert to the 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Convert to a 0x-prefixed lowercase hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// The r component as a 0x-prefixed hex string, for wire payloads
    pub fn r_hex(&self) -> String {
        format!("0x{}", hex::encode(self.r))
    }

    /// The s component as a 0x-prefixed hex string, for wire payloads
    pub fn s_hex(&self) -> String {
        format!("0x{}", hex::encode(self.s))
    }
}
