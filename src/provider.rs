//! Wallet Providers
//!
//! Signing is done through the `WalletProvider` trait so the pipeline never
//! assumes a particular wallet. `LocalWallet` signs with an in-process key;
//! a remote or hardware-backed provider plugs in the same way. Providers
//! can refuse to sign, which callers must treat as a normal outcome.

use crate::eip191::personal_sign;
use crate::eip712::{
    address_from_private_key, sign_typed_data, Eip712Signature, SignatureError, TypedData,
};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

/// Errors a wallet provider can produce
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("User rejected the signing request")]
    UserRejected,

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Provider failure: {0}")]
    Failed(String),
}

/// A wallet that can report its address and sign payloads
pub trait WalletProvider {
    /// The checksummed address this provider signs as
    fn address(&self) -> Result<String, ProviderError>;

    /// Sign an EIP-712 typed data payload
    fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Eip712Signature, ProviderError>;

    /// Sign a raw message with the EIP-191 personal_sign prefix
    fn sign_personal(&self, message: &[u8]) -> Result<Eip712Signature, ProviderError>;
}

/// In-process wallet holding a secp256k1 private key
///
/// The key is wiped from memory when the wallet is dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct LocalWallet {
    private_key: [u8; 32],
    #[zeroize(skip)]
    address: String,
}

impl LocalWallet {
    /// Create a wallet from a raw 32-byte private key
    pub fn new(private_key: [u8; 32]) -> Result<Self, ProviderError> {
        let address = address_from_private_key(&private_key)
            .map_err(|e| ProviderError::InvalidKey(e.to_string()))?;

        Ok(Self {
            private_key,
            address,
        })
    }

    /// Create a wallet from a hex-encoded private key, 0x prefix optional
    pub fn from_hex(key_hex: &str) -> Result<Self, ProviderError> {
        let stripped = key_hex
            .strip_prefix("0x")
            .or_else(|| key_hex.strip_prefix("0X"))
            .unwrap_or(key_hex);

        let bytes = hex::decode(stripped)
            .map_err(|e| ProviderError::InvalidKey(format!("invalid hex: {}", e)))?;

        if bytes.len() != 32 {
            return Err(ProviderError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Self::new(key)
    }

    /// Generate a wallet from operating system entropy
    pub fn random() -> Self {
        let mut rng = OsRng;
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            // from_slice rejects zero and out-of-range keys
            if let Ok(wallet) = Self::new(bytes) {
                return wallet;
            }
        }
    }

    /// Hex encoding of the signing key, for export by the keygen command
    pub fn key_hex(&self) -> String {
        hex::encode(self.private_key)
    }
}

impl WalletProvider for LocalWallet {
    fn address(&self) -> Result<String, ProviderError> {
        Ok(self.address.clone())
    }

    fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Eip712Signature, ProviderError> {
        Ok(sign_typed_data(typed_data, &self.private_key)?)
    }

    fn sign_personal(&self, message: &[u8]) -> Result<Eip712Signature, ProviderError> {
        Ok(personal_sign(message, &self.private_key)?)
    }
}

/// A provider that refuses every signing request
///
/// Stands in for a wallet whose user declined, so the rejection path can
/// be exercised without a real wallet.
pub struct RejectingProvider {
    address: String,
}

impl RejectingProvider {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl WalletProvider for RejectingProvider {
    fn address(&self) -> Result<String, ProviderError> {
        Ok(self.address.clone())
    }

    fn sign_typed_data(&self, _typed_data: &TypedData) -> Result<Eip712Signature, ProviderError> {
        Err(ProviderError::UserRejected)
    }

    fn sign_personal(&self, _message: &[u8]) -> Result<Eip712Signature, ProviderError> {
        Err(ProviderError::UserRejected)
    }
}
