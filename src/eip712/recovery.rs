//! ECDSA Signing and Signer Recovery
//!
//! Signing produces the r, s, v triple for an EIP-712 digest. Recovery
//! walks the same path backwards: rebuild the digest, recover the public
//! key, derive the address and compare it to the claim.
//!
//! The recovery id is v - 27 and must be 0 or 1. Anything else is
//! rejected before any curve work happens.

use super::codec::{Eip712Signature, SignatureError};
use super::hasher::hash_typed_data;
use super::types::TypedData;
use crate::utils::crypto::{addresses_equal, keccak256, to_checksum_address};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

/// Sign EIP-712 typed data
///
/// Returns a signature with r, s, v components where v is 27 or 28.
pub fn sign_typed_data(
    typed_data: &TypedData,
    private_key: &[u8],
) -> Result<Eip712Signature, SignatureError> {
    let hash = hash_typed_data(typed_data)?;
    sign_hash(&hash, private_key)
}

/// Sign a pre-computed 32-byte digest
pub fn sign_hash(hash: &[u8; 32], private_key: &[u8]) -> Result<Eip712Signature, SignatureError> {
    if private_key.len() != 32 {
        return Err(SignatureError::SigningFailed(format!(
            "invalid private key length: expected 32, got {}",
            private_key.len()
        )));
    }

    let secp = Secp256k1::new();

    let secret_key = SecretKey::from_slice(private_key)
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;

    let message = Message::from_digest_slice(hash)
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;

    let (recovery_id, signature) = secp
        .sign_ecdsa_recoverable(&message, &secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[0..32]);
    s.copy_from_slice(&signature[32..64]);

    // v is recovery_id + 27 (Ethereum convention)
    let v = recovery_id.to_i32() as u8 + 27;

    Ok(Eip712Signature::new(r, s, v))
}

/// Verify an EIP-712 signature against a claimed signer
///
/// Recomputes the digest from the typed data, recovers the signer and
/// compares addresses case-insensitively. Returns false on mismatch;
/// structural problems (bad schema, non-canonical v) surface as errors.
pub fn verify_typed_data(
    typed_data: &TypedData,
    signature: &Eip712Signature,
    claimed_signer: &str,
) -> Result<bool, SignatureError> {
    let hash = hash_typed_data(typed_data)?;
    verify_signature(&hash, signature, claimed_signer)
}

/// Verify a signature against a digest and claimed signer address
pub fn verify_signature(
    hash: &[u8; 32],
    signature: &Eip712Signature,
    claimed_signer: &str,
) -> Result<bool, SignatureError> {
    let recovered = recover_address(hash, signature)?;
    Ok(addresses_equal(&recovered, claimed_signer))
}

/// Recover the checksummed signer address from a digest and signature
pub fn recover_address(
    hash: &[u8; 32],
    signature: &Eip712Signature,
) -> Result<String, SignatureError> {
    let secp = Secp256k1::new();

    // v must map to recovery id 0 or 1; nothing else reaches the curve
    let rec_id = signature
        .v
        .checked_sub(27)
        .filter(|id| *id <= 1)
        .ok_or(SignatureError::InvalidRecoveryId(signature.v))?;

    let recovery_id = RecoveryId::from_i32(rec_id as i32)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[0..32].copy_from_slice(&signature.r);
    sig_bytes[32..64].copy_from_slice(&signature.s);

    let recoverable_sig = RecoverableSignature::from_compact(&sig_bytes, recovery_id)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    let message = Message::from_digest_slice(hash)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    let public_key = secp
        .recover_ecdsa(&message, &recoverable_sig)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    Ok(to_checksum_address(&public_key_to_address(&public_key)))
}

/// Derive the checksummed address for a 32-byte private key
pub fn address_from_private_key(private_key: &[u8]) -> Result<String, SignatureError> {
    let secp = Secp256k1::new();

    let secret_key = SecretKey::from_slice(private_key)
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);

    Ok(to_checksum_address(&public_key_to_address(&public_key)))
}

/// Convert a secp256k1 public key to an Ethereum address
///
/// keccak256 of the 64-byte uncompressed point (0x04 prefix dropped),
/// then the last 20 bytes.
fn public_key_to_address(public_key: &PublicKey) -> [u8; 20] {
    let pubkey_bytes = public_key.serialize_uncompressed();
    let hash = keccak256(&pubkey_bytes[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    address
}

#[cfg(test)]
mod recovery_tests {
    use super::*;

    // Well-known development key, never holds funds
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn create_test_typed_data() -> TypedData {
        let json = r#"{
            "types": {
                "EIP712Domain": [
                    {"name": "name", "type": "string"},
                    {"name": "version", "type": "string"},
                    {"name": "chainId", "type": "uint256"},
                    {"name": "verifyingContract", "type": "address"}
                ],
                "Person": [
                    {"name": "name", "type": "string"},
                    {"name": "wallet", "type": "address"}
                ],
                "Mail": [
                    {"name": "from", "type": "Person"},
                    {"name": "to", "type": "Person"},
                    {"name": "contents", "type": "string"}
                ]
            },
            "primaryType": "Mail",
            "domain": {
                "name": "Ether Mail",
                "version": "1",
                "chainId": 1,
                "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
            },
            "message": {
                "from": {
                    "name": "Cow",
                    "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
                },
                "to": {
                    "name": "Bob",
                    "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"
                },
                "contents": "Hello, Bob!"
            }
        }"#;

        TypedData::from_json(json).unwrap()
    }

    #[test]
    fn test_sign_and_recover_known_key() {
        let typed_data = create_test_typed_data();
        let private_key = hex::decode(TEST_PRIVATE_KEY).unwrap();

        let signature = sign_typed_data(&typed_data, &private_key).unwrap();
        assert!(signature.v == 27 || signature.v == 28);

        let hash = hash_typed_data(&typed_data).unwrap();
        let recovered = recover_address(&hash, &signature).unwrap();
        assert!(addresses_equal(&recovered, TEST_ADDRESS));

        let valid = verify_typed_data(&typed_data, &signature, TEST_ADDRESS).unwrap();
        assert!(valid);
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let typed_data = create_test_typed_data();
        let private_key = hex::decode(TEST_PRIVATE_KEY).unwrap();
        let signature = sign_typed_data(&typed_data, &private_key).unwrap();

        let lower = TEST_ADDRESS.to_lowercase();
        let upper = format!("0x{}", TEST_ADDRESS[2..].to_uppercase());

        assert!(verify_typed_data(&typed_data, &signature, &lower).unwrap());
        assert!(verify_typed_data(&typed_data, &signature, &upper).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_signer() {
        let typed_data = create_test_typed_data();
        let private_key = hex::decode(TEST_PRIVATE_KEY).unwrap();
        let signature = sign_typed_data(&typed_data, &private_key).unwrap();

        let other = "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB";
        assert!(!verify_typed_data(&typed_data, &signature, other).unwrap());
    }

    #[test]
    fn test_recover_rejects_non_canonical_v() {
        let typed_data = create_test_typed_data();
        let private_key = hex::decode(TEST_PRIVATE_KEY).unwrap();
        let signature = sign_typed_data(&typed_data, &private_key).unwrap();
        let hash = hash_typed_data(&typed_data).unwrap();

        for bad_v in [0u8, 1, 2, 26, 29, 255] {
            let mut tampered = signature.clone();
            tampered.v = bad_v;
            let err = recover_address(&hash, &tampered).unwrap_err();
            assert_eq!(err, SignatureError::InvalidRecoveryId(bad_v));
        }
    }

    #[test]
    fn test_different_digest_recovers_different_address() {
        let typed_data = create_test_typed_data();
        let private_key = hex::decode(TEST_PRIVATE_KEY).unwrap();
        let signature = sign_typed_data(&typed_data, &private_key).unwrap();

        let other_hash = keccak256(b"some other digest");
        // Recovery yields a valid point for most digests, just not the signer
        if let Ok(recovered) = recover_address(&other_hash, &signature) {
            assert!(!addresses_equal(&recovered, TEST_ADDRESS));
        }
    }

    #[test]
    fn test_sign_hash_rejects_bad_key_length() {
        let hash = [0x42u8; 32];
        let err = sign_hash(&hash, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, SignatureError::SigningFailed(_)));
    }

    #[test]
    fn test_address_from_private_key() {
        let private_key = hex::decode(TEST_PRIVATE_KEY).unwrap();
        let address = address_from_private_key(&private_key).unwrap();
        assert_eq!(address, TEST_ADDRESS);
    }
}
