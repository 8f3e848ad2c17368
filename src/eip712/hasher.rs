//! EIP-712 Hashing
//!
//! Implements domain separator and struct hashing for EIP-712.

use super::encoder::{encode_struct, encode_value};
use super::types::*;
use crate::utils::crypto::keccak256;
use std::collections::HashMap;

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// Calculate the domain separator hash
///
/// domainSeparator = hashStruct(eip712Domain)
///
/// The domain goes through the same struct encoder as the message, with
/// an `EIP712Domain` type entry taken from the caller's declaration or
/// derived from the populated domain fields.
pub fn domain_separator(
    domain: &Eip712Domain,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<[u8; 32], Eip712Error> {
    let domain_fields = domain_type_fields(domain, types);

    let mut types_with_domain = types.clone();
    types_with_domain.insert("EIP712Domain".to_string(), domain_fields);

    let domain_value =
        serde_json::to_value(domain).map_err(|e| Eip712Error::InvalidJson(e.to_string()))?;

    let encoded = encode_struct("EIP712Domain", &domain_value, &types_with_domain)?;
    Ok(keccak256(&encoded))
}

/// Hash a struct according to EIP-712
///
/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(
    type_name: &str,
    data: &serde_json::Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<[u8; 32], Eip712Error> {
    let encoded = encode_value(type_name, data, types)?;
    Ok(keccak256(&encoded))
}

/// Calculate the final EIP-712 hash for signing
///
/// hash = keccak256("\x19\x01" || domainSeparator || hashStruct(message))
pub fn hash_typed_data(typed_data: &TypedData) -> Result<[u8; 32], Eip712Error> {
    // Validate the typed data first
    typed_data.validate()?;

    // Calculate domain separator
    let domain_sep = domain_separator(&typed_data.domain, &typed_data.types)?;

    // Calculate struct hash
    let struct_hash = hash_struct(
        &typed_data.primary_type,
        &typed_data.message,
        &typed_data.types,
    )?;

    // Concatenate and hash
    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(&domain_sep);
    data.extend_from_slice(&struct_hash);

    Ok(keccak256(&data))
}

/// The pre-image components (for external signing)
pub struct Eip712PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub final_hash: [u8; 32],
}

/// Calculate the pre-image components for EIP-712
pub fn get_pre_image(typed_data: &TypedData) -> Result<Eip712PreImage, Eip712Error> {
    typed_data.validate()?;

    let domain_separator = domain_separator(&typed_data.domain, &typed_data.types)?;
    let struct_hash = hash_struct(
        &typed_data.primary_type,
        &typed_data.message,
        &typed_data.types,
    )?;

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(&domain_separator);
    data.extend_from_slice(&struct_hash);
    let final_hash = keccak256(&data);

    Ok(Eip712PreImage {
        domain_separator,
        struct_hash,
        final_hash,
    })
}
