//! EIP-712 Type Definitions
//!
//! Core data structures for EIP-712 typed data signing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "bytes32")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// The EIP-712 domain separator data
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    /// The human-readable name of the signing domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The current major version of the signing domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The EIP-155 chain ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<serde_json::Value>,

    /// The address of the contract that will verify the signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,

    /// An optional disambiguating salt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl Eip712Domain {
    /// Get the chain ID as a u64
    ///
    /// Accepts a JSON number, a decimal string or a 0x-prefixed hex string.
    pub fn chain_id_u64(&self) -> Option<u64> {
        self.chain_id.as_ref().and_then(|v| {
            if let Some(n) = v.as_u64() {
                Some(n)
            } else if let Some(s) = v.as_str() {
                if s.starts_with("0x") || s.starts_with("0X") {
                    u64::from_str_radix(&s[2..], 16).ok()
                } else {
                    s.parse().ok()
                }
            } else {
                None
            }
        })
    }

    /// Get the chain ID as a big-endian 32-byte array
    pub fn chain_id_bytes(&self) -> Option<[u8; 32]> {
        self.chain_id_u64().map(|id| {
            let mut bytes = [0u8; 32];
            bytes[24..].copy_from_slice(&id.to_be_bytes());
            bytes
        })
    }
}

/// Complete EIP-712 typed data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    /// Type definitions (struct name -> fields)
    pub types: HashMap<String, Vec<TypedDataField>>,

    /// The name of the primary type being signed
    pub primary_type: String,

    /// The EIP-712 domain
    pub domain: Eip712Domain,

    /// The actual message data to sign
    pub message: serde_json::Value,
}

impl TypedData {
    /// Parse typed data from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Eip712Error> {
        serde_json::from_str(json).map_err(|e| Eip712Error::InvalidJson(e.to_string()))
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, Eip712Error> {
        serde_json::to_string(self).map_err(|e| Eip712Error::InvalidJson(e.to_string()))
    }

    /// Get the domain type fields
    ///
    /// Uses the declared `EIP712Domain` entry when the caller supplied one,
    /// otherwise derives the field list from which domain fields are present.
    pub fn get_domain_type(&self) -> Vec<TypedDataField> {
        domain_type_fields(&self.domain, &self.types)
    }

    /// The domain as a JSON object, for hashing through the generic encoder
    pub fn domain_message(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(ref name) = self.domain.name {
            obj.insert("name".to_string(), serde_json::Value::String(name.clone()));
        }
        if let Some(ref version) = self.domain.version {
            obj.insert(
                "version".to_string(),
                serde_json::Value::String(version.clone()),
            );
        }
        if let Some(ref chain_id) = self.domain.chain_id {
            obj.insert("chainId".to_string(), chain_id.clone());
        }
        if let Some(ref contract) = self.domain.verifying_contract {
            obj.insert(
                "verifyingContract".to_string(),
                serde_json::Value::String(contract.clone()),
            );
        }
        if let Some(ref salt) = self.domain.salt {
            obj.insert("salt".to_string(), serde_json::Value::String(salt.clone()));
        }
        serde_json::Value::Object(obj)
    }

    /// Validate the typed data structure
    pub fn validate(&self) -> Result<(), Eip712Error> {
        // Check that primary type exists in types
        if !self.types.contains_key(&self.primary_type) {
            return Err(Eip712Error::InvalidPrimaryType(self.primary_type.clone()));
        }

        // Validate all type references
        for (_type_name, fields) in &self.types {
            for field in fields {
                self.validate_type(&field.type_name)?;
            }
        }

        Ok(())
    }

    /// Check if a type is valid (either a built-in type or defined in types)
    fn validate_type(&self, type_name: &str) -> Result<(), Eip712Error> {
        // Handle arrays
        let base_type = if type_name.ends_with(']') {
            let bracket_pos = type_name
                .find('[')
                .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;
            &type_name[..bracket_pos]
        } else {
            type_name
        };

        // Check if it's a built-in type
        if is_atomic_type(base_type) || is_dynamic_type(base_type) {
            return Ok(());
        }

        // Check if it's a defined struct type
        if self.types.contains_key(base_type) {
            return Ok(());
        }

        Err(Eip712Error::InvalidType(type_name.to_string()))
    }
}

/// Errors that can occur during EIP-712 operations
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Eip712Error {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Invalid primary type: {0}")]
    InvalidPrimaryType(String),

    #[error("Recursive type reference: {0}")]
    RecursiveType(String),

    #[error("Missing field: {type_name}.{field}")]
    MissingField { type_name: String, field: String },

    #[error("Unexpected field: {type_name}.{field}")]
    UnexpectedField { type_name: String, field: String },

    #[error("Invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Resolve the field list for `EIP712Domain`
///
/// A declared entry in `types` wins; otherwise the list is derived from the
/// populated domain fields, in the order the standard defines them.
pub fn domain_type_fields(
    domain: &Eip712Domain,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Vec<TypedDataField> {
    if let Some(declared) = types.get("EIP712Domain") {
        return declared.clone();
    }

    let mut fields = Vec::new();

    if domain.name.is_some() {
        fields.push(TypedDataField::new("name", "string"));
    }
    if domain.version.is_some() {
        fields.push(TypedDataField::new("version", "string"));
    }
    if domain.chain_id.is_some() {
        fields.push(TypedDataField::new("chainId", "uint256"));
    }
    if domain.verifying_contract.is_some() {
        fields.push(TypedDataField::new("verifyingContract", "address"));
    }
    if domain.salt.is_some() {
        fields.push(TypedDataField::new("salt", "bytes32"));
    }

    fields
}

/// Check if a type is an atomic (fixed-size) type
pub fn is_atomic_type(type_name: &str) -> bool {
    // address
    if type_name == "address" {
        return true;
    }

    // bool
    if type_name == "bool" {
        return true;
    }

    // uintN and intN
    if (type_name.starts_with("uint") || type_name.starts_with("int")) && type_name.len() > 3 {
        let bits: &str = if type_name.starts_with("uint") {
            &type_name[4..]
        } else {
            &type_name[3..]
        };
        if let Ok(n) = bits.parse::<u32>() {
            return n > 0 && n <= 256 && n % 8 == 0;
        }
    }

    // bytesN (fixed-size bytes)
    if type_name.starts_with("bytes") && type_name != "bytes" {
        let size: &str = &type_name[5..];
        if let Ok(n) = size.parse::<u32>() {
            return n > 0 && n <= 32;
        }
    }

    false
}

/// Check if a type is a dynamic type
pub fn is_dynamic_type(type_name: &str) -> bool {
    type_name == "bytes" || type_name == "string"
}
