//! Built-in typed data examples used by the CLI demos and tests.
//!
//! Two schemas are provided. The flat `Unit` carries its authorizer as a
//! plain string. The nested variant replaces that field with an `Identity`
//! struct, which exercises recursive struct hashing and schema-ordered
//! flattening on the submission path.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::config::DeploymentProfile;
use crate::eip712::{TypedData, TypedDataField};

/// Action label carried by both demo messages.
pub const DEMO_ACTION: &str = "Action7440";
/// Unix timestamp carried by both demo messages.
pub const DEMO_TIMESTAMP: u64 = 1_570_112_162;
/// Authorizer string for the flat demo message.
pub const DEMO_AUTHORIZER: &str = "auth239430";
/// User id inside the nested authorizer identity.
pub const DEMO_USER_ID: u64 = 123;
/// Wallet address inside the nested authorizer identity.
pub const DEMO_WALLET: &str = "0x00EAd698A5C3c72D5a28429E9E6D6c076c086997";

/// Type table for the flat demo: `Unit` with a string authorizer.
pub fn flat_types() -> HashMap<String, Vec<TypedDataField>> {
    let mut types = HashMap::new();
    types.insert("EIP712Domain".to_string(), domain_fields());
    types.insert(
        "Unit".to_string(),
        vec![
            TypedDataField::new("actionType", "string"),
            TypedDataField::new("timestamp", "uint256"),
            TypedDataField::new("authorizer", "string"),
        ],
    );
    types
}

/// Type table for the nested demo: `Unit` referencing an `Identity` struct.
pub fn nested_types() -> HashMap<String, Vec<TypedDataField>> {
    let mut types = HashMap::new();
    types.insert("EIP712Domain".to_string(), domain_fields());
    types.insert(
        "Unit".to_string(),
        vec![
            TypedDataField::new("actionType", "string"),
            TypedDataField::new("timestamp", "uint256"),
            TypedDataField::new("authorizer", "Identity"),
        ],
    );
    types.insert(
        "Identity".to_string(),
        vec![
            TypedDataField::new("userId", "uint256"),
            TypedDataField::new("wallet", "address"),
        ],
    );
    types
}

fn domain_fields() -> Vec<TypedDataField> {
    vec![
        TypedDataField::new("name", "string"),
        TypedDataField::new("version", "string"),
        TypedDataField::new("chainId", "uint256"),
        TypedDataField::new("verifyingContract", "address"),
    ]
}

/// Message body for the flat demo.
pub fn flat_message() -> Value {
    json!({
        "actionType": DEMO_ACTION,
        "timestamp": DEMO_TIMESTAMP,
        "authorizer": DEMO_AUTHORIZER,
    })
}

/// Message body for the nested demo.
pub fn nested_message() -> Value {
    json!({
        "actionType": DEMO_ACTION,
        "timestamp": DEMO_TIMESTAMP,
        "authorizer": {
            "userId": DEMO_USER_ID,
            "wallet": DEMO_WALLET,
        },
    })
}

/// Complete flat typed data bound to a deployment profile's domain.
pub fn flat_typed_data(profile: &DeploymentProfile) -> TypedData {
    TypedData {
        types: flat_types(),
        primary_type: "Unit".to_string(),
        domain: profile.domain(),
        message: flat_message(),
    }
}

/// Complete nested typed data bound to a deployment profile's domain.
pub fn nested_typed_data(profile: &DeploymentProfile) -> TypedData {
    TypedData {
        types: nested_types(),
        primary_type: "Unit".to_string(),
        domain: profile.domain(),
        message: nested_message(),
    }
}
