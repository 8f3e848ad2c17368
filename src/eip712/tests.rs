//! EIP-712 Test Suite
//!
//! Comprehensive tests for EIP-712 typed data signing.

use super::*;

/// Test the canonical Mail example from the EIP-712 standard
#[test]
fn test_eip712_mail_example() {
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

    let typed_data = TypedData::from_json(json).unwrap();
    let hash = hash_typed_data(&typed_data).unwrap();

    // Expected hash from the EIP-712 standard's example
    assert_eq!(
        hex::encode(hash),
        "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
    );
}

/// Flat proof payload: authorizer is a plain string field
fn flat_unit_example() -> TypedData {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Unit": [
                {"name": "actionType", "type": "string"},
                {"name": "timestamp", "type": "uint256"},
                {"name": "authorizer", "type": "string"}
            ]
        },
        "primaryType": "Unit",
        "domain": {
            "name": "VerifierApp101",
            "version": "1",
            "chainId": 5,
            "verifyingContract": "0x8c1eD7e19abAa9f23c476dA86Dc1577F1Ef401f5"
        },
        "message": {
            "actionType": "Action7440",
            "timestamp": 1570112162,
            "authorizer": "auth239430"
        }
    }"#;

    TypedData::from_json(json).unwrap()
}

/// Nested approval payload: authorizer is an Identity struct
fn nested_unit_example() -> TypedData {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Unit": [
                {"name": "actionType", "type": "string"},
                {"name": "timestamp", "type": "uint256"},
                {"name": "authorizer", "type": "Identity"}
            ],
            "Identity": [
                {"name": "userId", "type": "uint256"},
                {"name": "wallet", "type": "address"}
            ]
        },
        "primaryType": "Unit",
        "domain": {
            "name": "VerifierApp101",
            "version": "1",
            "chainId": 5,
            "verifyingContract": "0x8c1eD7e19abAa9f23c476dA86Dc1577F1Ef401f5"
        },
        "message": {
            "actionType": "Action7440",
            "timestamp": 1570112162,
            "authorizer": {
                "userId": 123,
                "wallet": "0x00EAd698A5C3c72D5a28429E9E6D6c076c086997"
            }
        }
    }"#;

    TypedData::from_json(json).unwrap()
}

/// Same input always produces the same digest
#[test]
fn test_digest_is_deterministic() {
    let a = hash_typed_data(&flat_unit_example()).unwrap();
    let b = hash_typed_data(&flat_unit_example()).unwrap();
    assert_eq!(a, b);

    // round-tripping through JSON does not disturb the digest
    let reparsed = TypedData::from_json(&flat_unit_example().to_json().unwrap()).unwrap();
    assert_eq!(hash_typed_data(&reparsed).unwrap(), a);
}

/// Any domain change must change the digest
#[test]
fn test_domain_change_changes_digest() {
    let base = flat_unit_example();
    let base_hash = hash_typed_data(&base).unwrap();

    let mut other_chain = base.clone();
    other_chain.domain.chain_id = Some(serde_json::json!(1));
    assert_ne!(hash_typed_data(&other_chain).unwrap(), base_hash);

    let mut other_name = base.clone();
    other_name.domain.name = Some("VerifierApp102".to_string());
    assert_ne!(hash_typed_data(&other_name).unwrap(), base_hash);

    let mut other_contract = base.clone();
    other_contract.domain.verifying_contract =
        Some("0x45829f0d2e8f7509587f21fae2096588db850d72".to_string());
    assert_ne!(hash_typed_data(&other_contract).unwrap(), base_hash);
}

/// Declared field order feeds the type hash, so reordering changes the digest
#[test]
fn test_field_order_changes_digest() {
    let base = flat_unit_example();
    let base_hash = hash_typed_data(&base).unwrap();

    let mut reordered = base.clone();
    reordered.types.insert(
        "Unit".to_string(),
        vec![
            TypedDataField::new("authorizer", "string"),
            TypedDataField::new("actionType", "string"),
            TypedDataField::new("timestamp", "uint256"),
        ],
    );

    assert_ne!(hash_typed_data(&reordered).unwrap(), base_hash);
}

/// A nested authorizer struct never collides with a flat string authorizer
#[test]
fn test_nested_and_flat_digests_differ() {
    let flat = hash_typed_data(&flat_unit_example()).unwrap();
    let nested = hash_typed_data(&nested_unit_example()).unwrap();
    assert_ne!(flat, nested);
}

/// Tampering with the message after signing breaks verification
#[test]
fn test_message_tamper_fails_verification() {
    let typed_data = nested_unit_example();
    let private_key =
        hex::decode("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap();

    let signature = sign_typed_data(&typed_data, &private_key).unwrap();
    let signer = address_from_private_key(&private_key).unwrap();
    assert!(verify_typed_data(&typed_data, &signature, &signer).unwrap());

    let mut tampered = typed_data.clone();
    tampered.message["actionType"] = serde_json::json!("Action7441");
    assert!(!verify_typed_data(&tampered, &signature, &signer).unwrap());

    let mut tampered_nested = typed_data.clone();
    tampered_nested.message["authorizer"]["userId"] = serde_json::json!(124);
    assert!(!verify_typed_data(&tampered_nested, &signature, &signer).unwrap());
}

/// A message field the schema does not declare refuses to hash
#[test]
fn test_undeclared_message_field_rejected() {
    let mut typed_data = flat_unit_example();
    typed_data.message["note"] = serde_json::json!("unexpected");

    let err = hash_typed_data(&typed_data).unwrap_err();
    assert_eq!(
        err,
        Eip712Error::UnexpectedField {
            type_name: "Unit".to_string(),
            field: "note".to_string(),
        }
    );
}

/// Test Uniswap-style Permit message
#[test]
fn test_eip712_permit() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Permit": [
                {"name": "owner", "type": "address"},
                {"name": "spender", "type": "address"},
                {"name": "value", "type": "uint256"},
                {"name": "nonce", "type": "uint256"},
                {"name": "deadline", "type": "uint256"}
            ]
        },
        "primaryType": "Permit",
        "domain": {
            "name": "Uniswap V2",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"
        },
        "message": {
            "owner": "0x1234567890123456789012345678901234567890",
            "spender": "0x0987654321098765432109876543210987654321",
            "value": "1000000000000000000",
            "nonce": 0,
            "deadline": 1893456000
        }
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    typed_data.validate().unwrap();

    let hash = hash_typed_data(&typed_data).unwrap();
    assert_eq!(hash.len(), 32);
}

/// Test with array types
#[test]
fn test_eip712_with_arrays() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Order": [
                {"name": "items", "type": "uint256[]"},
                {"name": "prices", "type": "uint256[]"}
            ]
        },
        "primaryType": "Order",
        "domain": {
            "name": "Test",
            "chainId": 1
        },
        "message": {
            "items": [1, 2, 3],
            "prices": [100, 200, 300]
        }
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    typed_data.validate().unwrap();

    let hash = hash_typed_data(&typed_data).unwrap();
    assert_eq!(hash.len(), 32);
}

/// Test with nested struct arrays
#[test]
fn test_eip712_struct_arrays() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Item": [
                {"name": "id", "type": "uint256"},
                {"name": "name", "type": "string"}
            ],
            "Order": [
                {"name": "items", "type": "Item[]"},
                {"name": "buyer", "type": "address"}
            ]
        },
        "primaryType": "Order",
        "domain": {
            "name": "Marketplace",
            "chainId": 1
        },
        "message": {
            "items": [
                {"id": 1, "name": "Widget"},
                {"id": 2, "name": "Gadget"}
            ],
            "buyer": "0x1234567890123456789012345678901234567890"
        }
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    typed_data.validate().unwrap();

    let hash = hash_typed_data(&typed_data).unwrap();
    assert_eq!(hash.len(), 32);
}

/// Test OpenSea-style order
#[test]
fn test_eip712_opensea_order() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "OrderComponents": [
                {"name": "offerer", "type": "address"},
                {"name": "zone", "type": "address"},
                {"name": "orderType", "type": "uint8"},
                {"name": "startTime", "type": "uint256"},
                {"name": "endTime", "type": "uint256"},
                {"name": "zoneHash", "type": "bytes32"},
                {"name": "salt", "type": "uint256"},
                {"name": "conduitKey", "type": "bytes32"},
                {"name": "counter", "type": "uint256"}
            ]
        },
        "primaryType": "OrderComponents",
        "domain": {
            "name": "Seaport",
            "version": "1.1",
            "chainId": 1,
            "verifyingContract": "0x00000000006c3852cbEf3e08E8dF289169EdE581"
        },
        "message": {
            "offerer": "0x1234567890123456789012345678901234567890",
            "zone": "0x0000000000000000000000000000000000000000",
            "orderType": 0,
            "startTime": 1640000000,
            "endTime": 1893456000,
            "zoneHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "salt": "12345",
            "conduitKey": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "counter": 0
        }
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    typed_data.validate().unwrap();

    let hash = hash_typed_data(&typed_data).unwrap();
    assert_eq!(hash.len(), 32);
}

/// Test invalid primary type
#[test]
fn test_eip712_invalid_primary_type() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"}
            ],
            "Person": [
                {"name": "name", "type": "string"}
            ]
        },
        "primaryType": "NonExistent",
        "domain": {"name": "Test"},
        "message": {}
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    let result = typed_data.validate();

    assert!(result.is_err());
    assert!(matches!(
        result.unwrap_err(),
        Eip712Error::InvalidPrimaryType(_)
    ));
}

/// Test chain ID parsing
#[test]
fn test_chain_id_parsing() {
    // Test numeric chain ID
    let domain1 = Eip712Domain {
        chain_id: Some(serde_json::json!(1)),
        ..Default::default()
    };
    assert_eq!(domain1.chain_id_u64(), Some(1));

    // Test string chain ID
    let domain2 = Eip712Domain {
        chain_id: Some(serde_json::json!("137")),
        ..Default::default()
    };
    assert_eq!(domain2.chain_id_u64(), Some(137));

    // Test hex string chain ID
    let domain3 = Eip712Domain {
        chain_id: Some(serde_json::json!("0x89")),
        ..Default::default()
    };
    assert_eq!(domain3.chain_id_u64(), Some(137));
}

/// Test pre-image generation
#[test]
fn test_pre_image_generation() {
    let typed_data = flat_unit_example();
    let pre_image = get_pre_image(&typed_data).unwrap();

    // Verify final hash matches direct computation
    let direct_hash = hash_typed_data(&typed_data).unwrap();
    assert_eq!(pre_image.final_hash, direct_hash);
}

/// Test signing roundtrip through the hex codec
#[test]
fn test_signing_roundtrip() {
    let typed_data = flat_unit_example();

    let private_key =
        hex::decode("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef").unwrap();

    // Sign
    let signature = sign_typed_data(&typed_data, &private_key).unwrap();

    // Wire round trip
    let parsed = Eip712Signature::from_hex(&signature.to_hex()).unwrap();
    assert_eq!(parsed, signature);

    // Recover address
    let hash = hash_typed_data(&typed_data).unwrap();
    let recovered = recover_address(&hash, &parsed).unwrap();

    // Verify
    let valid = verify_typed_data(&typed_data, &parsed, &recovered).unwrap();
    assert!(valid);

    // Verify wrong address fails
    let wrong_address = "0x0000000000000000000000000000000000000000";
    let invalid = verify_typed_data(&typed_data, &parsed, wrong_address).unwrap();
    assert!(!invalid);
}
