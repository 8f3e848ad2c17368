use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};

use eip712_proof::config::DeploymentProfile;
use eip712_proof::demo;
use eip712_proof::eip712::{
    hash_typed_data, parse_address, recover_address, Eip712Signature, TypedData, TypedDataField,
};
use eip712_proof::submit::{
    expand_message, Submission, COMMAND_SUBMIT_APPROVAL, COMMAND_SUBMIT_PROOF, COMMAND_TEST_VERIFY,
};
use eip712_proof::to_checksum_address;
use eip712_proof::utils::crypto::addresses_equal;

struct ValidationResult {
    name: &'static str,
    success: bool,
    message: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let payload = if let Some(path) = args.get(1) {
        fs::read_to_string(path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let submission: Submission = serde_json::from_str(&payload)?;

    let mut results = Vec::new();
    results.push(run_validation("Command", || validate_command(&submission)));
    results.push(run_validation("Addresses", || {
        validate_addresses(&submission)
    }));
    results.push(run_validation("Signature", || {
        validate_signature_shape(&submission)
    }));
    results.push(run_validation("Schema", || validate_schema(&submission)));
    results.push(run_validation("Recovery", || validate_recovery(&submission)));

    println!("============== Submission Validation ==============");
    for result in &results {
        let status = if result.success {
            "✅ PASS"
        } else {
            "❌ FAIL"
        };
        println!("{:<10} {}", result.name, status);
        if !result.success {
            println!("    {}", result.message);
        }
    }

    let overall_success = results.iter().all(|r| r.success);
    println!("===================================================");
    if overall_success {
        println!("Overall status: ✅ Submission verified");
        Ok(())
    } else {
        println!("Overall status: ❌ Validation failed");
        Err("submission validation failed".into())
    }
}

fn run_validation<F>(name: &'static str, f: F) -> ValidationResult
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(_) => ValidationResult {
            name,
            success: true,
            message: String::new(),
        },
        Err(err) => ValidationResult {
            name,
            success: false,
            message: err,
        },
    }
}

fn validate_command(submission: &Submission) -> Result<(), String> {
    match submission.command.as_str() {
        COMMAND_SUBMIT_PROOF | COMMAND_SUBMIT_APPROVAL | COMMAND_TEST_VERIFY => Ok(()),
        other => Err(format!("unknown command {}", other)),
    }
}

fn validate_addresses(submission: &Submission) -> Result<(), String> {
    parse_address(&submission.contract_address).map_err(|e| format!("contract: {}", e))?;

    let signer_bytes = parse_address(&submission.signer).map_err(|e| format!("signer: {}", e))?;
    let checksummed = to_checksum_address(&signer_bytes);
    if checksummed != submission.signer {
        return Err(format!(
            "signer is not EIP-55 checksummed, expected {}",
            checksummed
        ));
    }

    Ok(())
}

fn validate_signature_shape(submission: &Submission) -> Result<(), String> {
    decode_component("sigR", &submission.sig_r)?;
    decode_component("sigS", &submission.sig_s)?;
    if submission.sig_v != 27 && submission.sig_v != 28 {
        return Err(format!("sigV must be 27 or 28, got {}", submission.sig_v));
    }
    Ok(())
}

fn validate_schema(submission: &Submission) -> Result<(), String> {
    let (_, types) = demo_schema(submission);
    expand_message("Unit", &submission.message_object, &types).map_err(|e| e.to_string())?;
    Ok(())
}

fn validate_recovery(submission: &Submission) -> Result<(), String> {
    let (profile, types) = demo_schema(submission);
    let r = decode_component("sigR", &submission.sig_r)?;
    let s = decode_component("sigS", &submission.sig_s)?;
    let signature = Eip712Signature::new(r, s, submission.sig_v);

    let typed_data = TypedData {
        types,
        primary_type: "Unit".to_string(),
        domain: profile.domain(),
        message: submission.message_object.clone(),
    };

    let digest = hash_typed_data(&typed_data).map_err(|e| e.to_string())?;
    let recovered = recover_address(&digest, &signature).map_err(|e| e.to_string())?;
    if !addresses_equal(&recovered, &submission.signer) {
        return Err(format!(
            "signature recovers to {}, not {}",
            recovered, submission.signer
        ));
    }

    Ok(())
}

/// Pick the demo schema the message shape matches: an object-valued
/// authorizer means the nested Identity variant.
fn demo_schema(submission: &Submission) -> (DeploymentProfile, HashMap<String, Vec<TypedDataField>>) {
    let nested = submission
        .message_object
        .get("authorizer")
        .map(|v| v.is_object())
        .unwrap_or(false);

    if nested {
        (DeploymentProfile::nested_demo(), demo::nested_types())
    } else {
        (DeploymentProfile::flat_demo(), demo::flat_types())
    }
}

fn decode_component(label: &str, value: &str) -> Result<[u8; 32], String> {
    let stripped = value
        .strip_prefix("0x")
        .ok_or_else(|| format!("{} must start with 0x", label))?;
    if stripped.len() != 64 {
        return Err(format!(
            "{} must be 64 hex chars, got {}",
            label,
            stripped.len()
        ));
    }

    let bytes = hex::decode(stripped).map_err(|e| format!("{} is not hex: {}", label, e))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}
