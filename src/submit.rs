//! Submission pipeline for signed typed data.
//!
//! The client side builds a [`Submission`] by signing typed data through a
//! [`WalletProvider`] and posts it to the relay. The relay side validates the
//! wire format, recovers the signer from the signature, rejects mismatches,
//! flattens the message into schema order, and forwards the contract call to
//! the REST gateway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::DeploymentProfile;
use crate::eip712::{
    get_base_type, parse_address, verify_typed_data, Eip712Error, Eip712Signature, TypedData,
    TypedDataField,
};
use crate::error::{PipelineError, PipelineResult};
use crate::provider::WalletProvider;
use crate::utils::http::{self, get_client_pool};
use crate::{log_debug, log_info, log_warn};

/// Wire command for submitting a proof signature.
pub const COMMAND_SUBMIT_PROOF: &str = "submitProof";
/// Wire command for submitting an approval signature.
pub const COMMAND_SUBMIT_APPROVAL: &str = "submitApproval";
/// Wire command for probing the verification endpoint.
pub const COMMAND_TEST_VERIFY: &str = "testVerify";

/// Header carrying the gateway API key.
const API_KEY_HEADER: &str = "X-API-KEY";

/// Commands a client can ask the relay to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitCommand {
    Proof,
    Approval,
    TestVerify,
}

impl SubmitCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitCommand::Proof => COMMAND_SUBMIT_PROOF,
            SubmitCommand::Approval => COMMAND_SUBMIT_APPROVAL,
            SubmitCommand::TestVerify => COMMAND_TEST_VERIFY,
        }
    }
}

/// Signed payload exchanged between client and relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub command: String,
    pub contract_address: String,
    pub message_object: Value,
    pub sig_r: String,
    pub sig_s: String,
    pub sig_v: u8,
    pub signer: String,
}

/// Body forwarded to the REST gateway's contract call endpoint.
///
/// `_msg` is the JSON-encoded flattened message, in the order the schema
/// declares its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCallArgs {
    #[serde(rename = "_msg")]
    pub msg: String,
    pub sig_r: String,
    pub sig_s: String,
    pub sig_v: u8,
}

/// Outcome of relay-side processing, before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Verified submission, ready to POST to the gateway.
    Forward { url: String, args: ContractCallArgs },
    /// Probe request, ready to GET from the gateway.
    TestVerify { url: String },
    /// Unrecognized command, acknowledged without action.
    Ignored,
}

/// Sign typed data and assemble the wire submission for it.
pub fn build_submission(
    profile: &DeploymentProfile,
    provider: &dyn WalletProvider,
    command: SubmitCommand,
    typed_data: &TypedData,
) -> PipelineResult<Submission> {
    let signature = provider.sign_typed_data(typed_data)?;
    let signer = provider.address()?;

    log_info!(
        "submit",
        "Built signed submission",
        command = command.as_str(),
        contract = profile.contract_address,
    );

    Ok(Submission {
        command: command.as_str().to_string(),
        contract_address: profile.contract_address.clone(),
        message_object: typed_data.message.clone(),
        sig_r: signature.r_hex(),
        sig_s: signature.s_hex(),
        sig_v: signature.v,
        signer,
    })
}

/// POST a submission to the relay and return its JSON reply.
pub fn send_to_relay(
    profile: &DeploymentProfile,
    submission: &Submission,
) -> PipelineResult<Value> {
    log_info!("submit", "Sending submission to relay", relay = profile.relay_url);
    let response = http::post_json(&profile.relay_url, submission)?;
    parse_json_response(response)
}

/// Validate, verify, and route one submission.
///
/// Proof and approval submissions must carry a signature that recovers to
/// the claimed signer; anything else is rejected. Unknown commands are
/// acknowledged without touching the gateway.
pub fn process_submission(
    profile: &DeploymentProfile,
    types: &HashMap<String, Vec<TypedDataField>>,
    primary_type: &str,
    submission: &Submission,
) -> PipelineResult<ProcessOutcome> {
    match submission.command.as_str() {
        COMMAND_SUBMIT_PROOF | COMMAND_SUBMIT_APPROVAL => {}
        COMMAND_TEST_VERIFY => {
            parse_address(&submission.contract_address)?;
            return Ok(ProcessOutcome::TestVerify {
                url: format!(
                    "{}/contract/{}/testVerify",
                    profile.rest_api_endpoint, submission.contract_address
                ),
            });
        }
        other => {
            log_warn!("submit", "Ignoring unknown command", command = other);
            return Ok(ProcessOutcome::Ignored);
        }
    }

    parse_address(&submission.contract_address)?;
    parse_address(&submission.signer)?;

    let r = parse_sig_component("sigR", &submission.sig_r)?;
    let s = parse_sig_component("sigS", &submission.sig_s)?;
    let signature = Eip712Signature::new(r, s, submission.sig_v);

    let typed_data = TypedData {
        types: types.clone(),
        primary_type: primary_type.to_string(),
        domain: profile.domain(),
        message: submission.message_object.clone(),
    };

    let verified = verify_typed_data(&typed_data, &signature, &submission.signer)?;
    if !verified {
        return Err(PipelineError::verification_failed(
            "Signature does not match the claimed signer",
        ));
    }

    let flattened = expand_message(primary_type, &submission.message_object, types)?;
    let msg = serde_json::to_string(&Value::Array(flattened))?;

    log_debug!(
        "submit",
        "Submission verified",
        command = submission.command,
        signer = submission.signer,
    );

    // Both proof and approval land on the contract's submitProof method
    Ok(ProcessOutcome::Forward {
        url: format!(
            "{}/contract/{}/submitProof",
            profile.rest_api_endpoint, submission.contract_address
        ),
        args: ContractCallArgs {
            msg,
            sig_r: format!("0x{}", hex::encode(r)),
            sig_s: format!("0x{}", hex::encode(s)),
            sig_v: submission.sig_v,
        },
    })
}

/// Execute a processed outcome against the REST gateway.
pub fn forward_submission(
    profile: &DeploymentProfile,
    outcome: &ProcessOutcome,
) -> PipelineResult<Value> {
    let pool = get_client_pool();
    match outcome {
        ProcessOutcome::Forward { url, args } => {
            log_info!("submit", "Forwarding contract call", url = url);
            let response = match &profile.api_key {
                Some(key) => pool.post_json_with_header(url, args, API_KEY_HEADER, key)?,
                None => pool.post_json(url, args)?,
            };
            parse_json_response(response)
        }
        ProcessOutcome::TestVerify { url } => {
            log_info!("submit", "Probing verification endpoint", url = url);
            let response = match &profile.api_key {
                Some(key) => pool.get_with_header(url, API_KEY_HEADER, key)?,
                None => pool.get(url)?,
            };
            parse_json_response(response)
        }
        ProcessOutcome::Ignored => Ok(json!({ "success": true })),
    }
}

/// Flatten a message into its schema's declared field order.
///
/// Struct-typed fields become nested arrays, so a `Unit` whose authorizer is
/// an `Identity` flattens to `[actionType, timestamp, [userId, wallet]]`.
pub fn expand_message(
    type_name: &str,
    message: &Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<Vec<Value>, Eip712Error> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;
    let object = message.as_object().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: message.to_string(),
    })?;

    let mut flattened = Vec::with_capacity(fields.len());
    for field in fields {
        let value = object
            .get(&field.name)
            .ok_or_else(|| Eip712Error::MissingField {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            })?;
        flattened.push(expand_value(&field.type_name, value, types)?);
    }

    for key in object.keys() {
        if !fields.iter().any(|f| &f.name == key) {
            return Err(Eip712Error::UnexpectedField {
                type_name: type_name.to_string(),
                field: key.clone(),
            });
        }
    }

    Ok(flattened)
}

fn expand_value(
    type_name: &str,
    value: &Value,
    types: &HashMap<String, Vec<TypedDataField>>,
) -> Result<Value, Eip712Error> {
    let base = get_base_type(type_name);
    if base != type_name {
        let items = value.as_array().ok_or_else(|| Eip712Error::InvalidValue {
            type_name: type_name.to_string(),
            value: value.to_string(),
        })?;
        let expanded = items
            .iter()
            .map(|item| expand_value(base, item, types))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Array(expanded));
    }

    if types.contains_key(type_name) {
        return Ok(Value::Array(expand_message(type_name, value, types)?));
    }

    Ok(value.clone())
}

/// Parse one 32-byte signature component from its hex wire form.
fn parse_sig_component(label: &str, value: &str) -> PipelineResult<[u8; 32]> {
    let stripped = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if stripped.len() != 64 {
        return Err(PipelineError::invalid_input(format!(
            "{} must be 64 hex chars, got {}",
            label,
            stripped.len()
        )));
    }

    let bytes = hex::decode(stripped).map_err(|e| {
        PipelineError::invalid_input(format!("{} is not valid hex: {}", label, e))
    })?;

    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn parse_json_response(response: reqwest::blocking::Response) -> PipelineResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(PipelineError::network(format!(
            "Gateway returned {}: {}",
            status, body
        )));
    }

    response
        .json()
        .map_err(|e| PipelineError::network(format!("Invalid JSON response: {}", e)))
}
