//! EIP-712 Proof Pipeline
//!
//! Rust backend for signing EIP-712 typed data and relaying the signed
//! proofs to a contract gateway.
//!
//! # Architecture
//!
//! This crate provides:
//! - **eip712**: Typed data encoding, hashing, signing, and signer recovery
//! - **eip191**: `personal_sign` style prefixed message signatures
//! - **provider**: Wallet abstraction over in-memory signing keys
//! - **submit**: Client submission building and relay-side verification
//! - **config**: Deployment profiles for domains, contracts, and endpoints
//! - **demo**: Built-in flat and nested typed data examples
//!
//! # Security
//!
//! This crate uses `zeroize` to securely clear sensitive data from memory.
//! Private keys and parsed signatures are automatically zeroed when dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use eip712_proof::config::DeploymentProfile;
//! use eip712_proof::provider::LocalWallet;
//! use eip712_proof::submit::{build_submission, send_to_relay, SubmitCommand};
//! use eip712_proof::demo;
//!
//! let profile = DeploymentProfile::flat_demo();
//! let wallet = LocalWallet::random();
//! let typed_data = demo::flat_typed_data(&profile);
//!
//! let submission = build_submission(&profile, &wallet, SubmitCommand::Proof, &typed_data)?;
//! let reply = send_to_relay(&profile, &submission)?;
//! println!("relay replied: {}", reply);
//! ```

pub mod config;
pub mod demo;
pub mod eip191;
pub mod eip712;
pub mod error;
pub mod provider;
pub mod submit;
pub mod utils;

// Re-export key types for convenience
pub use error::{ErrorCode, PipelineError, PipelineResult};

pub use eip712::{
    hash_typed_data,
    recover_address,
    sign_typed_data,
    verify_typed_data,
    Eip712Domain,
    Eip712Signature,
    SignatureError,
    TypedData,
    TypedDataField,
};

pub use config::DeploymentProfile;
pub use provider::{LocalWallet, WalletProvider};
pub use submit::{
    build_submission,
    forward_submission,
    process_submission,
    send_to_relay,
    ProcessOutcome,
    SubmitCommand,
    Submission,
};

// Re-export crypto utilities for binaries
pub use utils::crypto::{keccak256, to_checksum_address};
