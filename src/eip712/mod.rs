//! EIP-712 Typed Data Signing
//!
//! Implementation of EIP-712 typed structured data hashing, signing and
//! signer recovery. The encoder and hasher are pure functions of their
//! inputs; the same typed data always produces the same digest.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use eip712_proof::eip712::{hash_typed_data, sign_typed_data, TypedData};
//!
//! let typed_data = TypedData::from_json(json_string)?;
//! let digest = hash_typed_data(&typed_data)?;
//! let signature = sign_typed_data(&typed_data, &private_key)?;
//! ```

pub mod codec;
pub mod encoder;
pub mod hasher;
pub mod recovery;
pub mod types;

pub use codec::*;
pub use encoder::*;
pub use hasher::*;
pub use recovery::*;
pub use types::*;

#[cfg(test)]
mod tests;
