//! Unified error type for the submission pipeline
//!
//! The pure signing/verification modules carry their own `thiserror` enums;
//! everything that touches I/O (config, HTTP, submission) flows through this
//! module so callers get one serializable shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::eip712::{Eip712Error, SignatureError};
use crate::provider::ProviderError;

/// Main error type for pipeline operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl PipelineError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSignature, msg)
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaMismatch, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn verification_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::VerificationFailed, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidAddress,
    InvalidSignature,
    SchemaMismatch,

    // Configuration errors
    ConfigError,

    // Network errors
    NetworkError,
    RateLimited,
    Timeout,

    // Signing and verification
    SigningFailed,
    VerificationFailed,
    UserRejected,
    ProviderFailed,

    // Parse errors
    ParseError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

// Conversions from common error types

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for PipelineError {
    fn from(e: hex::FromHexError) -> Self {
        PipelineError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<url::ParseError> for PipelineError {
    fn from(e: url::ParseError) -> Self {
        PipelineError::new(ErrorCode::ConfigError, e.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PipelineError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            PipelineError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            PipelineError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<Eip712Error> for PipelineError {
    fn from(e: Eip712Error) -> Self {
        let code = match &e {
            Eip712Error::InvalidJson(_) => ErrorCode::JsonError,
            Eip712Error::InvalidType(_)
            | Eip712Error::InvalidPrimaryType(_)
            | Eip712Error::RecursiveType(_) => ErrorCode::SchemaMismatch,
            Eip712Error::MissingField { .. } | Eip712Error::UnexpectedField { .. } => {
                ErrorCode::SchemaMismatch
            }
            Eip712Error::InvalidValue { .. } => ErrorCode::InvalidInput,
            Eip712Error::InvalidAddress(_) => ErrorCode::InvalidAddress,
            Eip712Error::EncodingError(_) => ErrorCode::InvalidInput,
        };
        PipelineError::new(code, e.to_string())
    }
}

impl From<SignatureError> for PipelineError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::TypedData(inner) => inner.into(),
            SignatureError::SigningFailed(msg) => {
                PipelineError::new(ErrorCode::SigningFailed, msg)
            }
            other => PipelineError::new(ErrorCode::InvalidSignature, other.to_string()),
        }
    }
}

impl From<ProviderError> for PipelineError {
    fn from(e: ProviderError) -> Self {
        let code = match &e {
            ProviderError::UserRejected => ErrorCode::UserRejected,
            ProviderError::InvalidKey(_) => ErrorCode::InvalidInput,
            ProviderError::Signature(SignatureError::TypedData(_)) => ErrorCode::SchemaMismatch,
            ProviderError::Signature(_) => ErrorCode::SigningFailed,
            ProviderError::Failed(_) => ErrorCode::ProviderFailed,
        };
        PipelineError::new(code, e.to_string())
    }
}
