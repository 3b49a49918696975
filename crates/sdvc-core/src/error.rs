//! # Error Types — Structured Error Hierarchy
//!
//! Defines the single error type surfaced by every crate in the SDVC Stack.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! Every failure carries three parts:
//!
//! - a fixed [`ErrorCode`] drawn from a closed list, stable across releases
//!   and suitable for programmatic matching;
//! - an operation locator (`codec::material_to_multibase`, `derive::parse`,
//!   ...) naming where the failure originated;
//! - a human-readable message with the offending values.
//!
//! Cryptographic failures fail loudly with full context. No error is
//! swallowed; the only recovery paths are the explicit `check_*` flags on
//! keypair import.

use thiserror::Error;

/// The closed set of error codes surfaced by the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Key material length does not match its tag (32-byte private,
    /// 96-byte public).
    InvalidKeypairLength,
    /// Missing or inconsistent JWK/Multikey field, unsupported flag, or
    /// an `id` that does not extend its `controller`.
    InvalidKeypairContent,
    /// Multibase prefix mismatch or malformed base64url/base58/CBOR input.
    DecodingError,
    /// Expiration or revocation timestamp in the past when the caller
    /// requested the check.
    KeypairExpired,
    /// Keypair export failed: requested material absent, or identifier
    /// and controller missing or inconsistent.
    KeypairExport,
    /// Keypair import failed: unknown verification-method type or
    /// malformed document.
    KeypairImport,
    /// Wrong `type`/`cryptosuite` while transforming an unsecured document.
    ProofTransformation,
    /// Missing feature input, invalid `created` timestamp, or label-map
    /// shape violation while producing a proof.
    ProofGeneration,
    /// Malformed proof value or verification-side inconsistency.
    ProofVerification,
    /// Referenced verification method cannot be loaded or lacks the
    /// required keys.
    InvalidVerificationMethod,
}

impl ErrorCode {
    /// The wire-stable name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidKeypairLength => "INVALID_KEYPAIR_LENGTH",
            ErrorCode::InvalidKeypairContent => "INVALID_KEYPAIR_CONTENT",
            ErrorCode::DecodingError => "DECODING_ERROR",
            ErrorCode::KeypairExpired => "KEYPAIR_EXPIRED_ERROR",
            ErrorCode::KeypairExport => "KEYPAIR_EXPORT_ERROR",
            ErrorCode::KeypairImport => "KEYPAIR_IMPORT_ERROR",
            ErrorCode::ProofTransformation => "PROOF_TRANSFORMATION_ERROR",
            ErrorCode::ProofGeneration => "PROOF_GENERATION_ERROR",
            ErrorCode::ProofVerification => "PROOF_VERIFICATION_ERROR",
            ErrorCode::InvalidVerificationMethod => "INVALID_VERIFICATION_METHOD",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error surfaced by the SDVC Stack.
///
/// Construct through the per-code helpers (`SuiteError::decoding(...)`,
/// `SuiteError::generation(...)`, ...) so the operation locator is never
/// forgotten.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {operation}: {message}")]
pub struct SuiteError {
    code: ErrorCode,
    operation: &'static str,
    message: String,
}

impl SuiteError {
    /// Create an error with an explicit code.
    pub fn new(code: ErrorCode, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            operation,
            message: message.into(),
        }
    }

    /// The fixed error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The operation locator.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// `INVALID_KEYPAIR_LENGTH`
    pub fn invalid_length(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidKeypairLength, operation, message)
    }

    /// `INVALID_KEYPAIR_CONTENT`
    pub fn invalid_content(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidKeypairContent, operation, message)
    }

    /// `DECODING_ERROR`
    pub fn decoding(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodingError, operation, message)
    }

    /// `KEYPAIR_EXPIRED_ERROR`
    pub fn expired(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::KeypairExpired, operation, message)
    }

    /// `KEYPAIR_EXPORT_ERROR`
    pub fn export(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::KeypairExport, operation, message)
    }

    /// `KEYPAIR_IMPORT_ERROR`
    pub fn import(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::KeypairImport, operation, message)
    }

    /// `PROOF_TRANSFORMATION_ERROR`
    pub fn transformation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProofTransformation, operation, message)
    }

    /// `PROOF_GENERATION_ERROR`
    pub fn generation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProofGeneration, operation, message)
    }

    /// `PROOF_VERIFICATION_ERROR`
    pub fn verification(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProofVerification, operation, message)
    }

    /// `INVALID_VERIFICATION_METHOD`
    pub fn verification_method(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidVerificationMethod, operation, message)
    }
}

/// Result alias used throughout the stack.
pub type Result<T> = std::result::Result<T, SuiteError>;
