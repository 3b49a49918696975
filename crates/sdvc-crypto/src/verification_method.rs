//! # Verification Methods
//!
//! The two wire forms a keypair travels in: `Multikey` (multibase-encoded
//! key strings) and `JsonWebKey` (JWK objects). The enum is tagged on the
//! JSON `type` member, so import dispatch is a serde concern rather than
//! runtime inspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::Jwk;

/// JSON-LD context for Multikey verification methods.
pub const MULTIKEY_CONTEXT: &str = "https://w3id.org/security/multikey/v1";

/// JSON-LD context for JWK verification methods.
pub const JWK_CONTEXT: &str = "https://w3id.org/security/jwk/v1";

/// Contexts accepted when `check_context` is enabled on import.
pub const CONTEXT_ALLOWLIST: [&str; 4] = [
    "https://www.w3.org/ns/did/v1",
    MULTIKEY_CONTEXT,
    JWK_CONTEXT,
    "https://w3id.org/security/data-integrity/v2",
];

/// A verification-method document, polymorphic over its `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerificationMethod {
    /// Multibase-encoded key material.
    Multikey(MultikeyMethod),
    /// JWK-encoded key material.
    JsonWebKey(JsonWebKeyMethod),
}

impl VerificationMethod {
    /// The method identifier.
    pub fn id(&self) -> &str {
        match self {
            VerificationMethod::Multikey(m) => &m.id,
            VerificationMethod::JsonWebKey(m) => &m.id,
        }
    }

    /// The controller URI.
    pub fn controller(&self) -> &str {
        match self {
            VerificationMethod::Multikey(m) => &m.controller,
            VerificationMethod::JsonWebKey(m) => &m.controller,
        }
    }

    /// The declared `@context`, if any.
    pub fn context(&self) -> Option<&Value> {
        match self {
            VerificationMethod::Multikey(m) => m.context.as_ref(),
            VerificationMethod::JsonWebKey(m) => m.context.as_ref(),
        }
    }

    /// The declared expiry timestamp string, if any.
    pub fn expires(&self) -> Option<&str> {
        match self {
            VerificationMethod::Multikey(m) => m.expires.as_deref(),
            VerificationMethod::JsonWebKey(m) => m.expires.as_deref(),
        }
    }

    /// The declared revocation timestamp string, if any.
    pub fn revoked(&self) -> Option<&str> {
        match self {
            VerificationMethod::Multikey(m) => m.revoked.as_deref(),
            VerificationMethod::JsonWebKey(m) => m.revoked.as_deref(),
        }
    }
}

/// A `Multikey` verification method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultikeyMethod {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    pub id: String,
    pub controller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked: Option<String>,
    #[serde(
        rename = "publicKeyMultibase",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key_multibase: Option<String>,
    #[serde(
        rename = "secretKeyMultibase",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secret_key_multibase: Option<String>,
}

/// A `JsonWebKey` verification method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKeyMethod {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    pub id: String,
    pub controller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked: Option<String>,
    #[serde(rename = "publicKeyJwk", default, skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,
    #[serde(rename = "secretKeyJwk", default, skip_serializing_if = "Option::is_none")]
    pub secret_key_jwk: Option<Jwk>,
}

/// Collect the context entries of an `@context` value (string or array of
/// strings).
pub fn context_entries(context: &Value) -> Vec<&str> {
    match context {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}
