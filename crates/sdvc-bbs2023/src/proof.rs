//! # Proof Types
//!
//! The `DataIntegrityProof` object carried on secured documents, the
//! issuer-side proof options it is built from, and the per-feature inputs
//! of the issue and derive pipelines.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::feature::Feature;

/// The proof `type` this suite produces and accepts.
pub const PROOF_TYPE: &str = "DataIntegrityProof";

/// The cryptosuite identifier.
pub const CRYPTOSUITE: &str = "bbs-2023";

/// A Data Integrity proof attached to a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// Optional proof-scoped context.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Always `"DataIntegrityProof"`.
    #[serde(rename = "type")]
    pub proof_type: String,
    /// Always `"bbs-2023"`.
    pub cryptosuite: String,
    /// Creation timestamp, if the issuer dates its proofs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// URL of the verification method holding the issuer's public key.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    /// The proof purpose (typically `"assertionMethod"`).
    #[serde(rename = "proofPurpose", default, skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
    /// The multibase proof value.
    #[serde(rename = "proofValue", default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

/// Issuer-side proof options: everything that ends up in the proof object
/// except the proof value itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofOptions {
    /// Proof type; must be [`PROOF_TYPE`].
    pub proof_type: String,
    /// Cryptosuite identifier; must be [`CRYPTOSUITE`].
    pub cryptosuite: String,
    /// Optional creation timestamp (RFC 3339).
    pub created: Option<String>,
    /// URL of the issuer's verification method.
    pub verification_method: String,
    /// The proof purpose.
    pub proof_purpose: Option<String>,
}

impl ProofOptions {
    /// Options for this suite with the given verification method and the
    /// standard assertion purpose.
    pub fn new(verification_method: impl Into<String>) -> Self {
        Self {
            proof_type: PROOF_TYPE.to_string(),
            cryptosuite: CRYPTOSUITE.to_string(),
            created: None,
            verification_method: verification_method.into(),
            proof_purpose: Some("assertionMethod".to_string()),
        }
    }

    /// Build the proof object carrying `proof_value`.
    pub fn to_proof(&self, proof_value: String) -> Proof {
        Proof {
            context: None,
            proof_type: self.proof_type.clone(),
            cryptosuite: self.cryptosuite.clone(),
            created: self.created.clone(),
            verification_method: self.verification_method.clone(),
            proof_purpose: self.proof_purpose.clone(),
            proof_value: Some(proof_value),
        }
    }
}

/// Feature selection and feature-specific inputs for base-proof issuance.
#[derive(Debug, Clone, Default)]
pub struct FeatureOptions {
    /// The feature to issue under.
    pub feature: Feature,
    /// Holder commitment, required by every non-baseline feature.
    pub commitment_with_proof: Option<Vec<u8>>,
    /// Signer-contributed entropy, required by the pseudonym features.
    pub signer_nym_entropy: Option<Vec<u8>>,
}

/// Holder-side inputs for proof derivation.
#[derive(Debug, Clone, Default)]
pub struct DeriveOptions {
    /// Pointers naming the statements to reveal (beyond the mandatory
    /// ones).
    pub selective_pointers: Vec<String>,
    /// Presentation header bound into the disclosure proof.
    pub presentation_header: Vec<u8>,
    /// Holder secret (anonymous holder binding and holder-bound
    /// pseudonyms).
    pub holder_secret: Option<Vec<u8>>,
    /// Holder blinding factor (anonymous holder binding).
    pub prover_blind: Option<Vec<u8>>,
    /// Verifier domain for pseudonym features.
    pub nym_domain: Option<Vec<u8>>,
}
