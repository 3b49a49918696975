//! # Base-Proof Pipeline (Issuer)
//!
//! Transform, hash, and serialize a base proof over an unsecured JSON-LD
//! document: canonicalize with HMAC-shuffled blank-node labels, partition
//! statements under the mandatory pointers, bind the proof-config and
//! mandatory hashes into the BBS header, sign the non-mandatory
//! statements, and envelope the result.
//!
//! The proof-config hash and the mandatory-statement hash are independent
//! of each other and are computed concurrently.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use sdvc_core::nquads::join;
use sdvc_core::{JsonPointer, Result, SuiteError};
use sdvc_crypto::bbs::BBS_HEADER_LENGTH;
use sdvc_crypto::keypair::ImportOptions;
use sdvc_crypto::{BbsSignatures, Keypair};

use crate::envelope::{serialize_base_proof_value, BaseProofValue};
use crate::feature::Feature;
use crate::group::{canonicalize_and_group, canonicalize_plain};
use crate::hmac_shuffle::{HmacIdShuffler, HMAC_KEY_LENGTH};
use crate::proof::{FeatureOptions, Proof, ProofOptions, CRYPTOSUITE, PROOF_TYPE};
use crate::traits::{DocumentLoader, JsonLdProcessor};

/// The canonical statement partition a base proof is built over.
#[derive(Debug, Clone)]
pub struct TransformedDocument {
    /// The issuer's mandatory pointers, echoed into the proof value.
    pub mandatory_pointers: Vec<String>,
    /// Mandatory statements, keyed by canonical index.
    pub mandatory: BTreeMap<usize, String>,
    /// Non-mandatory statements, keyed by canonical index.
    pub non_mandatory: BTreeMap<usize, String>,
    /// The HMAC key behind the label shuffle.
    pub hmac_key: [u8; HMAC_KEY_LENGTH],
}

/// A transformed document plus the two hashes the BBS header binds.
#[derive(Debug, Clone)]
pub struct HashData {
    /// The statement partition.
    pub transformed: TransformedDocument,
    /// SHA-256 of the canonical proof configuration.
    pub proof_hash: [u8; 32],
    /// SHA-256 of the joined mandatory statements.
    pub mandatory_hash: [u8; 32],
}

impl HashData {
    /// `proofHash || mandatoryHash`, the header every BBS operation binds.
    pub fn bbs_header(&self) -> [u8; BBS_HEADER_LENGTH] {
        let mut header = [0u8; BBS_HEADER_LENGTH];
        header[..32].copy_from_slice(&self.proof_hash);
        header[32..].copy_from_slice(&self.mandatory_hash);
        header
    }
}

fn ensure_suite(
    operation: &'static str,
    proof_type: &str,
    cryptosuite: &str,
) -> Result<()> {
    if proof_type != PROOF_TYPE || cryptosuite != CRYPTOSUITE {
        return Err(SuiteError::transformation(
            operation,
            format!(
                "expected type {PROOF_TYPE:?} with cryptosuite {CRYPTOSUITE:?}, \
                 got {proof_type:?}/{cryptosuite:?}"
            ),
        ));
    }
    Ok(())
}

/// Parse a pointer list, surfacing `PROOF_GENERATION_ERROR` on malformed
/// entries.
pub(crate) fn parse_pointers(raw: &[String]) -> Result<Vec<JsonPointer>> {
    raw.iter().map(|p| JsonPointer::parse(p)).collect()
}

/// Canonicalize the document under a fresh HMAC key and partition its
/// statements under the mandatory pointers.
pub fn transform(
    processor: &dyn JsonLdProcessor,
    unsecured_document: &Value,
    options: &ProofOptions,
    mandatory_pointers: &[String],
) -> Result<TransformedDocument> {
    ensure_suite("base::transform", &options.proof_type, &options.cryptosuite)?;
    let hmac_key = HmacIdShuffler::generate_key();
    transform_with_key(processor, unsecured_document, mandatory_pointers, hmac_key)
}

pub(crate) fn transform_with_key(
    processor: &dyn JsonLdProcessor,
    unsecured_document: &Value,
    mandatory_pointers: &[String],
    hmac_key: [u8; HMAC_KEY_LENGTH],
) -> Result<TransformedDocument> {
    let shuffler = HmacIdShuffler::new(hmac_key);
    let pointers = parse_pointers(mandatory_pointers)?;
    let mut groups = BTreeMap::new();
    groups.insert("mandatory".to_string(), pointers);
    let mut grouped =
        canonicalize_and_group(processor, &shuffler, unsecured_document, &groups)?;
    let group = grouped.groups.remove("mandatory").unwrap_or_default();
    debug!(
        mandatory = group.matching.len(),
        non_mandatory = group.non_matching.len(),
        "transformed document into statement partition"
    );
    Ok(TransformedDocument {
        mandatory_pointers: mandatory_pointers.to_vec(),
        mandatory: group.matching,
        non_mandatory: group.non_matching,
        hmac_key,
    })
}

/// Build the proof-configuration JSON for canonicalization: the proof
/// fields without `proofValue`, under the document's `@context`.
fn proof_config_value(
    document: &Value,
    proof_type: &str,
    cryptosuite: &str,
    created: Option<&str>,
    verification_method: &str,
    proof_purpose: Option<&str>,
) -> Value {
    let mut config = Map::new();
    if let Some(context) = document.get("@context") {
        config.insert("@context".to_string(), context.clone());
    }
    config.insert("type".to_string(), Value::String(proof_type.to_string()));
    config.insert(
        "cryptosuite".to_string(),
        Value::String(cryptosuite.to_string()),
    );
    if let Some(created) = created {
        config.insert("created".to_string(), Value::String(created.to_string()));
    }
    config.insert(
        "verificationMethod".to_string(),
        Value::String(verification_method.to_string()),
    );
    if let Some(purpose) = proof_purpose {
        config.insert(
            "proofPurpose".to_string(),
            Value::String(purpose.to_string()),
        );
    }
    Value::Object(config)
}

/// Validate the proof options and canonicalize the proof configuration to
/// its joined N-Quads form.
pub fn canonicalize_proof_config(
    processor: &dyn JsonLdProcessor,
    unsecured_document: &Value,
    options: &ProofOptions,
) -> Result<String> {
    ensure_suite(
        "base::canonicalize_proof_config",
        &options.proof_type,
        &options.cryptosuite,
    )?;
    if let Some(created) = &options.created {
        DateTime::parse_from_rfc3339(created).map_err(|e| {
            SuiteError::generation(
                "base::canonicalize_proof_config",
                format!("invalid created timestamp {created:?}: {e}"),
            )
        })?;
    }
    let config = proof_config_value(
        unsecured_document,
        &options.proof_type,
        &options.cryptosuite,
        options.created.as_deref(),
        &options.verification_method,
        options.proof_purpose.as_deref(),
    );
    let quads = canonicalize_plain(processor, &config)?;
    Ok(join(&quads))
}

/// Canonicalize the configuration of a received proof (its fields minus
/// `proofValue`) under the document's context.
pub(crate) fn canonicalize_received_proof_config(
    processor: &dyn JsonLdProcessor,
    document: &Value,
    proof: &Proof,
) -> Result<String> {
    let config = proof_config_value(
        document,
        &proof.proof_type,
        &proof.cryptosuite,
        proof.created.as_deref(),
        &proof.verification_method,
        proof.proof_purpose.as_deref(),
    );
    let quads = canonicalize_plain(processor, &config)?;
    Ok(join(&quads))
}

pub(crate) fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Compute the proof-config and mandatory hashes. The two digests are
/// independent and run concurrently.
pub async fn hash(
    canonical_proof_config: String,
    transformed: TransformedDocument,
) -> HashData {
    let mandatory_joined: String = transformed.mandatory.values().cloned().collect();
    let (proof_hash, mandatory_hash) = tokio::join!(
        async move { sha256(canonical_proof_config.as_bytes()) },
        async move { sha256(mandatory_joined.as_bytes()) },
    );
    HashData {
        transformed,
        proof_hash,
        mandatory_hash,
    }
}

/// Resolve the issuer's keypair through the document loader.
pub(crate) async fn resolve_keypair(
    loader: &dyn DocumentLoader,
    verification_method: &str,
) -> Result<Keypair> {
    let document = loader.load(verification_method).await?;
    Keypair::import(&document, &ImportOptions::default()).map_err(|e| {
        SuiteError::verification_method(
            "base::resolve_keypair",
            format!("cannot import {verification_method:?}: {e}"),
        )
    })
}

fn key_bytes<const N: usize>(
    operation: &'static str,
    material: Option<&sdvc_crypto::KeyMaterial>,
    what: &str,
) -> Result<[u8; N]> {
    let material = material.ok_or_else(|| {
        SuiteError::verification_method(operation, format!("verification method lacks a {what}"))
    })?;
    let mut out = [0u8; N];
    let bytes = material.as_bytes();
    if bytes.len() != N {
        return Err(SuiteError::verification_method(
            operation,
            format!("{what} has unexpected length {}", bytes.len()),
        ));
    }
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Sign the non-mandatory statements and envelope the base proof value.
pub async fn serialize_base_proof(
    loader: &dyn DocumentLoader,
    bbs: &dyn BbsSignatures,
    hash_data: &HashData,
    options: &ProofOptions,
    features: &FeatureOptions,
) -> Result<String> {
    const OP: &str = "base::serialize_base_proof";
    let keypair = resolve_keypair(loader, &options.verification_method).await?;
    let secret_key = key_bytes::<32>(OP, keypair.secret_key(), "secret key")?;
    let public_key = key_bytes::<96>(OP, keypair.public_key(), "public key")?;

    let bbs_header = hash_data.bbs_header();
    let messages: Vec<Vec<u8>> = hash_data
        .transformed
        .non_mandatory
        .values()
        .map(|quad| quad.as_bytes().to_vec())
        .collect();

    let require = |input: &Option<Vec<u8>>, what: &str| -> Result<Vec<u8>> {
        input.clone().ok_or_else(|| {
            SuiteError::generation(OP, format!("{:?} requires {what}", features.feature))
        })
    };

    let bbs_signature = match features.feature {
        Feature::Baseline => bbs.sign(&secret_key, &public_key, &bbs_header, &messages)?,
        Feature::AnonymousHolderBinding => {
            let commitment = require(&features.commitment_with_proof, "commitmentWithProof")?;
            bbs.blind_sign(&secret_key, &public_key, &commitment, &bbs_header, &messages)?
        }
        Feature::Pseudonym | Feature::HolderBindingPseudonym => {
            let entropy = require(&features.signer_nym_entropy, "signerNymEntropy")?;
            let commitment = require(&features.commitment_with_proof, "commitmentWithProof")?;
            bbs.pseudonym_sign(
                &secret_key,
                &public_key,
                &entropy,
                &commitment,
                &bbs_header,
                &messages,
            )?
        }
    };
    debug!(
        feature = ?features.feature,
        messages = messages.len(),
        "produced base BBS signature"
    );

    serialize_base_proof_value(&BaseProofValue {
        bbs_signature,
        bbs_header,
        public_key,
        hmac_key: hash_data.transformed.hmac_key,
        mandatory_pointers: hash_data.transformed.mandatory_pointers.clone(),
        feature: features.feature,
        signer_nym_entropy: features
            .feature
            .carries_nym_entropy()
            .then(|| features.signer_nym_entropy.clone())
            .flatten(),
    })
}

/// The full issuer pipeline: transform, hash, sign, and envelope.
pub async fn create_base_proof(
    processor: &dyn JsonLdProcessor,
    loader: &dyn DocumentLoader,
    bbs: &dyn BbsSignatures,
    unsecured_document: &Value,
    options: &ProofOptions,
    mandatory_pointers: &[String],
    features: &FeatureOptions,
) -> Result<Proof> {
    let transformed = transform(processor, unsecured_document, options, mandatory_pointers)?;
    let canonical_config = canonicalize_proof_config(processor, unsecured_document, options)?;
    let hash_data = hash(canonical_config, transformed).await;
    let proof_value = serialize_base_proof(loader, bbs, &hash_data, options, features).await?;
    Ok(options.to_proof(proof_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::BasicProcessor;
    use serde_json::json;

    fn options() -> ProofOptions {
        ProofOptions::new("did:example:issuer#key")
    }

    fn document() -> Value {
        json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "type": "VerifiableCredential",
            "issuer": "did:example:issuer",
            "credentialSubject": {"type": "Person", "name": "Jane Doe"}
        })
    }

    #[test]
    fn transform_partitions_by_mandatory_pointers() {
        let processor = BasicProcessor::new();
        let transformed = transform(
            &processor,
            &document(),
            &options(),
            &["/issuer".to_string()],
        )
        .unwrap();
        assert!(!transformed.mandatory.is_empty());
        assert!(!transformed.non_mandatory.is_empty());
        assert!(transformed
            .mandatory
            .values()
            .any(|quad| quad.contains("did:example:issuer")));
    }

    #[test]
    fn transform_rejects_wrong_suite() {
        let processor = BasicProcessor::new();
        let mut bad = options();
        bad.cryptosuite = "ecdsa-sd-2023".to_string();
        let err = transform(&processor, &document(), &bad, &[]).unwrap_err();
        assert_eq!(err.code(), sdvc_core::ErrorCode::ProofTransformation);

        let mut bad = options();
        bad.proof_type = "Ed25519Signature2020".to_string();
        assert!(transform(&processor, &document(), &bad, &[]).is_err());
    }

    #[test]
    fn proof_config_is_deterministic_and_covers_fields() {
        let processor = BasicProcessor::new();
        let a = canonicalize_proof_config(&processor, &document(), &options()).unwrap();
        let b = canonicalize_proof_config(&processor, &document(), &options()).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("bbs-2023"));
        assert!(a.contains("did:example:issuer#key"));

        let mut dated = options();
        dated.created = Some("2026-01-01T00:00:00Z".to_string());
        let c = canonicalize_proof_config(&processor, &document(), &dated).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn proof_config_rejects_invalid_created() {
        let processor = BasicProcessor::new();
        let mut bad = options();
        bad.created = Some("January 1st".to_string());
        let err = canonicalize_proof_config(&processor, &document(), &bad).unwrap_err();
        assert_eq!(err.code(), sdvc_core::ErrorCode::ProofGeneration);
    }

    #[tokio::test]
    async fn hash_binds_both_digests() {
        let processor = BasicProcessor::new();
        let transformed = transform(
            &processor,
            &document(),
            &options(),
            &["/issuer".to_string()],
        )
        .unwrap();
        let config = canonicalize_proof_config(&processor, &document(), &options()).unwrap();
        let hash_data = hash(config.clone(), transformed.clone()).await;
        assert_eq!(hash_data.proof_hash, sha256(config.as_bytes()));
        let mandatory_joined: String = transformed.mandatory.values().cloned().collect();
        assert_eq!(hash_data.mandatory_hash, sha256(mandatory_joined.as_bytes()));
        let header = hash_data.bbs_header();
        assert_eq!(&header[..32], &hash_data.proof_hash);
        assert_eq!(&header[32..], &hash_data.mandatory_hash);
    }
}
