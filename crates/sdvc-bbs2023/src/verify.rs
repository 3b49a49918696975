//! # Verification Pipeline
//!
//! Parses a disclosure proof, recanonicalizes the revealed document under
//! the proof's label map, reconstructs the BBS header and disclosed
//! messages, and invokes the feature-appropriate BBS proof verifier.
//!
//! Malformed inputs surface `PROOF_VERIFICATION_ERROR`; a well-formed
//! proof that fails cryptographic verification yields `Ok(false)`.

use serde_json::Value;
use tracing::debug;

use sdvc_core::nquads::join;
use sdvc_core::{Result, SuiteError};
use sdvc_crypto::bbs::BBS_HEADER_LENGTH;
use sdvc_crypto::{BbsSignatures, KeyFlag, PUBLIC_KEY_LENGTH};

use crate::base::{canonicalize_received_proof_config, resolve_keypair, sha256};
use crate::envelope::parse_derived_proof_value;
use crate::feature::Feature;
use crate::group::canonicalize_with_label_map;
use crate::proof::{Proof, CRYPTOSUITE, PROOF_TYPE};
use crate::traits::{DocumentLoader, JsonLdProcessor};

const OP: &str = "verify::verify_proof";

/// Verify a disclosure proof over a revealed document.
pub async fn verify_proof(
    processor: &dyn JsonLdProcessor,
    loader: &dyn DocumentLoader,
    bbs: &dyn BbsSignatures,
    document: &Value,
    proof: &Proof,
) -> Result<bool> {
    if proof.proof_type != PROOF_TYPE || proof.cryptosuite != CRYPTOSUITE {
        return Err(SuiteError::verification(
            OP,
            format!(
                "proof is not a {CRYPTOSUITE} {PROOF_TYPE}: {:?}/{:?}",
                proof.proof_type, proof.cryptosuite
            ),
        ));
    }
    let proof_value = proof
        .proof_value
        .as_deref()
        .ok_or_else(|| SuiteError::verification(OP, "proof carries no proofValue"))?;

    let canonical_config = canonicalize_received_proof_config(processor, document, proof)
        .map_err(|e| SuiteError::verification(OP, e.message().to_string()))?;
    let proof_hash = sha256(canonical_config.as_bytes());

    let derived = parse_derived_proof_value(proof_value)?;

    let keypair = resolve_keypair(loader, &proof.verification_method).await?;
    let public_material = keypair.public_key().ok_or_else(|| {
        SuiteError::verification_method(OP, "verification method lacks a public key")
    })?;
    if public_material.flag() != KeyFlag::Public {
        return Err(SuiteError::verification_method(OP, "expected public key material"));
    }
    let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
    public_key.copy_from_slice(public_material.as_bytes());

    // Reproduce the holder-assigned labeling and split the revealed
    // statements back into mandatory and disclosed groups.
    let canonical_nquads = canonicalize_with_label_map(processor, document, &derived.label_map)?;
    let mut mandatory = Vec::new();
    let mut disclosed = Vec::new();
    let mut mandatory_cursor = derived.mandatory_indexes.iter().peekable();
    for (index, quad) in canonical_nquads.iter().enumerate() {
        if mandatory_cursor.peek() == Some(&&index) {
            mandatory_cursor.next();
            mandatory.push(quad.clone());
        } else {
            disclosed.push(quad.clone());
        }
    }
    if mandatory_cursor.peek().is_some() {
        return Err(SuiteError::verification(
            OP,
            format!(
                "mandatory indexes exceed the {} revealed statements",
                canonical_nquads.len()
            ),
        ));
    }

    let mandatory_hash = sha256(join(&mandatory).as_bytes());
    let mut bbs_header = [0u8; BBS_HEADER_LENGTH];
    bbs_header[..32].copy_from_slice(&proof_hash);
    bbs_header[32..].copy_from_slice(&mandatory_hash);
    let disclosed_messages: Vec<Vec<u8>> = disclosed
        .iter()
        .map(|quad| quad.as_bytes().to_vec())
        .collect();
    debug!(
        feature = ?derived.feature,
        mandatory = mandatory.len(),
        disclosed = disclosed_messages.len(),
        "reconstructed verification data"
    );

    match derived.feature {
        Feature::Baseline => bbs.proof_verify(
            &public_key,
            &derived.bbs_proof,
            &bbs_header,
            &derived.presentation_header,
            &disclosed_messages,
            &derived.selective_indexes,
        ),
        Feature::AnonymousHolderBinding => {
            let message_count = derived.length_bbs_messages.ok_or_else(|| {
                SuiteError::verification(OP, "derived proof carries no lengthBBSMessages")
            })?;
            bbs.blind_proof_verify(
                &public_key,
                &derived.bbs_proof,
                &bbs_header,
                &derived.presentation_header,
                message_count,
                &disclosed_messages,
                &derived.selective_indexes,
            )
        }
        Feature::Pseudonym | Feature::HolderBindingPseudonym => {
            let message_count = derived.length_bbs_messages.ok_or_else(|| {
                SuiteError::verification(OP, "derived proof carries no lengthBBSMessages")
            })?;
            let nym_domain = derived.nym_domain.as_deref().ok_or_else(|| {
                SuiteError::verification(OP, "derived proof carries no nymDomain")
            })?;
            let pseudonym = derived.pseudonym.as_deref().ok_or_else(|| {
                SuiteError::verification(OP, "derived proof carries no pseudonym")
            })?;
            bbs.pseudonym_proof_verify(
                &public_key,
                &derived.bbs_proof,
                &bbs_header,
                &derived.presentation_header,
                message_count,
                nym_domain,
                pseudonym,
                &disclosed_messages,
                &derived.selective_indexes,
            )
        }
    }
}
