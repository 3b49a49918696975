//! # Derivation Pipeline (Holder)
//!
//! Parses a base proof, deterministically recomputes the issuer's
//! canonical grouping from the carried HMAC key, maps the mandatory and
//! selectively-revealed statements into the index spaces the verifier
//! will reconstruct, produces the BBS disclosure proof, and builds the
//! reveal document.
//!
//! Two canonicalizations run here. The shuffled labeling reproduces the
//! issuer's (private) label space; a second, plain canonicalization of
//! the combined statements yields the labels the verifier will compute,
//! and the emitted label map bridges the two spaces.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use sdvc_core::{JsonPointer, LabelMap, Result, SuiteError};
use sdvc_crypto::BbsSignatures;

use crate::base::parse_pointers;
use crate::envelope::{
    parse_base_proof_value, serialize_derived_proof_value, DerivedProofValue,
};
use crate::feature::Feature;
use crate::group::{canonicalize_and_group, Group, GroupedCanonicalization};
use crate::hmac_shuffle::HmacIdShuffler;
use crate::proof::{DeriveOptions, Proof, CRYPTOSUITE, PROOF_TYPE};
use crate::select::select_json_ld;
use crate::traits::JsonLdProcessor;

const OP: &str = "derive::derive_proof";

/// A reveal document together with its disclosure proof.
#[derive(Debug, Clone)]
pub struct DerivedCredential {
    /// The selectively-revealed document.
    pub reveal_document: Value,
    /// The disclosure proof over it.
    pub proof: Proof,
}

/// Derive a disclosure proof from a base proof.
pub fn derive_proof(
    processor: &dyn JsonLdProcessor,
    bbs: &dyn BbsSignatures,
    document: &Value,
    proof: &Proof,
    options: &DeriveOptions,
) -> Result<DerivedCredential> {
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
    let base = parse_base_proof_value(proof_value)?;

    // Rebuild the issuer's grouping, extended with the selective and
    // combined groups.
    let shuffler = HmacIdShuffler::new(base.hmac_key);
    let mandatory_pointers = parse_pointers(&base.mandatory_pointers)?;
    let selective_pointers = parse_pointers(&options.selective_pointers)?;
    let combined_pointers: Vec<JsonPointer> = mandatory_pointers
        .iter()
        .chain(&selective_pointers)
        .cloned()
        .collect();
    if combined_pointers.is_empty() {
        return Err(SuiteError::generation(OP, "nothing selected for disclosure"));
    }
    let mut group_pointers = BTreeMap::new();
    group_pointers.insert("mandatory".to_string(), mandatory_pointers);
    group_pointers.insert("selective".to_string(), selective_pointers);
    group_pointers.insert("combined".to_string(), combined_pointers.clone());
    let grouped = canonicalize_and_group(processor, &shuffler, document, &group_pointers)?;

    let mandatory = &grouped.groups["mandatory"];
    let selective = &grouped.groups["selective"];
    let combined = &grouped.groups["combined"];

    let mandatory_indexes = mandatory_within_combined(mandatory, combined)?;
    let selective_indexes = selective_within_non_mandatory(selective, mandatory);
    let messages: Vec<Vec<u8>> = mandatory
        .non_matching
        .values()
        .map(|quad| quad.as_bytes().to_vec())
        .collect();
    debug!(
        mandatory = mandatory_indexes.len(),
        revealed = selective_indexes.len(),
        messages = messages.len(),
        feature = ?base.feature,
        "computed disclosure data"
    );

    let require = |input: &Option<Vec<u8>>, what: &str| -> Result<Vec<u8>> {
        input.clone().ok_or_else(|| {
            SuiteError::generation(OP, format!("{:?} requires {what}", base.feature))
        })
    };

    let mut nym_domain = None;
    let mut pseudonym = None;
    let mut length_bbs_messages = None;
    let bbs_proof = match base.feature {
        Feature::Baseline => bbs.proof_gen(
            &base.public_key,
            &base.bbs_signature,
            &base.bbs_header,
            &options.presentation_header,
            &messages,
            &selective_indexes,
        )?,
        Feature::AnonymousHolderBinding => {
            let holder_secret = require(&options.holder_secret, "holderSecret")?;
            let prover_blind = require(&options.prover_blind, "proverBlind")?;
            length_bbs_messages = Some(messages.len());
            bbs.blind_proof_gen(
                &base.public_key,
                &base.bbs_signature,
                &base.bbs_header,
                &options.presentation_header,
                &messages,
                &selective_indexes,
                &holder_secret,
                &prover_blind,
            )?
        }
        Feature::Pseudonym | Feature::HolderBindingPseudonym => {
            let domain = require(&options.nym_domain, "nymDomain")?;
            let entropy = base.signer_nym_entropy.clone().ok_or_else(|| {
                SuiteError::verification(OP, "base proof carries no signerNymEntropy")
            })?;
            let committed_messages = if base.feature == Feature::HolderBindingPseudonym {
                vec![require(&options.holder_secret, "holderSecret")?]
            } else {
                Vec::new()
            };
            length_bbs_messages = Some(messages.len());
            let output = bbs.pseudonym_proof_gen(
                &base.public_key,
                &base.bbs_signature,
                &base.bbs_header,
                &options.presentation_header,
                &messages,
                &selective_indexes,
                &entropy,
                &domain,
                &committed_messages,
            )?;
            nym_domain = Some(domain);
            pseudonym = Some(output.pseudonym);
            output.proof
        }
    };

    let reveal_document = select_json_ld(document, &combined_pointers)?
        .ok_or_else(|| SuiteError::generation(OP, "nothing selected for disclosure"))?;

    let verifier_label_map = bridge_label_maps(processor, &grouped, combined)?;

    let proof_value = serialize_derived_proof_value(&DerivedProofValue {
        bbs_proof,
        label_map: verifier_label_map,
        mandatory_indexes,
        selective_indexes,
        presentation_header: options.presentation_header.clone(),
        feature: base.feature,
        nym_domain,
        pseudonym,
        length_bbs_messages,
    })?;

    let mut derived = proof.clone();
    derived.proof_value = Some(proof_value);
    Ok(DerivedCredential {
        reveal_document,
        proof: derived,
    })
}

/// Positions of the mandatory statements within the combined group's
/// matching statements. The combined pointers extend the mandatory ones,
/// so every mandatory statement must appear.
fn mandatory_within_combined(mandatory: &Group, combined: &Group) -> Result<Vec<usize>> {
    let positions: BTreeMap<usize, usize> = combined
        .matching
        .keys()
        .enumerate()
        .map(|(position, &key)| (key, position))
        .collect();
    mandatory
        .matching
        .keys()
        .map(|key| {
            positions.get(key).copied().ok_or_else(|| {
                SuiteError::generation(
                    OP,
                    "mandatory statement missing from the combined group",
                )
            })
        })
        .collect()
}

/// Positions of the selectively-revealed statements within the
/// non-mandatory list. Statements that are also mandatory are already
/// covered by the mandatory indexes and are skipped.
fn selective_within_non_mandatory(selective: &Group, mandatory: &Group) -> Vec<usize> {
    let positions: BTreeMap<usize, usize> = mandatory
        .non_matching
        .keys()
        .enumerate()
        .map(|(position, &key)| (key, position))
        .collect();
    selective
        .matching
        .keys()
        .filter_map(|key| positions.get(key).copied())
        .collect()
}

/// Map verifier-side canonical labels to the holder-assigned labels: the
/// verifier will canonicalize the reveal document without shuffling, so
/// its labels are bridged through a plain canonicalization of the same
/// statements.
fn bridge_label_maps(
    processor: &dyn JsonLdProcessor,
    grouped: &GroupedCanonicalization,
    combined: &Group,
) -> Result<LabelMap> {
    let canonical_id_map = processor.canonical_label_map(&combined.deskolemized_nquads)?;
    let mut verifier_label_map = LabelMap::new();
    for (input_label, verifier_label) in &canonical_id_map {
        let holder_label = grouped.label_map.get(input_label).ok_or_else(|| {
            SuiteError::generation(
                OP,
                format!("no holder label for input blank node {input_label:?}"),
            )
        })?;
        verifier_label_map.insert(
            verifier_label.trim_start_matches("_:").to_string(),
            holder_label.clone(),
        );
    }
    Ok(verifier_label_map)
}
