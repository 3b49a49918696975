//! # Proof-Value Envelope
//!
//! Base and derived proof values travel as a 3-byte feature-tagged header
//! (`0xD9 0x5D` plus the feature byte) followed by a CBOR positional
//! array, the whole multibase-encoded as base64url without padding (the
//! `u` sentinel).
//!
//! Parsing validates, in order: the multibase sentinel, the tag prefix,
//! the feature byte, the array arity for that feature, and every
//! element's type and fixed length. Any mismatch surfaces
//! `PROOF_VERIFICATION_ERROR`; serialization-side invariant violations
//! surface `PROOF_GENERATION_ERROR`.

use std::collections::BTreeMap;

use ciborium::value::{Integer, Value as Cbor};
use multibase::Base;

use sdvc_core::{LabelMap, Result, SuiteError};
use sdvc_crypto::bbs::{PublicKey, Signature, BBS_HEADER_LENGTH, SIGNATURE_LENGTH};
use sdvc_crypto::PUBLIC_KEY_LENGTH;

use crate::feature::Feature;
use crate::hmac_shuffle::HMAC_KEY_LENGTH;

/// The two fixed bytes every proof-value header starts with (CBOR tag
/// prefix).
pub const CBOR_TAG_PREFIX: [u8; 2] = [0xd9, 0x5d];

/// The decoded components of a base proof value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseProofValue {
    /// The BBS signature over header and non-mandatory messages.
    pub bbs_signature: Signature,
    /// `proofHash || mandatoryHash`.
    pub bbs_header: [u8; BBS_HEADER_LENGTH],
    /// The issuer's compressed G2 public key.
    pub public_key: PublicKey,
    /// The HMAC key behind the blank-node label shuffle.
    pub hmac_key: [u8; HMAC_KEY_LENGTH],
    /// The issuer's mandatory pointers.
    pub mandatory_pointers: Vec<String>,
    /// The feature the proof was produced under.
    pub feature: Feature,
    /// Signer-contributed pseudonym entropy (pseudonym features only).
    pub signer_nym_entropy: Option<Vec<u8>>,
}

/// The decoded components of a derived (disclosure) proof value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedProofValue {
    /// The BBS disclosure proof.
    pub bbs_proof: Vec<u8>,
    /// Verifier-side canonical label → holder-assigned label.
    pub label_map: LabelMap,
    /// Positions of mandatory statements within the revealed list.
    pub mandatory_indexes: Vec<usize>,
    /// Positions of revealed statements within the non-mandatory list.
    pub selective_indexes: Vec<usize>,
    /// The holder's presentation header.
    pub presentation_header: Vec<u8>,
    /// The feature the proof was produced under.
    pub feature: Feature,
    /// The verifier domain the pseudonym is bound to.
    pub nym_domain: Option<Vec<u8>>,
    /// The disclosed pseudonym.
    pub pseudonym: Option<Vec<u8>>,
    /// The signer-side message count (non-baseline features).
    pub length_bbs_messages: Option<usize>,
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

fn encode_envelope(header_byte: u8, components: Vec<Cbor>) -> Result<String> {
    let mut bytes = vec![CBOR_TAG_PREFIX[0], CBOR_TAG_PREFIX[1], header_byte];
    ciborium::ser::into_writer(&Cbor::Array(components), &mut bytes).map_err(|e| {
        SuiteError::generation("envelope::encode", format!("CBOR encoding failed: {e}"))
    })?;
    Ok(multibase::encode(Base::Base64Url, bytes))
}

fn index_array(indexes: &[usize]) -> Cbor {
    Cbor::Array(
        indexes
            .iter()
            .map(|&i| Cbor::Integer(Integer::from(i as u64)))
            .collect(),
    )
}

fn check_ascending(operation: &'static str, what: &str, indexes: &[usize]) -> Result<()> {
    for window in indexes.windows(2) {
        if window[1] <= window[0] {
            return Err(SuiteError::new(
                sdvc_core::ErrorCode::ProofGeneration,
                operation,
                format!("{what} must be strictly ascending"),
            ));
        }
    }
    Ok(())
}

/// Serialize a base proof value into its multibase envelope.
pub fn serialize_base_proof_value(value: &BaseProofValue) -> Result<String> {
    const OP: &str = "envelope::serialize_base_proof_value";
    if value.feature.carries_nym_entropy() != value.signer_nym_entropy.is_some() {
        return Err(SuiteError::generation(
            OP,
            "signerNymEntropy must be present exactly for pseudonym features",
        ));
    }
    let mut components = vec![
        Cbor::Bytes(value.bbs_signature.to_vec()),
        Cbor::Bytes(value.bbs_header.to_vec()),
        Cbor::Bytes(value.public_key.to_vec()),
        Cbor::Bytes(value.hmac_key.to_vec()),
        Cbor::Array(
            value
                .mandatory_pointers
                .iter()
                .map(|p| Cbor::Text(p.clone()))
                .collect(),
        ),
    ];
    if let Some(entropy) = &value.signer_nym_entropy {
        components.push(Cbor::Bytes(entropy.clone()));
    }
    encode_envelope(value.feature.base_header_byte(), components)
}

/// Serialize a derived proof value into its multibase envelope.
pub fn serialize_derived_proof_value(value: &DerivedProofValue) -> Result<String> {
    const OP: &str = "envelope::serialize_derived_proof_value";
    check_ascending(OP, "mandatoryIndexes", &value.mandatory_indexes)?;
    check_ascending(OP, "selectiveIndexes", &value.selective_indexes)?;
    if value.feature.carries_message_count() != value.length_bbs_messages.is_some() {
        return Err(SuiteError::generation(
            OP,
            "lengthBBSMessages must be present exactly for non-baseline features",
        ));
    }
    if value.feature.carries_pseudonym()
        != (value.nym_domain.is_some() && value.pseudonym.is_some())
    {
        return Err(SuiteError::generation(
            OP,
            "nymDomain and pseudonym must be present exactly for pseudonym features",
        ));
    }
    let compressed = value.label_map.compress()?;
    let mut components = vec![
        Cbor::Bytes(value.bbs_proof.clone()),
        Cbor::Map(
            compressed
                .iter()
                .map(|(&k, &v)| {
                    (
                        Cbor::Integer(Integer::from(k)),
                        Cbor::Integer(Integer::from(v)),
                    )
                })
                .collect(),
        ),
        index_array(&value.mandatory_indexes),
        index_array(&value.selective_indexes),
        Cbor::Bytes(value.presentation_header.clone()),
    ];
    match value.feature {
        Feature::Baseline => {}
        Feature::AnonymousHolderBinding => {
            if let Some(count) = value.length_bbs_messages {
                components.push(Cbor::Integer(Integer::from(count as u64)));
            }
        }
        Feature::Pseudonym | Feature::HolderBindingPseudonym => {
            if let (Some(domain), Some(pseudonym), Some(count)) = (
                &value.nym_domain,
                &value.pseudonym,
                value.length_bbs_messages,
            ) {
                components.push(Cbor::Bytes(domain.clone()));
                components.push(Cbor::Bytes(pseudonym.clone()));
                components.push(Cbor::Integer(Integer::from(count as u64)));
            }
        }
    }
    encode_envelope(value.feature.derived_header_byte(), components)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const PARSE_BASE: &str = "envelope::parse_base_proof_value";
const PARSE_DERIVED: &str = "envelope::parse_derived_proof_value";

fn decode_envelope(operation: &'static str, encoded: &str) -> Result<(u8, Vec<Cbor>)> {
    if !encoded.starts_with('u') {
        return Err(SuiteError::verification(
            operation,
            "proofValue must be multibase base64url (the 'u' sentinel)",
        ));
    }
    let (_, bytes) = multibase::decode(encoded).map_err(|e| {
        SuiteError::verification(operation, format!("malformed multibase payload: {e}"))
    })?;
    if bytes.len() < 4 || bytes[..2] != CBOR_TAG_PREFIX {
        return Err(SuiteError::verification(
            operation,
            "proofValue does not start with the CBOR tag prefix 0xd95d",
        ));
    }
    let value: Cbor = ciborium::de::from_reader(&bytes[3..]).map_err(|e| {
        SuiteError::verification(operation, format!("malformed CBOR payload: {e}"))
    })?;
    let Cbor::Array(components) = value else {
        return Err(SuiteError::verification(
            operation,
            "proofValue payload must be a CBOR array",
        ));
    };
    Ok((bytes[2], components))
}

fn expect_bytes(
    operation: &'static str,
    what: &str,
    value: &Cbor,
    fixed_len: Option<usize>,
) -> Result<Vec<u8>> {
    let Cbor::Bytes(bytes) = value else {
        return Err(SuiteError::verification(
            operation,
            format!("{what} must be a CBOR byte string"),
        ));
    };
    if let Some(expected) = fixed_len {
        if bytes.len() != expected {
            return Err(SuiteError::verification(
                operation,
                format!("{what} must be {expected} bytes, got {}", bytes.len()),
            ));
        }
    }
    Ok(bytes.clone())
}

fn fixed_bytes<const N: usize>(
    operation: &'static str,
    what: &str,
    value: &Cbor,
) -> Result<[u8; N]> {
    let bytes = expect_bytes(operation, what, value, Some(N))?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn expect_uint(operation: &'static str, what: &str, value: &Cbor) -> Result<usize> {
    let Cbor::Integer(integer) = value else {
        return Err(SuiteError::verification(
            operation,
            format!("{what} must be a CBOR integer"),
        ));
    };
    let n = i128::from(*integer);
    if n < 0 || n > usize::MAX as i128 {
        return Err(SuiteError::verification(
            operation,
            format!("{what} must be a non-negative integer"),
        ));
    }
    Ok(n as usize)
}

fn expect_text_array(operation: &'static str, what: &str, value: &Cbor) -> Result<Vec<String>> {
    let Cbor::Array(items) = value else {
        return Err(SuiteError::verification(
            operation,
            format!("{what} must be a CBOR array"),
        ));
    };
    items
        .iter()
        .map(|item| match item {
            Cbor::Text(text) => Ok(text.clone()),
            _ => Err(SuiteError::verification(
                operation,
                format!("{what} entries must be CBOR text strings"),
            )),
        })
        .collect()
}

fn expect_index_array(operation: &'static str, what: &str, value: &Cbor) -> Result<Vec<usize>> {
    let Cbor::Array(items) = value else {
        return Err(SuiteError::verification(
            operation,
            format!("{what} must be a CBOR array"),
        ));
    };
    let indexes: Vec<usize> = items
        .iter()
        .map(|item| expect_uint(operation, what, item))
        .collect::<Result<_>>()?;
    for window in indexes.windows(2) {
        if window[1] <= window[0] {
            return Err(SuiteError::verification(
                operation,
                format!("{what} must be strictly ascending"),
            ));
        }
    }
    Ok(indexes)
}

fn expect_label_map(operation: &'static str, value: &Cbor) -> Result<LabelMap> {
    let Cbor::Map(entries) = value else {
        return Err(SuiteError::verification(
            operation,
            "labelMap must be a CBOR map",
        ));
    };
    let mut compressed = BTreeMap::new();
    for (key, val) in entries {
        let k = expect_uint(operation, "labelMap key", key)? as u64;
        let v = expect_uint(operation, "labelMap value", val)? as u64;
        compressed.insert(k, v);
    }
    Ok(LabelMap::decompress(&compressed))
}

/// Parse a base proof value from its multibase envelope.
pub fn parse_base_proof_value(encoded: &str) -> Result<BaseProofValue> {
    let (header_byte, components) = decode_envelope(PARSE_BASE, encoded)?;
    let feature = Feature::from_base_header_byte(header_byte)
        .map_err(|e| SuiteError::verification(PARSE_BASE, e.message().to_string()))?;
    if components.len() != feature.base_component_count() {
        return Err(SuiteError::verification(
            PARSE_BASE,
            format!(
                "base proof for {feature:?} must have {} components, got {}",
                feature.base_component_count(),
                components.len()
            ),
        ));
    }
    let bbs_signature = fixed_bytes::<SIGNATURE_LENGTH>(PARSE_BASE, "bbsSignature", &components[0])?;
    let bbs_header = fixed_bytes::<BBS_HEADER_LENGTH>(PARSE_BASE, "bbsHeader", &components[1])?;
    let public_key = fixed_bytes::<PUBLIC_KEY_LENGTH>(PARSE_BASE, "publicKey", &components[2])?;
    let hmac_key = fixed_bytes::<HMAC_KEY_LENGTH>(PARSE_BASE, "hmacKey", &components[3])?;
    let mandatory_pointers = expect_text_array(PARSE_BASE, "mandatoryPointers", &components[4])?;
    let signer_nym_entropy = if feature.carries_nym_entropy() {
        Some(expect_bytes(PARSE_BASE, "signerNymEntropy", &components[5], None)?)
    } else {
        None
    };
    Ok(BaseProofValue {
        bbs_signature,
        bbs_header,
        public_key,
        hmac_key,
        mandatory_pointers,
        feature,
        signer_nym_entropy,
    })
}

/// Parse a derived proof value from its multibase envelope.
pub fn parse_derived_proof_value(encoded: &str) -> Result<DerivedProofValue> {
    let (header_byte, components) = decode_envelope(PARSE_DERIVED, encoded)?;
    let feature = Feature::from_derived_header_byte(header_byte)
        .map_err(|e| SuiteError::verification(PARSE_DERIVED, e.message().to_string()))?;
    if components.len() != feature.derived_component_count() {
        return Err(SuiteError::verification(
            PARSE_DERIVED,
            format!(
                "derived proof for {feature:?} must have {} components, got {}",
                feature.derived_component_count(),
                components.len()
            ),
        ));
    }
    let bbs_proof = expect_bytes(PARSE_DERIVED, "bbsProof", &components[0], None)?;
    let label_map = expect_label_map(PARSE_DERIVED, &components[1])?;
    let mandatory_indexes =
        expect_index_array(PARSE_DERIVED, "mandatoryIndexes", &components[2])?;
    let selective_indexes =
        expect_index_array(PARSE_DERIVED, "selectiveIndexes", &components[3])?;
    let presentation_header =
        expect_bytes(PARSE_DERIVED, "presentationHeader", &components[4], None)?;
    let (nym_domain, pseudonym, length_bbs_messages) = match feature {
        Feature::Baseline => (None, None, None),
        Feature::AnonymousHolderBinding => (
            None,
            None,
            Some(expect_uint(PARSE_DERIVED, "lengthBBSMessages", &components[5])?),
        ),
        Feature::Pseudonym | Feature::HolderBindingPseudonym => (
            Some(expect_bytes(PARSE_DERIVED, "nymDomain", &components[5], None)?),
            Some(expect_bytes(PARSE_DERIVED, "pseudonym", &components[6], None)?),
            Some(expect_uint(PARSE_DERIVED, "lengthBBSMessages", &components[7])?),
        ),
    };
    Ok(DerivedProofValue {
        bbs_proof,
        label_map,
        mandatory_indexes,
        selective_indexes,
        presentation_header,
        feature,
        nym_domain,
        pseudonym,
        length_bbs_messages,
    })
}
