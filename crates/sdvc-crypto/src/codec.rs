//! # Key-Material Codecs — Multikey and JWK
//!
//! Encoding and decoding of BLS12-381 G2 key material in the two
//! verification-method wire forms:
//!
//! - **Multikey**: a 2-byte multicodec prefix (`0xEB 0x01` public,
//!   `0x80 0x30` private) followed by the raw key bytes, base58btc-encoded
//!   with the multibase `z` sentinel.
//! - **JWK**: a fixed template (`kty = "EC"`, `crv = "BLS12_381G2"`) with
//!   the key bytes in `x` (public) or `d` (private), base64url without
//!   padding; `y` is always the empty string.
//!
//! The JWK thumbprint hashes the JWK exactly as serialized here. The field
//! order of [`Jwk`] is fixed, so the serialized form is stable; RFC 7638
//! canonical-member ordering is deliberately left to callers that need it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use multibase::Base;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use sdvc_core::{Result, SuiteError};

use crate::material::{KeyFlag, KeyMaterial};

/// Multicodec prefix for a BLS12-381 G2 public key.
pub const MULTIKEY_PUBLIC_PREFIX: [u8; 2] = [0xeb, 0x01];

/// Multicodec prefix for a BLS12-381 private key.
pub const MULTIKEY_PRIVATE_PREFIX: [u8; 2] = [0x80, 0x30];

/// JWK constants shared by the suite.
pub const JWK_KTY: &str = "EC";
pub const JWK_USE: &str = "sig";
pub const JWK_ALG: &str = "BLS12_381G2";
pub const JWK_CRV: &str = "BLS12_381G2";

fn multikey_prefix(flag: KeyFlag) -> [u8; 2] {
    match flag {
        KeyFlag::Public => MULTIKEY_PUBLIC_PREFIX,
        KeyFlag::Private => MULTIKEY_PRIVATE_PREFIX,
    }
}

/// Encode key material as a multibase base58btc Multikey string.
///
/// # Errors
///
/// `INVALID_KEYPAIR_LENGTH` when the material length does not match the
/// flag.
pub fn material_to_multibase(material: &[u8], flag: KeyFlag) -> Result<String> {
    if material.len() != flag.expected_len() {
        return Err(SuiteError::invalid_length(
            "codec::material_to_multibase",
            format!(
                "{} key material must be {} bytes, got {}",
                flag.as_str(),
                flag.expected_len(),
                material.len()
            ),
        ));
    }
    let prefix = multikey_prefix(flag);
    let mut buf = Vec::with_capacity(2 + material.len());
    buf.extend_from_slice(&prefix);
    buf.extend_from_slice(material);
    Ok(multibase::encode(Base::Base58Btc, buf))
}

/// Decode a multibase base58btc Multikey string into key material.
///
/// # Errors
///
/// `DECODING_ERROR` on a non-base58btc multibase sentinel, malformed
/// base58, or a multicodec prefix mismatch; `INVALID_KEYPAIR_LENGTH` when
/// the remainder has the wrong length.
pub fn multibase_to_material(encoded: &str, flag: KeyFlag) -> Result<KeyMaterial> {
    let (base, bytes) = multibase::decode(encoded).map_err(|e| {
        SuiteError::decoding(
            "codec::multibase_to_material",
            format!("malformed multibase string: {e}"),
        )
    })?;
    if base != Base::Base58Btc {
        return Err(SuiteError::decoding(
            "codec::multibase_to_material",
            format!("expected base58btc ('z') encoding, got {:?}", base),
        ));
    }
    let prefix = multikey_prefix(flag);
    if bytes.len() < 2 || bytes[..2] != prefix {
        return Err(SuiteError::decoding(
            "codec::multibase_to_material",
            format!(
                "multicodec prefix mismatch for {} key: expected {:02x}{:02x}",
                flag.as_str(),
                prefix[0],
                prefix[1]
            ),
        ));
    }
    KeyMaterial::from_bytes(flag, &bytes[2..])
}

/// A JSON Web Key in the suite's fixed template.
///
/// Field order is load-bearing: the thumbprint hashes the JWK exactly as
/// this struct serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub use_: String,
    pub key_ops: Vec<String>,
    pub alg: String,
    pub ext: bool,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// Encode key material into the fixed JWK template.
///
/// Public material lands in `x` with `key_ops = ["verify"]`; private
/// material lands in `d` with `key_ops = ["sign"]` and an empty `x`.
///
/// # Errors
///
/// `INVALID_KEYPAIR_LENGTH` when the material length does not match the
/// flag.
pub fn material_to_jwk(material: &[u8], flag: KeyFlag) -> Result<Jwk> {
    if material.len() != flag.expected_len() {
        return Err(SuiteError::invalid_length(
            "codec::material_to_jwk",
            format!(
                "{} key material must be {} bytes, got {}",
                flag.as_str(),
                flag.expected_len(),
                material.len()
            ),
        ));
    }
    let encoded = URL_SAFE_NO_PAD.encode(material);
    let (x, d) = match flag {
        KeyFlag::Public => (encoded, None),
        KeyFlag::Private => (String::new(), Some(encoded)),
    };
    Ok(Jwk {
        kty: JWK_KTY.to_string(),
        use_: JWK_USE.to_string(),
        key_ops: vec![flag.key_op().to_string()],
        alg: JWK_ALG.to_string(),
        ext: true,
        crv: JWK_CRV.to_string(),
        x,
        y: String::new(),
        d,
    })
}

/// Decode key material out of a JWK, asserting every template constant.
///
/// # Errors
///
/// `INVALID_KEYPAIR_CONTENT` when a template field or `key_ops` does not
/// match the flag; `DECODING_ERROR` on malformed base64url;
/// `INVALID_KEYPAIR_LENGTH` when the decoded bytes have the wrong length.
pub fn jwk_to_material(jwk: &Jwk, flag: KeyFlag) -> Result<KeyMaterial> {
    const OP: &str = "codec::jwk_to_material";
    if jwk.kty != JWK_KTY {
        return Err(SuiteError::invalid_content(
            OP,
            format!("kty must be {JWK_KTY:?}, got {:?}", jwk.kty),
        ));
    }
    if jwk.use_ != JWK_USE {
        return Err(SuiteError::invalid_content(
            OP,
            format!("use must be {JWK_USE:?}, got {:?}", jwk.use_),
        ));
    }
    if jwk.alg != JWK_ALG {
        return Err(SuiteError::invalid_content(
            OP,
            format!("alg must be {JWK_ALG:?}, got {:?}", jwk.alg),
        ));
    }
    if jwk.crv != JWK_CRV {
        return Err(SuiteError::invalid_content(
            OP,
            format!("crv must be {JWK_CRV:?}, got {:?}", jwk.crv),
        ));
    }
    if jwk.key_ops.len() != 1 || jwk.key_ops[0] != flag.key_op() {
        return Err(SuiteError::invalid_content(
            OP,
            format!(
                "key_ops must be exactly [{:?}], got {:?}",
                flag.key_op(),
                jwk.key_ops
            ),
        ));
    }
    let field = match flag {
        KeyFlag::Public => {
            if jwk.x.is_empty() {
                return Err(SuiteError::invalid_content(OP, "public JWK is missing x"));
            }
            jwk.x.as_str()
        }
        KeyFlag::Private => match jwk.d.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => return Err(SuiteError::invalid_content(OP, "private JWK is missing d")),
        },
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(field)
        .map_err(|e| SuiteError::decoding(OP, format!("malformed base64url key field: {e}")))?;
    KeyMaterial::from_bytes(flag, &bytes)
}

/// SHA-256 thumbprint of a JWK as emitted by this suite, base64url without
/// padding.
pub fn jwk_thumbprint(jwk: &Jwk) -> Result<String> {
    let serialized = serde_json::to_vec(jwk).map_err(|e| {
        SuiteError::decoding("codec::jwk_thumbprint", format!("JWK serialization failed: {e}"))
    })?;
    let digest = Sha256::digest(&serialized);
    Ok(URL_SAFE_NO_PAD.encode(digest))
}
