//! # HMAC-Shuffled Blank-Node Labels
//!
//! The issuer relabels blank nodes with labels that are pseudorandom but
//! deterministic per HMAC key, so the label space leaks nothing about the
//! original document structure while issuer, holder, and verifier can all
//! reproduce the same labeling.
//!
//! Each canonical label is HMAC-SHA-256'd, the digests are base64url
//! encoded and sorted, and every blank node receives `b{rank}` where rank
//! is its digest's position in that sorted order.

use std::collections::BTreeMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

/// Length of the HMAC key carried in a base proof.
pub const HMAC_KEY_LENGTH: usize = 32;

/// The HMAC-based label shuffler.
#[derive(Clone)]
pub struct HmacIdShuffler {
    key: [u8; HMAC_KEY_LENGTH],
}

impl std::fmt::Debug for HmacIdShuffler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HmacIdShuffler(<keyed>)")
    }
}

impl HmacIdShuffler {
    /// Build a shuffler over an existing HMAC key.
    pub fn new(key: [u8; HMAC_KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Draw a fresh random HMAC key.
    pub fn generate_key() -> [u8; HMAC_KEY_LENGTH] {
        let mut key = [0u8; HMAC_KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// The HMAC key (serialized into the base proof).
    pub fn key(&self) -> &[u8; HMAC_KEY_LENGTH] {
        &self.key
    }

    fn digest_label(&self, canonical_label: &str) -> String {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&self.key)
            .expect("HMAC-SHA-256 accepts keys of any length");
        mac.update(canonical_label.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Transform an issued identifier map (input label → canonical label)
    /// into a shuffled map (input label → `b{rank}`).
    pub fn shuffled_label_map(
        &self,
        canonical_id_map: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let digests: BTreeMap<&String, String> = canonical_id_map
            .iter()
            .map(|(input, canonical)| (input, self.digest_label(canonical)))
            .collect();
        let mut sorted: Vec<String> = digests.values().cloned().collect();
        sorted.sort_unstable();
        digests
            .into_iter()
            .map(|(input, digest)| {
                // Digest collisions cannot occur across distinct labels.
                let rank = sorted
                    .binary_search(&digest)
                    .unwrap_or_default();
                (input.clone(), format!("b{rank}"))
            })
            .collect()
    }
}
