//! # Blank-Node Label Map — Compression and Decompression
//!
//! A [`LabelMap`] carries the bridge between two blank-node label spaces:
//! canonical labels (`c14n` prefix, assigned by RDF canonicalization) and
//! pseudonymized labels (`b` prefix, assigned by the HMAC shuffle). The
//! compressed form replaces both textual prefixes with bare integers for
//! the CBOR wire encoding.
//!
//! Shape violations surface `PROOF_GENERATION_ERROR`: a label map is only
//! ever compressed while a disclosure proof is being produced.

use std::collections::BTreeMap;

use crate::error::{Result, SuiteError};

/// Prefix of canonical blank-node labels.
pub const CANONICAL_LABEL_PREFIX: &str = "c14n";

/// Prefix of pseudonymized blank-node labels.
pub const PSEUDONYM_LABEL_PREFIX: &str = "b";

/// An ordered mapping from canonical blank-node labels (`c14n0`, `c14n1`,
/// ...) to pseudonymized labels (`b0`, `b1`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap(BTreeMap<String, String>);

impl LabelMap {
    /// Create an empty label map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a `canonical → pseudonym` entry.
    pub fn insert(&mut self, canonical: impl Into<String>, pseudonym: impl Into<String>) {
        self.0.insert(canonical.into(), pseudonym.into());
    }

    /// Look up the pseudonym for a canonical label.
    pub fn get(&self, canonical: &str) -> Option<&str> {
        self.0.get(canonical).map(String::as_str)
    }

    /// Iterate entries in canonical-label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Access the underlying ordered map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Compress to the integer wire form: `c14n<k> → b<v>` becomes `k → v`.
    ///
    /// # Errors
    ///
    /// `PROOF_GENERATION_ERROR` if any key lacks the `c14n` prefix, any
    /// value lacks the `b` prefix, or a suffix is not a base-10 integer.
    pub fn compress(&self) -> Result<BTreeMap<u64, u64>> {
        let mut compressed = BTreeMap::new();
        for (canonical, pseudonym) in &self.0 {
            let k = parse_suffix(canonical, CANONICAL_LABEL_PREFIX)?;
            let v = parse_suffix(pseudonym, PSEUDONYM_LABEL_PREFIX)?;
            compressed.insert(k, v);
        }
        Ok(compressed)
    }

    /// Inverse of [`LabelMap::compress`], restoring the textual prefixes.
    pub fn decompress(compressed: &BTreeMap<u64, u64>) -> Self {
        let mut map = BTreeMap::new();
        for (k, v) in compressed {
            map.insert(
                format!("{CANONICAL_LABEL_PREFIX}{k}"),
                format!("{PSEUDONYM_LABEL_PREFIX}{v}"),
            );
        }
        Self(map)
    }
}

impl From<BTreeMap<String, String>> for LabelMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn parse_suffix(label: &str, prefix: &'static str) -> Result<u64> {
    let suffix = label.strip_prefix(prefix).ok_or_else(|| {
        SuiteError::generation(
            "label_map::compress",
            format!("label {label:?} lacks the {prefix:?} prefix"),
        )
    })?;
    suffix.parse().map_err(|_| {
        SuiteError::generation(
            "label_map::compress",
            format!("label {label:?} has a non-integer suffix"),
        )
    })
}
