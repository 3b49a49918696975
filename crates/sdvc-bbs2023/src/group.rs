//! # Canonical Grouping
//!
//! Canonicalizes a JSON-LD document to N-Quads with replacement blank-node
//! labels and partitions the canonical statement list into named groups
//! under JSON-Pointer selection.
//!
//! Every group's `matching`/`non_matching` maps are keyed by the
//! statement's index in the one canonical list, so group membership is
//! purely a filter: indices from different groups can be composed without
//! re-canonicalizing.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use sdvc_core::nquads::{relabel_quads, sort_canonical};
use sdvc_core::{JsonPointer, LabelMap, Result, SuiteError};

use crate::hmac_shuffle::HmacIdShuffler;
use crate::select::select_json_ld;
use crate::skolem::Skolemizer;
use crate::traits::JsonLdProcessor;

/// One named group's partition of the canonical statement list.
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Statements reachable from the group's pointers, keyed by canonical
    /// index.
    pub matching: BTreeMap<usize, String>,
    /// The remaining statements, keyed by canonical index.
    pub non_matching: BTreeMap<usize, String>,
    /// The group's selected statements in deskolemized (pre-relabeling)
    /// form.
    pub deskolemized_nquads: Vec<String>,
}

/// The result of canonicalizing and grouping one document.
#[derive(Debug, Clone)]
pub struct GroupedCanonicalization {
    /// Canonical N-Quads under replacement labels, in canonical order.
    pub canonical_nquads: Vec<String>,
    /// Named group partitions.
    pub groups: BTreeMap<String, Group>,
    /// Input blank-node label → replacement label.
    pub label_map: BTreeMap<String, String>,
    /// Input blank-node label → canonical (`c14n`) label.
    pub canonical_id_map: BTreeMap<String, String>,
}

/// Canonicalize `document` with HMAC-shuffled blank-node labels and
/// partition the canonical statements into the named pointer groups.
pub fn canonicalize_and_group(
    processor: &dyn JsonLdProcessor,
    shuffler: &HmacIdShuffler,
    document: &Value,
    group_pointers: &BTreeMap<String, Vec<JsonPointer>>,
) -> Result<GroupedCanonicalization> {
    let mut skolemizer = Skolemizer::new();
    let expanded = processor.expand(document)?;
    let skolemized_expanded = skolemizer.skolemize_expanded(&expanded);
    let skolemized_compact =
        processor.compact(&skolemized_expanded, document.get("@context"))?;

    let skolem_quads = processor.to_rdf(&skolemized_expanded)?;
    let deskolemized = skolemizer.deskolemize_nquads(&skolem_quads);

    let canonical_id_map = processor.canonical_label_map(&deskolemized)?;
    let label_map = shuffler.shuffled_label_map(&canonical_id_map);
    let canonical_nquads = sort_canonical(relabel_quads(&deskolemized, &label_map));

    let mut groups = BTreeMap::new();
    for (name, pointers) in group_pointers {
        let group = build_group(
            processor,
            &skolemizer,
            &skolemized_compact,
            &canonical_nquads,
            &label_map,
            pointers,
        )?;
        groups.insert(name.clone(), group);
    }

    Ok(GroupedCanonicalization {
        canonical_nquads,
        groups,
        label_map,
        canonical_id_map,
    })
}

fn build_group(
    processor: &dyn JsonLdProcessor,
    skolemizer: &Skolemizer,
    skolemized_compact: &Value,
    canonical_nquads: &[String],
    label_map: &BTreeMap<String, String>,
    pointers: &[JsonPointer],
) -> Result<Group> {
    let (selected_set, deskolemized_nquads) =
        match select_json_ld(skolemized_compact, pointers)? {
            None => (BTreeSet::new(), Vec::new()),
            Some(selection) => {
                let expanded = processor.expand(&selection)?;
                let quads = processor.to_rdf(&expanded)?;
                let deskolemized = skolemizer.deskolemize_nquads(&quads);
                let relabeled: BTreeSet<String> =
                    relabel_quads(&deskolemized, label_map).into_iter().collect();
                (relabeled, deskolemized)
            }
        };

    let mut group = Group {
        deskolemized_nquads,
        ..Group::default()
    };
    for (index, quad) in canonical_nquads.iter().enumerate() {
        if selected_set.contains(quad) {
            group.matching.insert(index, quad.clone());
        } else {
            group.non_matching.insert(index, quad.clone());
        }
    }
    Ok(group)
}

/// Canonicalize a document whose blank nodes must carry externally
/// supplied labels: the issued `c14n` labels are mapped through
/// `label_map` before relabeling. Used by the verifier to reproduce the
/// holder's labeling from the proof's label map.
pub fn canonicalize_with_label_map(
    processor: &dyn JsonLdProcessor,
    document: &Value,
    label_map: &LabelMap,
) -> Result<Vec<String>> {
    let expanded = processor.expand(document)?;
    let quads = processor.to_rdf(&expanded)?;
    let canonical_id_map = processor.canonical_label_map(&quads)?;
    let mut composed = BTreeMap::new();
    for (input, canonical) in &canonical_id_map {
        let replacement = label_map.get(canonical).ok_or_else(|| {
            SuiteError::verification(
                "group::canonicalize_with_label_map",
                format!("label map has no entry for canonical label {canonical:?}"),
            )
        })?;
        composed.insert(input.clone(), replacement.to_string());
    }
    Ok(sort_canonical(relabel_quads(&quads, &composed)))
}

/// Canonicalize a document under plain RDF canonicalization: blank nodes
/// carry their issued `c14n` labels.
pub fn canonicalize_plain(
    processor: &dyn JsonLdProcessor,
    document: &Value,
) -> Result<Vec<String>> {
    let expanded = processor.expand(document)?;
    let quads = processor.to_rdf(&expanded)?;
    let canonical_id_map = processor.canonical_label_map(&quads)?;
    Ok(sort_canonical(relabel_quads(&quads, &canonical_id_map)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::BasicProcessor;
    use serde_json::json;

    fn pointers(raw: &[&str]) -> Vec<JsonPointer> {
        raw.iter().map(|p| JsonPointer::parse(p).unwrap()).collect()
    }

    fn document() -> Value {
        json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "type": "VerifiableCredential",
            "issuer": "did:example:issuer",
            "credentialSubject": {
                "type": "Person",
                "name": "Jane Doe",
                "birthCountry": "Bahamas"
            }
        })
    }

    fn grouped(selective: &[&str]) -> GroupedCanonicalization {
        let processor = BasicProcessor::new();
        let shuffler = HmacIdShuffler::new([5u8; 32]);
        let mut groups = BTreeMap::new();
        groups.insert("mandatory".to_string(), pointers(&["/issuer"]));
        if !selective.is_empty() {
            groups.insert("selective".to_string(), pointers(selective));
        }
        canonicalize_and_group(&processor, &shuffler, &document(), &groups).unwrap()
    }

    #[test]
    fn partition_covers_all_statements() {
        let result = grouped(&[]);
        let group = &result.groups["mandatory"];
        assert_eq!(
            group.matching.len() + group.non_matching.len(),
            result.canonical_nquads.len()
        );
        assert!(!group.matching.is_empty());
        assert!(!group.non_matching.is_empty());
    }

    #[test]
    fn indices_refer_to_one_canonical_list() {
        let result = grouped(&["/credentialSubject/name"]);
        for group in result.groups.values() {
            for (index, quad) in group.matching.iter().chain(&group.non_matching) {
                assert_eq!(&result.canonical_nquads[*index], quad);
            }
        }
    }

    #[test]
    fn mandatory_group_matches_issuer_statement() {
        let result = grouped(&[]);
        let group = &result.groups["mandatory"];
        assert!(group
            .matching
            .values()
            .any(|quad| quad.contains("did:example:issuer")));
        assert!(!group
            .non_matching
            .values()
            .any(|quad| quad.contains("did:example:issuer")));
    }

    #[test]
    fn selective_group_matches_name_statement() {
        let result = grouped(&["/credentialSubject/name"]);
        let group = &result.groups["selective"];
        assert!(group.matching.values().any(|quad| quad.contains("Jane Doe")));
        assert!(!group.matching.values().any(|quad| quad.contains("Bahamas")));
    }

    #[test]
    fn canonical_labels_are_shuffled() {
        let result = grouped(&[]);
        for quad in &result.canonical_nquads {
            // Labels come from the shuffled `b` namespace.
            assert!(!quad.contains("_:e"), "unshuffled label in {quad:?}");
            assert!(!quad.contains("_:f"), "unshuffled label in {quad:?}");
        }
        assert!(!result.label_map.is_empty());
        for replacement in result.label_map.values() {
            assert!(replacement.starts_with('b'));
        }
    }

    #[test]
    fn grouping_is_deterministic_per_hmac_key() {
        let a = grouped(&["/credentialSubject/name"]);
        let b = grouped(&["/credentialSubject/name"]);
        assert_eq!(a.canonical_nquads, b.canonical_nquads);
        assert_eq!(a.label_map, b.label_map);
    }

    #[test]
    fn canonicalize_with_label_map_reproduces_labels() {
        let result = grouped(&[]);
        // Build the verifier-side map: c14n label → shuffled label.
        let mut wire_map = LabelMap::new();
        for (input, canonical) in &result.canonical_id_map {
            wire_map.insert(canonical.clone(), result.label_map[input].clone());
        }
        let processor = BasicProcessor::new();
        let requads =
            canonicalize_with_label_map(&processor, &document(), &wire_map).unwrap();
        assert_eq!(requads, result.canonical_nquads);
    }

    #[test]
    fn canonicalize_with_label_map_rejects_missing_entry() {
        let processor = BasicProcessor::new();
        let err =
            canonicalize_with_label_map(&processor, &document(), &LabelMap::new()).unwrap_err();
        assert_eq!(err.code(), sdvc_core::ErrorCode::ProofVerification);
    }
}
