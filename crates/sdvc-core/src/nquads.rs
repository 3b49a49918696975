//! # N-Quad String Utilities
//!
//! Blank-node label scanning and replacement over canonical N-Quad lines,
//! plus the canonical sort and join used when hashing statement groups.
//!
//! ## Single-Pass Replacement Invariant
//!
//! Relabeling replaces every `_:label` token in one pass over the line.
//! The input and output label namespaces overlap (skolem-derived `b0` on
//! one side, HMAC-shuffled `b0` on the other), so a sequential
//! find-and-replace per label would alias freshly written labels. The
//! scanner also tracks string-literal state so a `_:` inside a quoted
//! literal is never rewritten. All scanning is byte-oriented: tokens and
//! delimiters are ASCII, and multi-byte literal content is copied through
//! untouched.

use std::collections::{BTreeMap, BTreeSet};

/// Replace blank-node labels in one N-Quad line according to `map`.
///
/// Labels absent from the map pass through unchanged.
pub fn relabel_quad(quad: &str, map: &BTreeMap<String, String>) -> String {
    let bytes = quad.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    let mut in_literal = false;
    while i < bytes.len() {
        let b = bytes[i];
        if in_literal {
            if b == b'\\' && i + 1 < bytes.len() {
                out.extend_from_slice(&bytes[i..i + 2]);
                i += 2;
                continue;
            }
            if b == b'"' {
                in_literal = false;
            }
            out.push(b);
            i += 1;
            continue;
        }
        match b {
            b'"' => {
                in_literal = true;
                out.push(b);
                i += 1;
            }
            b'_' if bytes.get(i + 1) == Some(&b':') => {
                let start = i + 2;
                let mut end = start;
                while end < bytes.len() && is_label_byte(bytes[end]) {
                    end += 1;
                }
                // Token bounds are ASCII, so slicing the str is safe.
                let label = &quad[start..end];
                match map.get(label) {
                    Some(replacement) => {
                        out.extend_from_slice(b"_:");
                        out.extend_from_slice(replacement.as_bytes());
                    }
                    None => out.extend_from_slice(&bytes[i..end]),
                }
                i = end;
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    // Only ASCII tokens were replaced; the line stays valid UTF-8.
    String::from_utf8(out).unwrap_or_else(|_| quad.to_string())
}

/// Relabel every line in `quads`.
pub fn relabel_quads(quads: &[String], map: &BTreeMap<String, String>) -> Vec<String> {
    quads.iter().map(|q| relabel_quad(q, map)).collect()
}

/// Collect the distinct blank-node labels appearing outside literals.
pub fn blank_labels(quads: &[String]) -> BTreeSet<String> {
    let mut labels = BTreeSet::new();
    for quad in quads {
        let bytes = quad.as_bytes();
        let mut i = 0;
        let mut in_literal = false;
        while i < bytes.len() {
            let b = bytes[i];
            if in_literal {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == b'"' {
                    in_literal = false;
                }
                i += 1;
                continue;
            }
            if b == b'"' {
                in_literal = true;
                i += 1;
                continue;
            }
            if b == b'_' && bytes.get(i + 1) == Some(&b':') {
                let start = i + 2;
                let mut end = start;
                while end < bytes.len() && is_label_byte(bytes[end]) {
                    end += 1;
                }
                labels.insert(quad[start..end].to_string());
                i = end;
                continue;
            }
            i += 1;
        }
    }
    labels
}

/// Sort quads into canonical (lexicographic) order, dropping duplicates.
pub fn sort_canonical(quads: Vec<String>) -> Vec<String> {
    let set: BTreeSet<String> = quads.into_iter().collect();
    set.into_iter().collect()
}

/// Concatenate quads into the byte stream covered by a hash. Each quad
/// already carries its terminating newline from serialization.
pub fn join(quads: &[String]) -> String {
    quads.concat()
}

fn is_label_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn relabels_subject_and_object() {
        let quad = "_:b0 <http://example.org/ns#knows> _:b1 .\n";
        let out = relabel_quad(quad, &map(&[("b0", "b7"), ("b1", "b2")]));
        assert_eq!(out, "_:b7 <http://example.org/ns#knows> _:b2 .\n");
    }

    #[test]
    fn swap_does_not_alias() {
        // b0→b1 and b1→b0 in one line must swap cleanly.
        let quad = "_:b0 <http://example.org/ns#knows> _:b1 .\n";
        let out = relabel_quad(quad, &map(&[("b0", "b1"), ("b1", "b0")]));
        assert_eq!(out, "_:b1 <http://example.org/ns#knows> _:b0 .\n");
    }

    #[test]
    fn literal_content_is_untouched() {
        let quad = "_:b0 <http://example.org/ns#note> \"see _:b1 for details\" .\n";
        let out = relabel_quad(quad, &map(&[("b0", "b9"), ("b1", "b8")]));
        assert_eq!(out, "_:b9 <http://example.org/ns#note> \"see _:b1 for details\" .\n");
    }

    #[test]
    fn escaped_quote_does_not_end_literal() {
        let quad = "_:b0 <http://example.org/ns#note> \"a \\\" _:b1\" .\n";
        let out = relabel_quad(quad, &map(&[("b1", "b8")]));
        assert!(out.contains("_:b1"));
    }

    #[test]
    fn multibyte_literals_pass_through() {
        let quad = "_:b0 <http://example.org/ns#name> \"J\u{00e9}r\u{00f4}me \u{2014} _:b1\" .\n";
        let out = relabel_quad(quad, &map(&[("b0", "b9"), ("b1", "b8")]));
        assert_eq!(
            out,
            "_:b9 <http://example.org/ns#name> \"J\u{00e9}r\u{00f4}me \u{2014} _:b1\" .\n"
        );
    }

    #[test]
    fn unmapped_labels_pass_through() {
        let quad = "_:stray <http://example.org/ns#p> \"x\" .\n";
        assert_eq!(relabel_quad(quad, &map(&[])), quad);
    }

    #[test]
    fn collects_labels_outside_literals() {
        let quads = vec![
            "_:b0 <http://example.org/ns#p> _:b1 .\n".to_string(),
            "_:b1 <http://example.org/ns#note> \"_:b2 inside\" .\n".to_string(),
        ];
        let labels = blank_labels(&quads);
        assert_eq!(labels, BTreeSet::from(["b0".to_string(), "b1".to_string()]));
    }

    #[test]
    fn sort_canonical_orders_and_dedupes() {
        let quads = vec![
            "_:b1 <http://example.org/ns#p> \"y\" .\n".to_string(),
            "_:b0 <http://example.org/ns#p> \"x\" .\n".to_string(),
            "_:b0 <http://example.org/ns#p> \"x\" .\n".to_string(),
        ];
        let sorted = sort_canonical(quads);
        assert_eq!(sorted.len(), 2);
        assert!(sorted[0] < sorted[1]);
    }

    #[test]
    fn join_concatenates_without_separator() {
        let quads = vec!["a .\n".to_string(), "b .\n".to_string()];
        assert_eq!(join(&quads), "a .\nb .\n");
    }
}
