//! # Skolemization
//!
//! Blank nodes have no stable identity across JSON-LD selection, so the
//! suite pins them before selecting: every node object without an `@id`
//! (and every authored `_:` identifier) receives a skolem URN. Selection
//! then preserves node identity through the URN, and deskolemization
//! rewrites the URNs back to blank-node labels in the serialized N-Quads.
//!
//! The URN scheme is `urn:bnid:{salt}:{label}` with a per-invocation UUID
//! salt. Skolem URNs never leave the holder; they exist only between
//! skolemization and deskolemization.

use serde_json::{Map, Value};
use uuid::Uuid;

/// Assigns skolem URNs within one expanded document and rewrites them back
/// out of N-Quads.
#[derive(Debug)]
pub struct Skolemizer {
    prefix: String,
    count: usize,
}

impl Skolemizer {
    /// Create a skolemizer with a fresh random salt.
    pub fn new() -> Self {
        Self {
            prefix: format!("urn:bnid:{}:", Uuid::new_v4()),
            count: 0,
        }
    }

    /// The skolem URN for a blank-node label.
    fn urn_for_label(&self, label: &str) -> String {
        // Authored labels get an `e` namespace so they can never collide
        // with the `f` namespace of freshly assigned ones.
        format!("{}e{label}", self.prefix)
    }

    fn fresh_urn(&mut self) -> String {
        let urn = format!("{}f{}", self.prefix, self.count);
        self.count += 1;
        urn
    }

    /// Skolemize an expanded document: every node object receives an
    /// `@id`, and authored blank-node identifiers are rewritten to URNs.
    pub fn skolemize_expanded(&mut self, expanded: &Value) -> Value {
        match expanded {
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.skolemize_expanded(v)).collect())
            }
            Value::Object(map) => {
                // Value objects carry literals, not nodes.
                if map.contains_key("@value") {
                    return expanded.clone();
                }
                let mut out = Map::new();
                for (key, value) in map {
                    if key == "@id" {
                        continue;
                    }
                    out.insert(key.clone(), self.skolemize_expanded(value));
                }
                let id = match map.get("@id").and_then(Value::as_str) {
                    Some(id) if id.starts_with("_:") => self.urn_for_label(&id[2..]),
                    Some(id) => id.to_string(),
                    None => self.fresh_urn(),
                };
                out.insert("@id".to_string(), Value::String(id));
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    /// Rewrite `<urn:bnid:{salt}:{label}>` references back to `_:{label}`
    /// blank nodes.
    pub fn deskolemize_nquads(&self, nquads: &[String]) -> Vec<String> {
        let needle = format!("<{}", self.prefix);
        nquads
            .iter()
            .map(|quad| {
                let mut out = String::with_capacity(quad.len());
                let mut rest = quad.as_str();
                while let Some(pos) = rest.find(&needle) {
                    out.push_str(&rest[..pos]);
                    let after = &rest[pos + needle.len()..];
                    match after.find('>') {
                        Some(end) => {
                            out.push_str("_:");
                            out.push_str(&after[..end]);
                            rest = &after[end + 1..];
                        }
                        None => {
                            // Unterminated IRI; leave untouched.
                            out.push_str(&rest[pos..]);
                            rest = "";
                        }
                    }
                }
                out.push_str(rest);
                out
            })
            .collect()
    }
}

impl Default for Skolemizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assigns_ids_to_anonymous_nodes() {
        let mut skolemizer = Skolemizer::new();
        let expanded = json!([{
            "https://example.org/vocab#subject": [{
                "https://example.org/vocab#name": [{"@value": "Jane"}]
            }]
        }]);
        let skolemized = skolemizer.skolemize_expanded(&expanded);
        let root = &skolemized[0];
        assert!(root["@id"].as_str().unwrap().starts_with("urn:bnid:"));
        let child = &root["https://example.org/vocab#subject"][0];
        assert!(child["@id"].as_str().unwrap().starts_with("urn:bnid:"));
        assert_ne!(root["@id"], child["@id"]);
    }

    #[test]
    fn preserves_existing_iris() {
        let mut skolemizer = Skolemizer::new();
        let expanded = json!([{
            "@id": "urn:uuid:1234",
            "https://example.org/vocab#name": [{"@value": "Jane"}]
        }]);
        let skolemized = skolemizer.skolemize_expanded(&expanded);
        assert_eq!(skolemized[0]["@id"], json!("urn:uuid:1234"));
    }

    #[test]
    fn rewrites_authored_blank_ids() {
        let mut skolemizer = Skolemizer::new();
        let expanded = json!([{
            "@id": "_:b0",
            "https://example.org/vocab#name": [{"@value": "Jane"}]
        }]);
        let skolemized = skolemizer.skolemize_expanded(&expanded);
        let id = skolemized[0]["@id"].as_str().unwrap();
        assert!(id.starts_with("urn:bnid:"));
        assert!(id.ends_with(":eb0"));
    }

    #[test]
    fn value_objects_are_untouched() {
        let mut skolemizer = Skolemizer::new();
        let expanded = json!({"@value": "literal"});
        assert_eq!(skolemizer.skolemize_expanded(&expanded), expanded);
    }

    #[test]
    fn deskolemize_rewrites_urns() {
        let mut skolemizer = Skolemizer::new();
        let expanded = json!([{
            "https://example.org/vocab#name": [{"@value": "Jane"}]
        }]);
        let skolemized = skolemizer.skolemize_expanded(&expanded);
        let id = skolemized[0]["@id"].as_str().unwrap().to_string();
        let quad = format!("<{id}> <https://example.org/vocab#name> \"Jane\" .\n");
        let deskolemized = skolemizer.deskolemize_nquads(&[quad]);
        assert_eq!(
            deskolemized[0],
            "_:f0 <https://example.org/vocab#name> \"Jane\" .\n"
        );
    }

    #[test]
    fn deskolemize_ignores_foreign_iris() {
        let skolemizer = Skolemizer::new();
        let quad = "<urn:uuid:1234> <https://example.org/vocab#p> \"x\" .\n".to_string();
        assert_eq!(skolemizer.deskolemize_nquads(&[quad.clone()]), vec![quad]);
    }
}
