//! # Basic JSON-LD Processor
//!
//! A deterministic [`JsonLdProcessor`] for a constrained document subset:
//! node objects keyed by `id`/`type`, term properties expanded under a
//! fixed vocabulary IRI, and scalar values treated as literals. It is
//! sufficient to drive the whole cryptosuite in tests and simple
//! embeddings; production deployments inject a full JSON-LD processor and
//! RDF canonicalizer behind the same trait.
//!
//! Canonical labeling orders blank nodes by a content signature (their
//! incident quads with blank labels normalized), so isomorphic datasets
//! receive identical `c14n` labels regardless of input labeling. Nodes
//! with identical signatures (automorphic twins) fall back to input
//! order; the document subset this processor serves does not produce
//! them.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use sdvc_core::nquads::{blank_labels, relabel_quads};
use sdvc_core::{Result, SuiteError};

use crate::traits::JsonLdProcessor;

/// Vocabulary IRI prefix for terms without an explicit mapping.
pub const DEFAULT_VOCAB: &str = "https://sdvc.example/vocab#";

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// The deterministic subset processor.
#[derive(Debug, Clone, Default)]
pub struct BasicProcessor;

impl BasicProcessor {
    /// Create a processor instance.
    pub fn new() -> Self {
        Self
    }
}

fn expand_iri(term: &str) -> String {
    if term.contains(':') {
        term.to_string()
    } else {
        format!("{DEFAULT_VOCAB}{term}")
    }
}

fn compact_iri(iri: &str) -> String {
    iri.strip_prefix(DEFAULT_VOCAB).unwrap_or(iri).to_string()
}

fn expand_node(map: &Map<String, Value>) -> Result<Value> {
    let mut out = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "@context" => {}
            "id" | "@id" => {
                let id = value.as_str().ok_or_else(|| {
                    SuiteError::generation("processor::expand", "id must be a string")
                })?;
                out.insert("@id".to_string(), Value::String(id.to_string()));
            }
            "type" | "@type" => {
                let types = match value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                let expanded: Result<Vec<Value>> = types
                    .iter()
                    .map(|t| {
                        t.as_str()
                            .map(|s| Value::String(expand_iri(s)))
                            .ok_or_else(|| {
                                SuiteError::generation(
                                    "processor::expand",
                                    "type entries must be strings",
                                )
                            })
                    })
                    .collect();
                out.insert("@type".to_string(), Value::Array(expanded?));
            }
            _ => {
                let values = match value {
                    Value::Array(items) => items.iter().collect::<Vec<_>>(),
                    other => vec![other],
                };
                let expanded: Result<Vec<Value>> =
                    values.into_iter().map(expand_value).collect();
                out.insert(expand_iri(key), Value::Array(expanded?));
            }
        }
    }
    Ok(Value::Object(out))
}

fn expand_value(value: &Value) -> Result<Value> {
    match value {
        Value::Object(map) => expand_node(map),
        Value::String(s) => Ok(serde_json::json!({"@value": s})),
        Value::Number(_) | Value::Bool(_) => Ok(serde_json::json!({"@value": value})),
        Value::Null => Err(SuiteError::generation(
            "processor::expand",
            "null values are not representable",
        )),
        Value::Array(_) => Err(SuiteError::generation(
            "processor::expand",
            "nested arrays are not representable",
        )),
    }
}

fn compact_node(map: &Map<String, Value>) -> Result<Value> {
    let mut out = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "@id" => {
                out.insert("id".to_string(), value.clone());
            }
            "@type" => {
                let compacted: Vec<Value> = match value {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|s| Value::String(compact_iri(s)))
                        .collect(),
                    _ => Vec::new(),
                };
                let collapsed = if compacted.len() == 1 {
                    compacted.into_iter().next().unwrap_or(Value::Null)
                } else {
                    Value::Array(compacted)
                };
                out.insert("type".to_string(), collapsed);
            }
            _ => {
                let items = match value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                let compacted: Result<Vec<Value>> = items.iter().map(compact_value).collect();
                let mut compacted = compacted?;
                let collapsed = if compacted.len() == 1 {
                    compacted.swap_remove(0)
                } else {
                    Value::Array(compacted)
                };
                out.insert(compact_iri(key), collapsed);
            }
        }
    }
    Ok(Value::Object(out))
}

fn compact_value(value: &Value) -> Result<Value> {
    match value {
        Value::Object(map) => match map.get("@value") {
            Some(inner) => Ok(inner.clone()),
            None => compact_node(map),
        },
        other => Ok(other.clone()),
    }
}

fn escape_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

struct RdfEmitter {
    counter: Cell<usize>,
    quads: Vec<String>,
}

impl RdfEmitter {
    fn subject_ref(&self, map: &Map<String, Value>) -> String {
        match map.get("@id").and_then(Value::as_str) {
            Some(id) if id.starts_with("_:") => id.to_string(),
            Some(id) => format!("<{id}>"),
            None => {
                let label = format!("_:b{}", self.counter.get());
                self.counter.set(self.counter.get() + 1);
                label
            }
        }
    }

    fn emit_node(&mut self, map: &Map<String, Value>) -> Result<String> {
        let subject = self.subject_ref(map);
        for (key, value) in map {
            match key.as_str() {
                "@id" => {}
                "@type" => {
                    if let Value::Array(types) = value {
                        for t in types.iter().filter_map(Value::as_str) {
                            self.quads
                                .push(format!("{subject} <{RDF_TYPE}> <{t}> .\n"));
                        }
                    }
                }
                _ => {
                    let Value::Array(values) = value else {
                        return Err(SuiteError::generation(
                            "processor::to_rdf",
                            "expanded property values must be arrays",
                        ));
                    };
                    for item in values {
                        let object = match item {
                            Value::Object(obj) if obj.contains_key("@value") => {
                                let text = literal_text(&obj["@value"]);
                                format!("\"{}\"", escape_literal(&text))
                            }
                            Value::Object(obj) => self.emit_node(obj)?,
                            other => format!("\"{}\"", escape_literal(&literal_text(other))),
                        };
                        self.quads.push(format!("{subject} <{key}> {object} .\n"));
                    }
                }
            }
        }
        Ok(subject)
    }
}

impl JsonLdProcessor for BasicProcessor {
    fn expand(&self, document: &Value) -> Result<Value> {
        let nodes = match document {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        };
        let expanded: Result<Vec<Value>> = nodes
            .iter()
            .map(|node| {
                node.as_object()
                    .ok_or_else(|| {
                        SuiteError::generation("processor::expand", "document must be an object")
                    })
                    .and_then(expand_node)
            })
            .collect();
        Ok(Value::Array(expanded?))
    }

    fn compact(&self, expanded: &Value, context: Option<&Value>) -> Result<Value> {
        let nodes = match expanded {
            Value::Array(items) => items,
            _ => {
                return Err(SuiteError::generation(
                    "processor::compact",
                    "expanded form must be an array of nodes",
                ))
            }
        };
        let mut compacted: Vec<Value> = nodes
            .iter()
            .map(|node| {
                node.as_object()
                    .ok_or_else(|| {
                        SuiteError::generation(
                            "processor::compact",
                            "expanded nodes must be objects",
                        )
                    })
                    .and_then(compact_node)
            })
            .collect::<Result<_>>()?;
        if compacted.len() != 1 {
            return Err(SuiteError::generation(
                "processor::compact",
                format!("expected a single root node, got {}", compacted.len()),
            ));
        }
        let mut root = compacted.swap_remove(0);
        if let (Some(context), Value::Object(map)) = (context, &mut root) {
            map.insert("@context".to_string(), context.clone());
        }
        Ok(root)
    }

    fn to_rdf(&self, expanded: &Value) -> Result<Vec<String>> {
        let nodes = match expanded {
            Value::Array(items) => items,
            _ => {
                return Err(SuiteError::generation(
                    "processor::to_rdf",
                    "expanded form must be an array of nodes",
                ))
            }
        };
        let mut emitter = RdfEmitter {
            counter: Cell::new(0),
            quads: Vec::new(),
        };
        for node in nodes {
            let map = node.as_object().ok_or_else(|| {
                SuiteError::generation("processor::to_rdf", "expanded nodes must be objects")
            })?;
            emitter.emit_node(map)?;
        }
        // RDF datasets are sets: drop duplicate statements, keeping the
        // first occurrence's position.
        let mut seen = BTreeSet::new();
        Ok(emitter
            .quads
            .into_iter()
            .filter(|quad| seen.insert(quad.clone()))
            .collect())
    }

    fn canonical_label_map(&self, nquads: &[String]) -> Result<BTreeMap<String, String>> {
        let labels: Vec<String> = blank_labels(nquads).into_iter().collect();
        let mut signed: Vec<(Vec<String>, &String)> = labels
            .iter()
            .map(|label| {
                let mut normalization = BTreeMap::new();
                for other in &labels {
                    normalization.insert(
                        other.clone(),
                        if other == label { "a" } else { "z" }.to_string(),
                    );
                }
                let mut signature: Vec<String> = nquads
                    .iter()
                    .filter(|quad| blank_labels(std::slice::from_ref(*quad)).contains(label))
                    .map(|quad| {
                        relabel_quads(std::slice::from_ref(quad), &normalization)
                            .into_iter()
                            .next()
                            .unwrap_or_default()
                    })
                    .collect();
                signature.sort();
                (signature, label)
            })
            .collect();
        signed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(signed
            .into_iter()
            .enumerate()
            .map(|(rank, (_, label))| (label.clone(), format!("c14n{rank}")))
            .collect())
    }
}
