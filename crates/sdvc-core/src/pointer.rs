//! # JSON Pointer — RFC 6901 Parsing and Evaluation
//!
//! JSON Pointers designate the statements a proof must always cover
//! (mandatory pointers) or may reveal (selective pointers). A pointer is
//! parsed once into its reference tokens and then evaluated against
//! `serde_json::Value` trees.
//!
//! Parse failures surface `PROOF_GENERATION_ERROR`: a malformed pointer is
//! only ever observed while a proof is being produced.

use serde_json::Value;

use crate::error::{Result, SuiteError};

/// A parsed RFC 6901 JSON Pointer.
///
/// The empty pointer (`""`) is valid and designates the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    raw: String,
    tokens: Vec<String>,
}

impl JsonPointer {
    /// Parse a pointer string, unescaping `~1` to `/` and `~0` to `~`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(Self {
                raw: String::new(),
                tokens: Vec::new(),
            });
        }
        if !raw.starts_with('/') {
            return Err(SuiteError::generation(
                "pointer::parse",
                format!("JSON pointer must start with '/': {raw:?}"),
            ));
        }
        let tokens = raw
            .split('/')
            .skip(1)
            .map(unescape_token)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                SuiteError::generation("pointer::parse", format!("{raw:?}: {}", e.message()))
            })?;
        Ok(Self {
            raw: raw.to_string(),
            tokens,
        })
    }

    /// The unescaped reference tokens, in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The original pointer string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True for the empty pointer designating the whole document.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Evaluate this pointer against a document, returning the referenced
    /// value.
    pub fn evaluate<'a>(&self, document: &'a Value) -> Result<&'a Value> {
        let mut current = document;
        for token in &self.tokens {
            current = descend(current, token).ok_or_else(|| {
                SuiteError::generation(
                    "pointer::evaluate",
                    format!("pointer {:?} does not match the document at token {token:?}", self.raw),
                )
            })?;
        }
        Ok(current)
    }
}

impl std::fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Resolve a single reference token against an object or array.
pub fn descend<'a>(value: &'a Value, token: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(token),
        Value::Array(items) => parse_array_index(token).and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Parse an array-index token: decimal digits, no leading zeros (except "0").
pub fn parse_array_index(token: &str) -> Option<usize> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn unescape_token(token: &str) -> Result<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            other => {
                return Err(SuiteError::generation(
                    "pointer::parse",
                    format!("invalid escape '~{}'", other.map(String::from).unwrap_or_default()),
                ));
            }
        }
    }
    Ok(out)
}
