//! # Collaborator Interfaces
//!
//! The cryptosuite delegates JSON-LD processing, RDF canonicalization, and
//! document resolution to injected collaborators. The pipelines are pure
//! functions over their inputs plus these traits; there is no shared
//! mutable state.
//!
//! Canonicalization and expansion are CPU-bound and synchronous; document
//! loading is I/O-shaped and asynchronous.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use sdvc_core::Result;

/// JSON-LD processing and RDF canonicalization, delegated to a full
/// processor in production deployments.
///
/// N-Quad lines returned by [`JsonLdProcessor::to_rdf`] carry their
/// terminating newline. Blank-node labels exchanged through
/// [`JsonLdProcessor::canonical_label_map`] are bare (no `_:` prefix).
pub trait JsonLdProcessor: Send + Sync {
    /// Expand a document to its expanded form.
    fn expand(&self, document: &Value) -> Result<Value>;

    /// Compact an expanded document under `context`.
    fn compact(&self, expanded: &Value, context: Option<&Value>) -> Result<Value>;

    /// Serialize an expanded document to N-Quad lines.
    fn to_rdf(&self, expanded: &Value) -> Result<Vec<String>>;

    /// Run RDF canonicalization over N-Quads, returning the issued
    /// identifier map from input blank-node labels to canonical `c14n`
    /// labels.
    fn canonical_label_map(&self, nquads: &[String]) -> Result<BTreeMap<String, String>>;
}

/// Resolution of verification-method documents by URL.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load the JSON document at `url`.
    ///
    /// # Errors
    ///
    /// `INVALID_VERIFICATION_METHOD` when the document cannot be resolved.
    async fn load(&self, url: &str) -> Result<Value>;
}
