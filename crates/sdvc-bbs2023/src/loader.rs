//! # Static Document Loader
//!
//! An in-memory URL → document map implementing [`DocumentLoader`].
//! Embeddings that resolve verification methods out-of-band (DID
//! resolution, pinned key sets, test fixtures) register the documents up
//! front; anything unregistered surfaces `INVALID_VERIFICATION_METHOD`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use sdvc_core::{Result, SuiteError};

use crate::traits::DocumentLoader;

/// A fixed map of resolvable documents.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    documents: HashMap<String, Value>,
}

impl StaticLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `document` under `url`, replacing any previous entry.
    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), document);
    }

    /// Builder-style registration.
    pub fn with(mut self, url: impl Into<String>, document: Value) -> Self {
        self.insert(url, document);
        self
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self, url: &str) -> Result<Value> {
        self.documents.get(url).cloned().ok_or_else(|| {
            SuiteError::verification_method(
                "loader::load",
                format!("no document registered for {url:?}"),
            )
        })
    }
}
