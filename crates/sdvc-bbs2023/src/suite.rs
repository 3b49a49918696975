//! # Cryptosuite Facade
//!
//! [`Bbs2023Suite`] owns the three injected collaborators and exposes the
//! issue, derive, and verify pipelines as methods. Every operation is a
//! pure function over its inputs plus the collaborators; the suite holds
//! no mutable state and can be shared freely.

use serde_json::Value;

use sdvc_core::Result;
use sdvc_crypto::BbsSignatures;

use crate::base::create_base_proof;
use crate::derive::{derive_proof, DerivedCredential};
use crate::proof::{DeriveOptions, FeatureOptions, Proof, ProofOptions};
use crate::traits::{DocumentLoader, JsonLdProcessor};
use crate::verify::verify_proof;

/// The bbs-2023 cryptosuite over its three collaborators.
#[derive(Debug, Clone)]
pub struct Bbs2023Suite<P, L, B> {
    processor: P,
    loader: L,
    bbs: B,
}

impl<P, L, B> Bbs2023Suite<P, L, B>
where
    P: JsonLdProcessor,
    L: DocumentLoader,
    B: BbsSignatures,
{
    /// Assemble the suite from its collaborators.
    pub fn new(processor: P, loader: L, bbs: B) -> Self {
        Self {
            processor,
            loader,
            bbs,
        }
    }

    /// Issue a base proof over `unsecured_document` (issuer side).
    pub async fn create_base_proof(
        &self,
        unsecured_document: &Value,
        options: &ProofOptions,
        mandatory_pointers: &[String],
        features: &FeatureOptions,
    ) -> Result<Proof> {
        create_base_proof(
            &self.processor,
            &self.loader,
            &self.bbs,
            unsecured_document,
            options,
            mandatory_pointers,
            features,
        )
        .await
    }

    /// Derive a disclosure proof and reveal document (holder side).
    pub fn derive_proof(
        &self,
        document: &Value,
        proof: &Proof,
        options: &DeriveOptions,
    ) -> Result<DerivedCredential> {
        derive_proof(&self.processor, &self.bbs, document, proof, options)
    }

    /// Verify a disclosure proof over a revealed document (verifier
    /// side).
    pub async fn verify_proof(&self, document: &Value, proof: &Proof) -> Result<bool> {
        verify_proof(&self.processor, &self.loader, &self.bbs, document, proof).await
    }
}
