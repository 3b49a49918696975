//! # sdvc-bbs2023 — The bbs-2023 Data Integrity Cryptosuite
//!
//! Issues, derives, and verifies selectively-disclosable proofs over
//! JSON-LD credentials using BBS signatures on BLS12-381 G2 keys:
//!
//! - **Canonical grouping** (`group.rs`): RDF canonicalization with
//!   HMAC-shuffled blank-node labels and JSON-Pointer partitioning of the
//!   canonical statement list.
//! - **Base-proof pipeline** (`base.rs`): transform, hash, sign, and
//!   envelope a base proof (issuer side).
//! - **Derivation pipeline** (`derive.rs`): recompute the grouping from
//!   the carried HMAC key, map index spaces, produce the BBS disclosure
//!   proof and the reveal document (holder side).
//! - **Verification pipeline** (`verify.rs`): recanonicalize the revealed
//!   document under the proof's label map and check the BBS proof
//!   (verifier side).
//! - **Envelope** (`envelope.rs`): CBOR positional arrays behind
//!   feature-tagged headers, multibase base64url encoded.
//!
//! JSON-LD processing, RDF canonicalization, document loading, and the
//! BBS primitives are injected collaborators (`traits.rs`,
//! `sdvc_crypto::BbsSignatures`). The crate ships a deterministic subset
//! processor and a static loader for tests and simple embeddings.
//!
//! ## Concurrency Model
//!
//! Single-threaded cooperative: pipelines are async only where I/O
//! happens (document loading), pure computation is synchronous, and the
//! two independent digests of the base-proof hash stage run concurrently.
//! Aborting mid-pipeline leaves no persistent state.
//!
//! ## Crate Policy
//!
//! - No `unsafe`; no `panic!()` or `.unwrap()` outside tests.
//! - No shared mutable state; the suite can be cloned and shared freely.

pub mod base;
pub mod derive;
pub mod envelope;
pub mod feature;
pub mod group;
pub mod hmac_shuffle;
pub mod loader;
pub mod processor;
pub mod proof;
pub mod select;
pub mod skolem;
pub mod suite;
pub mod traits;
pub mod verify;

pub use base::{create_base_proof, HashData, TransformedDocument};
pub use derive::{derive_proof, DerivedCredential};
pub use envelope::{
    parse_base_proof_value, parse_derived_proof_value, serialize_base_proof_value,
    serialize_derived_proof_value, BaseProofValue, DerivedProofValue,
};
pub use feature::Feature;
pub use hmac_shuffle::{HmacIdShuffler, HMAC_KEY_LENGTH};
pub use loader::StaticLoader;
pub use processor::BasicProcessor;
pub use proof::{DeriveOptions, FeatureOptions, Proof, ProofOptions, CRYPTOSUITE, PROOF_TYPE};
pub use suite::Bbs2023Suite;
pub use traits::{DocumentLoader, JsonLdProcessor};
pub use verify::verify_proof;
