//! # sdvc-crypto — Key Material and BBS Interface
//!
//! Provides the key-handling building blocks for the SDVC Stack:
//!
//! - **Key material** (`material.rs`): tagged BLS12-381 G2 key bytes whose
//!   lengths are enforced by construction (32-byte private, 96-byte public).
//! - **Codecs** (`codec.rs`): Multikey (multicodec prefix + base58btc) and
//!   fixed-template JWK encode/decode, plus the JWK thumbprint.
//! - **Keypair** (`keypair.rs`): lifecycle from bare construction through
//!   seeded initialization to verification-method import/export.
//! - **Verification methods** (`verification_method.rs`): the `Multikey` /
//!   `JsonWebKey` document forms, serde-tagged on `type`.
//! - **BBS interface** (`bbs.rs`): the trait the cryptosuite drives,
//!   covering baseline, blind, and pseudonym operations.
//! - **Commitment backend** (`commitment.rs`): a deterministic
//!   commitment-based stand-in honoring the BLS12-381 wire sizes, used for
//!   development and tests until a pairing backend is plugged in.
//!
//! ## Crate Policy
//!
//! - Depends only on `sdvc-core` internally.
//! - Secret key material never implements `Serialize` and is redacted from
//!   `Debug` output.
//! - No `unsafe`; no `panic!()` or `.unwrap()` outside tests.

pub mod bbs;
pub mod codec;
pub mod commitment;
pub mod keypair;
pub mod material;
pub mod verification_method;

pub use bbs::{BbsSignatures, PseudonymProof, BBS_HEADER_LENGTH, SIGNATURE_LENGTH};
pub use codec::{
    jwk_thumbprint, jwk_to_material, material_to_jwk, material_to_multibase,
    multibase_to_material, Jwk,
};
pub use commitment::CommitmentBbs;
pub use keypair::{ExportOptions, ImportOptions, Keypair, MethodKind};
pub use material::{KeyFlag, KeyMaterial, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
pub use verification_method::VerificationMethod;
