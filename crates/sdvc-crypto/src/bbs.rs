//! # BBS Signature Interface
//!
//! The cryptosuite drives BBS through this trait rather than a concrete
//! pairing library: implementations cover the baseline scheme plus the
//! blind-signature and pseudonym extensions. All inputs and outputs are
//! raw bytes in the BLS12-381 G2 ciphersuite's wire sizes, so backends can
//! be swapped without touching the pipelines.
//!
//! [`crate::commitment::CommitmentBbs`] is the in-tree development
//! backend; production deployments supply a pairing-based implementation.

use sdvc_core::Result;

use crate::material::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};

/// Length of a BBS signature in octets (a G1 point plus a scalar).
pub const SIGNATURE_LENGTH: usize = 80;

/// Length of the header a BBS signature binds (two SHA-256 digests).
pub const BBS_HEADER_LENGTH: usize = 64;

/// Secret key bytes.
pub type SecretKey = [u8; SECRET_KEY_LENGTH];

/// Compressed G2 public key bytes.
pub type PublicKey = [u8; PUBLIC_KEY_LENGTH];

/// Signature bytes.
pub type Signature = [u8; SIGNATURE_LENGTH];

/// Output of a pseudonym proof generation: the proof plus the pseudonym it
/// discloses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudonymProof {
    /// The BBS proof bytes.
    pub proof: Vec<u8>,
    /// The pseudonym bound to the verifier's domain.
    pub pseudonym: Vec<u8>,
}

/// The BBS operations the cryptosuite requires from its backend.
///
/// Messages are opaque byte strings (UTF-8 N-Quads in this suite) and
/// disclosed indexes always refer to positions in the original message
/// list handed to the signer.
pub trait BbsSignatures: Send + Sync {
    /// Derive a deterministic keypair from seed material.
    fn generate_key_pair(&self, seed: &[u8]) -> Result<(SecretKey, PublicKey)>;

    /// Sign `messages` bound to `header`.
    fn sign(
        &self,
        secret_key: &SecretKey,
        public_key: &PublicKey,
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<Signature>;

    /// Verify a signature over the full message list.
    fn verify(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<bool>;

    /// Produce a selective-disclosure proof revealing `disclosed_indexes`.
    fn proof_gen(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        header: &[u8],
        presentation_header: &[u8],
        messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
    ) -> Result<Vec<u8>>;

    /// Verify a selective-disclosure proof against the disclosed messages.
    fn proof_verify(
        &self,
        public_key: &PublicKey,
        proof: &[u8],
        header: &[u8],
        presentation_header: &[u8],
        disclosed_messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
    ) -> Result<bool>;

    /// Sign over messages plus a holder commitment (anonymous holder
    /// binding).
    fn blind_sign(
        &self,
        secret_key: &SecretKey,
        public_key: &PublicKey,
        commitment_with_proof: &[u8],
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<Signature>;

    /// Produce a proof over a blind signature using the holder's secret
    /// and blinding factor.
    #[allow(clippy::too_many_arguments)]
    fn blind_proof_gen(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        header: &[u8],
        presentation_header: &[u8],
        messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
        holder_secret: &[u8],
        prover_blind: &[u8],
    ) -> Result<Vec<u8>>;

    /// Verify a blind-signature proof. `message_count` is the number of
    /// signer-supplied messages (the holder's committed message is extra).
    #[allow(clippy::too_many_arguments)]
    fn blind_proof_verify(
        &self,
        public_key: &PublicKey,
        proof: &[u8],
        header: &[u8],
        presentation_header: &[u8],
        message_count: usize,
        disclosed_messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
    ) -> Result<bool>;

    /// Sign with signer-contributed pseudonym entropy over messages plus a
    /// holder commitment.
    #[allow(clippy::too_many_arguments)]
    fn pseudonym_sign(
        &self,
        secret_key: &SecretKey,
        public_key: &PublicKey,
        signer_nym_entropy: &[u8],
        commitment_with_proof: &[u8],
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<Signature>;

    /// Produce a pseudonym-bearing proof. `committed_messages` is empty
    /// for a bare pseudonym and carries the holder secret when the
    /// pseudonym also binds the holder.
    #[allow(clippy::too_many_arguments)]
    fn pseudonym_proof_gen(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        header: &[u8],
        presentation_header: &[u8],
        messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
        signer_nym_entropy: &[u8],
        nym_domain: &[u8],
        committed_messages: &[Vec<u8>],
    ) -> Result<PseudonymProof>;

    /// Verify a pseudonym-bearing proof against the disclosed messages,
    /// the verifier's domain, and the disclosed pseudonym.
    #[allow(clippy::too_many_arguments)]
    fn pseudonym_proof_verify(
        &self,
        public_key: &PublicKey,
        proof: &[u8],
        header: &[u8],
        presentation_header: &[u8],
        message_count: usize,
        nym_domain: &[u8],
        pseudonym: &[u8],
        disclosed_messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
    ) -> Result<bool>;
}
