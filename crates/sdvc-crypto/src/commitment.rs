//! # Commitment-Based Development Backend
//!
//! A deterministic, commitment-based implementation of the
//! [`BbsSignatures`](crate::bbs::BbsSignatures) interface. Each message is
//! committed individually under a key derived from the public key, and
//! proofs carry the full commitment list plus a MAC binding the header,
//! presentation header, and (for pseudonym proofs) the verifier domain and
//! pseudonym. A verifier recomputes the commitments for the disclosed
//! messages and checks the binding MAC.
//!
//! This achieves the interface, the wire sizes (32-byte secret keys,
//! 96-byte public keys, 80-byte signatures), and the tamper-evidence of
//! the BLS12-381 ciphersuite with standard hash assumptions, so the whole
//! selective-disclosure pipeline runs without a pairing library. It is not
//! zero-knowledge and it is not unforgeable against a holder: anyone
//! holding the public key can recompute the MAC key. When a pairing
//! backend is integrated it replaces this module behind the same trait.
//!
//! ## Determinism
//!
//! Every operation is a pure function of its inputs. Signatures and proofs
//! contain no randomness, so fixtures remain stable across runs.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use sdvc_core::{Result, SuiteError};

use crate::bbs::{
    BbsSignatures, PseudonymProof, PublicKey, SecretKey, Signature, SIGNATURE_LENGTH,
};
use crate::material::PUBLIC_KEY_LENGTH;

const KEYGEN_DST: &[u8] = b"sdvc/commitment/keygen";
const MAC_KEY_DST: &[u8] = b"sdvc/commitment/mac-key";
const COMMIT_DST: &[u8] = b"sdvc/commitment/commit";
const SIGNATURE_DST: &[u8] = b"sdvc/commitment/signature";
const BINDING_DST: &[u8] = b"sdvc/commitment/binding";
const CWP_DST: &[u8] = b"sdvc/commitment/commitment-with-proof";
const BLIND_MESSAGE_DST: &[u8] = b"sdvc/commitment/blind-message";
const NYM_SECRET_DST: &[u8] = b"sdvc/commitment/nym-secret";
const PSEUDONYM_DST: &[u8] = b"sdvc/commitment/pseudonym";

/// The commitment-based development backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitmentBbs;

impl CommitmentBbs {
    /// Create a backend instance.
    pub fn new() -> Self {
        Self
    }

    /// Holder-side commitment over a secret and blinding factor, passed to
    /// the signer for the blind and pseudonym flows.
    pub fn commitment_with_proof(holder_secret: &[u8], prover_blind: &[u8]) -> Vec<u8> {
        hash_parts(CWP_DST, &[holder_secret, prover_blind]).to_vec()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Length-prefixed SHA-256 over domain-separated parts.
fn hash_parts(dst: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update((dst.len() as u64).to_be_bytes());
    hasher.update(dst);
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Length-prefixed HMAC-SHA-256 over domain-separated parts.
fn mac_parts(key: &[u8; 32], dst: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
        .expect("HMAC-SHA-256 accepts keys of any length");
    mac.update(&(dst.len() as u64).to_be_bytes());
    mac.update(dst);
    for part in parts {
        mac.update(&(part.len() as u64).to_be_bytes());
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

fn derive_public_key(secret_key: &SecretKey) -> PublicKey {
    let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
    for (i, chunk) in public_key.chunks_mut(32).enumerate() {
        chunk.copy_from_slice(&hash_parts(KEYGEN_DST, &[secret_key, &[i as u8 + 1]]));
    }
    public_key
}

fn mac_key(public_key: &PublicKey) -> [u8; 32] {
    hash_parts(MAC_KEY_DST, &[public_key])
}

fn commit(key: &[u8; 32], index: u64, message: &[u8]) -> [u8; 32] {
    // The index prefix prevents commitment reordering.
    mac_parts(key, COMMIT_DST, &[&index.to_be_bytes(), message])
}

/// Core signature computation. `domain` folds in the feature-specific
/// context (empty for baseline, the holder commitment for blind
/// signatures, entropy plus commitment for pseudonym signatures).
fn signature_bytes(
    key: &[u8; 32],
    domain: &[&[u8]],
    header: &[u8],
    messages: &[Vec<u8>],
) -> Signature {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(2 + domain.len() + messages.len());
    parts.extend_from_slice(domain);
    parts.push(header);
    let count = (messages.len() as u64).to_be_bytes();
    parts.push(&count);
    for message in messages {
        parts.push(message);
    }
    let t0 = mac_parts(key, SIGNATURE_DST, &parts);
    let t1 = mac_parts(key, SIGNATURE_DST, &[&t0, &[1]]);
    let t2 = mac_parts(key, SIGNATURE_DST, &[&t0, &[2]]);
    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature[..32].copy_from_slice(&t0);
    signature[32..64].copy_from_slice(&t1);
    signature[64..].copy_from_slice(&t2[..16]);
    signature
}

fn check_secret_matches_public(
    operation: &'static str,
    secret_key: &SecretKey,
    public_key: &PublicKey,
) -> Result<()> {
    if &derive_public_key(secret_key) != public_key {
        return Err(SuiteError::generation(
            operation,
            "secret key does not correspond to the supplied public key",
        ));
    }
    Ok(())
}

fn check_disclosed_indexes(
    operation: &'static str,
    disclosed_indexes: &[usize],
    message_count: usize,
) -> Result<()> {
    let mut previous: Option<usize> = None;
    for &index in disclosed_indexes {
        if index >= message_count {
            return Err(SuiteError::generation(
                operation,
                format!("disclosed index {index} out of range (message count {message_count})"),
            ));
        }
        if let Some(p) = previous {
            if index <= p {
                return Err(SuiteError::generation(
                    operation,
                    "disclosed indexes must be strictly ascending",
                ));
            }
        }
        previous = Some(index);
    }
    Ok(())
}

/// Wire form of a proof: total message count, one commitment per message,
/// and the binding MAC.
fn assemble_proof(total: usize, commitments: &[[u8; 32]], binding: &[u8; 32]) -> Vec<u8> {
    let mut proof = Vec::with_capacity(8 + commitments.len() * 32 + 32);
    proof.extend_from_slice(&(total as u64).to_be_bytes());
    for commitment in commitments {
        proof.extend_from_slice(commitment);
    }
    proof.extend_from_slice(binding);
    proof
}

struct ParsedProof {
    total: usize,
    commitments: Vec<[u8; 32]>,
    binding: [u8; 32],
}

fn parse_proof(proof: &[u8]) -> Option<ParsedProof> {
    if proof.len() < 8 + 32 {
        return None;
    }
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&proof[..8]);
    let total = u64::from_be_bytes(count_bytes) as usize;
    if proof.len() != 8 + total * 32 + 32 {
        return None;
    }
    let mut commitments = Vec::with_capacity(total);
    for i in 0..total {
        let start = 8 + i * 32;
        let mut c = [0u8; 32];
        c.copy_from_slice(&proof[start..start + 32]);
        commitments.push(c);
    }
    let mut binding = [0u8; 32];
    binding.copy_from_slice(&proof[8 + total * 32..]);
    Some(ParsedProof {
        total,
        commitments,
        binding,
    })
}

fn binding_mac(
    key: &[u8; 32],
    header: &[u8],
    presentation_header: &[u8],
    commitments: &[[u8; 32]],
    extra: &[&[u8]],
) -> [u8; 32] {
    let count = (commitments.len() as u64).to_be_bytes();
    let mut parts: Vec<&[u8]> = Vec::with_capacity(3 + commitments.len() + extra.len());
    parts.push(header);
    parts.push(presentation_header);
    parts.push(&count);
    for commitment in commitments {
        parts.push(commitment);
    }
    parts.extend_from_slice(extra);
    mac_parts(key, BINDING_DST, &parts)
}

fn disclosed_match(
    key: &[u8; 32],
    parsed: &ParsedProof,
    message_count: usize,
    disclosed_messages: &[Vec<u8>],
    disclosed_indexes: &[usize],
) -> bool {
    if disclosed_messages.len() != disclosed_indexes.len() {
        return false;
    }
    for (&index, message) in disclosed_indexes.iter().zip(disclosed_messages) {
        if index >= message_count || index >= parsed.total {
            return false;
        }
        if commit(key, index as u64, message) != parsed.commitments[index] {
            return false;
        }
    }
    true
}

fn commitments_for(key: &[u8; 32], messages: &[Vec<u8>], extra: &[Vec<u8>]) -> Vec<[u8; 32]> {
    messages
        .iter()
        .chain(extra)
        .enumerate()
        .map(|(i, message)| commit(key, i as u64, message))
        .collect()
}

// ---------------------------------------------------------------------------
// BbsSignatures implementation
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
impl BbsSignatures for CommitmentBbs {
    fn generate_key_pair(&self, seed: &[u8]) -> Result<(SecretKey, PublicKey)> {
        let secret_key = hash_parts(KEYGEN_DST, &[seed, &[0]]);
        let public_key = derive_public_key(&secret_key);
        Ok((secret_key, public_key))
    }

    fn sign(
        &self,
        secret_key: &SecretKey,
        public_key: &PublicKey,
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<Signature> {
        check_secret_matches_public("commitment::sign", secret_key, public_key)?;
        Ok(signature_bytes(&mac_key(public_key), &[], header, messages))
    }

    fn verify(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<bool> {
        let expected = signature_bytes(&mac_key(public_key), &[], header, messages);
        Ok(&expected == signature)
    }

    fn proof_gen(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        header: &[u8],
        presentation_header: &[u8],
        messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
    ) -> Result<Vec<u8>> {
        const OP: &str = "commitment::proof_gen";
        if !self.verify(public_key, signature, header, messages)? {
            return Err(SuiteError::generation(OP, "signature is not valid for the messages"));
        }
        check_disclosed_indexes(OP, disclosed_indexes, messages.len())?;
        let key = mac_key(public_key);
        let commitments = commitments_for(&key, messages, &[]);
        let binding = binding_mac(&key, header, presentation_header, &commitments, &[]);
        Ok(assemble_proof(messages.len(), &commitments, &binding))
    }

    fn proof_verify(
        &self,
        public_key: &PublicKey,
        proof: &[u8],
        header: &[u8],
        presentation_header: &[u8],
        disclosed_messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
    ) -> Result<bool> {
        let key = mac_key(public_key);
        let Some(parsed) = parse_proof(proof) else {
            return Ok(false);
        };
        let binding = binding_mac(&key, header, presentation_header, &parsed.commitments, &[]);
        Ok(binding == parsed.binding
            && disclosed_match(&key, &parsed, parsed.total, disclosed_messages, disclosed_indexes))
    }

    fn blind_sign(
        &self,
        secret_key: &SecretKey,
        public_key: &PublicKey,
        commitment_with_proof: &[u8],
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<Signature> {
        check_secret_matches_public("commitment::blind_sign", secret_key, public_key)?;
        Ok(signature_bytes(
            &mac_key(public_key),
            &[commitment_with_proof],
            header,
            messages,
        ))
    }

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
    ) -> Result<Vec<u8>> {
        const OP: &str = "commitment::blind_proof_gen";
        let key = mac_key(public_key);
        let commitment = Self::commitment_with_proof(holder_secret, prover_blind);
        let expected = signature_bytes(&key, &[commitment.as_slice()], header, messages);
        if &expected != signature {
            return Err(SuiteError::generation(
                OP,
                "signature does not bind the supplied holder commitment",
            ));
        }
        check_disclosed_indexes(OP, disclosed_indexes, messages.len())?;
        let blind_message = hash_parts(BLIND_MESSAGE_DST, &[holder_secret, prover_blind]).to_vec();
        let commitments = commitments_for(&key, messages, std::slice::from_ref(&blind_message));
        let binding = binding_mac(&key, header, presentation_header, &commitments, &[]);
        Ok(assemble_proof(commitments.len(), &commitments, &binding))
    }

    fn blind_proof_verify(
        &self,
        public_key: &PublicKey,
        proof: &[u8],
        header: &[u8],
        presentation_header: &[u8],
        message_count: usize,
        disclosed_messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
    ) -> Result<bool> {
        let key = mac_key(public_key);
        let Some(parsed) = parse_proof(proof) else {
            return Ok(false);
        };
        if parsed.total != message_count + 1 {
            return Ok(false);
        }
        let binding = binding_mac(&key, header, presentation_header, &parsed.commitments, &[]);
        Ok(binding == parsed.binding
            && disclosed_match(&key, &parsed, message_count, disclosed_messages, disclosed_indexes))
    }

    fn pseudonym_sign(
        &self,
        secret_key: &SecretKey,
        public_key: &PublicKey,
        signer_nym_entropy: &[u8],
        commitment_with_proof: &[u8],
        header: &[u8],
        messages: &[Vec<u8>],
    ) -> Result<Signature> {
        check_secret_matches_public("commitment::pseudonym_sign", secret_key, public_key)?;
        Ok(signature_bytes(
            &mac_key(public_key),
            &[signer_nym_entropy, commitment_with_proof],
            header,
            messages,
        ))
    }

    fn pseudonym_proof_gen(
        &self,
        public_key: &PublicKey,
        _signature: &Signature,
        header: &[u8],
        presentation_header: &[u8],
        messages: &[Vec<u8>],
        disclosed_indexes: &[usize],
        signer_nym_entropy: &[u8],
        nym_domain: &[u8],
        committed_messages: &[Vec<u8>],
    ) -> Result<PseudonymProof> {
        const OP: &str = "commitment::pseudonym_proof_gen";
        check_disclosed_indexes(OP, disclosed_indexes, messages.len())?;
        let key = mac_key(public_key);
        let mut secret_parts: Vec<&[u8]> = vec![signer_nym_entropy];
        for message in committed_messages {
            secret_parts.push(message);
        }
        let nym_secret = hash_parts(NYM_SECRET_DST, &secret_parts);
        let pseudonym = hash_parts(PSEUDONYM_DST, &[nym_domain, &nym_secret]).to_vec();
        let commitments = commitments_for(&key, messages, committed_messages);
        let binding = binding_mac(
            &key,
            header,
            presentation_header,
            &commitments,
            &[nym_domain, &pseudonym],
        );
        let proof = assemble_proof(commitments.len(), &commitments, &binding);
        Ok(PseudonymProof { proof, pseudonym })
    }

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
    ) -> Result<bool> {
        let key = mac_key(public_key);
        let Some(parsed) = parse_proof(proof) else {
            return Ok(false);
        };
        if parsed.total < message_count {
            return Ok(false);
        }
        let binding = binding_mac(
            &key,
            header,
            presentation_header,
            &parsed.commitments,
            &[nym_domain, pseudonym],
        );
        Ok(binding == parsed.binding
            && disclosed_match(&key, &parsed, message_count, disclosed_messages, disclosed_indexes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> Vec<Vec<u8>> {
        vec![
            b"_:b0 <http://example.org/ns#name> \"Alice\" .\n".to_vec(),
            b"_:b0 <http://example.org/ns#age> \"25\" .\n".to_vec(),
            b"_:b0 <http://example.org/ns#country> \"BS\" .\n".to_vec(),
            b"_:b0 <http://example.org/ns#status> \"cleared\" .\n".to_vec(),
        ]
    }

    fn keypair() -> (SecretKey, PublicKey) {
        CommitmentBbs.generate_key_pair(&[0u8; 32]).unwrap()
    }

    #[test]
    fn keygen_is_deterministic_with_expected_sizes() {
        let (sk1, pk1) = keypair();
        let (sk2, pk2) = keypair();
        assert_eq!(sk1, sk2);
        assert_eq!(pk1, pk2);
        assert_eq!(sk1.len(), 32);
        assert_eq!(pk1.len(), 96);
    }

    #[test]
    fn sign_and_verify() {
        let (sk, pk) = keypair();
        let sig = CommitmentBbs.sign(&sk, &pk, b"header", &messages()).unwrap();
        assert_eq!(sig.len(), SIGNATURE_LENGTH);
        assert!(CommitmentBbs.verify(&pk, &sig, b"header", &messages()).unwrap());
        assert!(!CommitmentBbs.verify(&pk, &sig, b"other", &messages()).unwrap());
    }

    #[test]
    fn sign_rejects_mismatched_keys() {
        let (sk, _) = keypair();
        let (_, other_pk) = CommitmentBbs.generate_key_pair(&[1u8; 32]).unwrap();
        assert!(CommitmentBbs.sign(&sk, &other_pk, b"h", &messages()).is_err());
    }

    #[test]
    fn proof_roundtrip_subset() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let sig = CommitmentBbs.sign(&sk, &pk, b"h", &msgs).unwrap();
        let proof = CommitmentBbs
            .proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[1, 3])
            .unwrap();
        let disclosed = vec![msgs[1].clone(), msgs[3].clone()];
        assert!(CommitmentBbs
            .proof_verify(&pk, &proof, b"h", b"ph", &disclosed, &[1, 3])
            .unwrap());
    }

    #[test]
    fn proof_rejects_tampered_message() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let sig = CommitmentBbs.sign(&sk, &pk, b"h", &msgs).unwrap();
        let proof = CommitmentBbs
            .proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[0])
            .unwrap();
        let tampered = vec![b"_:b0 <http://example.org/ns#name> \"Mallory\" .\n".to_vec()];
        assert!(!CommitmentBbs
            .proof_verify(&pk, &proof, b"h", b"ph", &tampered, &[0])
            .unwrap());
    }

    #[test]
    fn proof_rejects_tampered_presentation_header() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let sig = CommitmentBbs.sign(&sk, &pk, b"h", &msgs).unwrap();
        let proof = CommitmentBbs
            .proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[0])
            .unwrap();
        let disclosed = vec![msgs[0].clone()];
        assert!(!CommitmentBbs
            .proof_verify(&pk, &proof, b"h", b"other", &disclosed, &[0])
            .unwrap());
    }

    #[test]
    fn proof_rejects_tampered_bytes() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let sig = CommitmentBbs.sign(&sk, &pk, b"h", &msgs).unwrap();
        let mut proof = CommitmentBbs
            .proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[0])
            .unwrap();
        let last = proof.len() - 1;
        proof[last] ^= 0x01;
        let disclosed = vec![msgs[0].clone()];
        assert!(!CommitmentBbs
            .proof_verify(&pk, &proof, b"h", b"ph", &disclosed, &[0])
            .unwrap());
    }

    #[test]
    fn proof_gen_rejects_invalid_signature() {
        let (_, pk) = keypair();
        let bad = [0u8; SIGNATURE_LENGTH];
        assert!(CommitmentBbs
            .proof_gen(&pk, &bad, b"h", b"ph", &messages(), &[0])
            .is_err());
    }

    #[test]
    fn proof_gen_rejects_bad_indexes() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let sig = CommitmentBbs.sign(&sk, &pk, b"h", &msgs).unwrap();
        assert!(CommitmentBbs
            .proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[9])
            .is_err());
        assert!(CommitmentBbs
            .proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[2, 1])
            .is_err());
    }

    #[test]
    fn proof_verify_rejects_garbage() {
        let (_, pk) = keypair();
        assert!(!CommitmentBbs
            .proof_verify(&pk, b"garbage", b"h", b"ph", &[], &[])
            .unwrap());
    }

    #[test]
    fn blind_flow_roundtrip() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let holder_secret = b"holder-secret";
        let prover_blind = b"prover-blind";
        let commitment = CommitmentBbs::commitment_with_proof(holder_secret, prover_blind);
        let sig = CommitmentBbs
            .blind_sign(&sk, &pk, &commitment, b"h", &msgs)
            .unwrap();
        let proof = CommitmentBbs
            .blind_proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[0], holder_secret, prover_blind)
            .unwrap();
        let disclosed = vec![msgs[0].clone()];
        assert!(CommitmentBbs
            .blind_proof_verify(&pk, &proof, b"h", b"ph", msgs.len(), &disclosed, &[0])
            .unwrap());
        // Wrong message count is rejected.
        assert!(!CommitmentBbs
            .blind_proof_verify(&pk, &proof, b"h", b"ph", msgs.len() + 1, &disclosed, &[0])
            .unwrap());
    }

    #[test]
    fn blind_proof_gen_rejects_wrong_secret() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let commitment = CommitmentBbs::commitment_with_proof(b"holder-secret", b"prover-blind");
        let sig = CommitmentBbs
            .blind_sign(&sk, &pk, &commitment, b"h", &msgs)
            .unwrap();
        assert!(CommitmentBbs
            .blind_proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[0], b"wrong", b"prover-blind")
            .is_err());
    }

    #[test]
    fn pseudonym_flow_roundtrip() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let entropy = b"signer-entropy";
        let commitment = CommitmentBbs::commitment_with_proof(b"holder-secret", b"prover-blind");
        let sig = CommitmentBbs
            .pseudonym_sign(&sk, &pk, entropy, &commitment, b"h", &msgs)
            .unwrap();
        let output = CommitmentBbs
            .pseudonym_proof_gen(
                &pk,
                &sig,
                b"h",
                b"ph",
                &msgs,
                &[1],
                entropy,
                b"https://verifier.example",
                &[],
            )
            .unwrap();
        let disclosed = vec![msgs[1].clone()];
        assert!(CommitmentBbs
            .pseudonym_proof_verify(
                &pk,
                &output.proof,
                b"h",
                b"ph",
                msgs.len(),
                b"https://verifier.example",
                &output.pseudonym,
                &disclosed,
                &[1],
            )
            .unwrap());
        // A tampered pseudonym fails the binding MAC.
        let mut wrong = output.pseudonym.clone();
        wrong[0] ^= 0xff;
        assert!(!CommitmentBbs
            .pseudonym_proof_verify(
                &pk,
                &output.proof,
                b"h",
                b"ph",
                msgs.len(),
                b"https://verifier.example",
                &wrong,
                &disclosed,
                &[1],
            )
            .unwrap());
    }

    #[test]
    fn pseudonym_is_stable_per_domain() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let entropy = b"signer-entropy";
        let commitment = CommitmentBbs::commitment_with_proof(b"hs", b"pb");
        let sig = CommitmentBbs
            .pseudonym_sign(&sk, &pk, entropy, &commitment, b"h", &msgs)
            .unwrap();
        let a = CommitmentBbs
            .pseudonym_proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[], entropy, b"domain-a", &[])
            .unwrap();
        let b = CommitmentBbs
            .pseudonym_proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[], entropy, b"domain-a", &[])
            .unwrap();
        let c = CommitmentBbs
            .pseudonym_proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[], entropy, b"domain-b", &[])
            .unwrap();
        assert_eq!(a.pseudonym, b.pseudonym);
        assert_ne!(a.pseudonym, c.pseudonym);
    }

    #[test]
    fn holder_bound_pseudonym_depends_on_committed_messages() {
        let (sk, pk) = keypair();
        let msgs = messages();
        let entropy = b"signer-entropy";
        let commitment = CommitmentBbs::commitment_with_proof(b"hs", b"pb");
        let sig = CommitmentBbs
            .pseudonym_sign(&sk, &pk, entropy, &commitment, b"h", &msgs)
            .unwrap();
        let bare = CommitmentBbs
            .pseudonym_proof_gen(&pk, &sig, b"h", b"ph", &msgs, &[], entropy, b"domain", &[])
            .unwrap();
        let bound = CommitmentBbs
            .pseudonym_proof_gen(
                &pk,
                &sig,
                b"h",
                b"ph",
                &msgs,
                &[],
                entropy,
                b"domain",
                &[b"hs".to_vec()],
            )
            .unwrap();
        assert_ne!(bare.pseudonym, bound.pseudonym);
    }
}
