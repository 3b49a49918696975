//! End-to-end selective-disclosure flows: issue a base proof, derive a
//! disclosure proof, and verify it, across all four features and the
//! malformed-input edges.

use serde_json::{json, Value};

use sdvc_bbs2023::{
    parse_base_proof_value, parse_derived_proof_value, BasicProcessor, Bbs2023Suite,
    DeriveOptions, Feature, FeatureOptions, ProofOptions, StaticLoader,
};
use sdvc_core::ErrorCode;
use sdvc_crypto::keypair::{ExportOptions, MethodKind};
use sdvc_crypto::{CommitmentBbs, KeyFlag, Keypair};

type Suite = Bbs2023Suite<BasicProcessor, StaticLoader, CommitmentBbs>;

fn credential() -> Value {
    json!({
        "@context": [
            "https://www.w3.org/ns/credentials/v2",
            "https://w3id.org/citizenship/v4rc1"
        ],
        "id": "urn:uuid:3978344f-8596-4c3a-a978-8fcaba3903c5",
        "type": "VerifiableCredential",
        "issuer": "did:example:issuer",
        "validFrom": "2026-01-01T00:00:00Z",
        "credentialSubject": {
            "type": "Person",
            "name": "Jane Doe",
            "birthCountry": "Bahamas",
            "residentSince": "2015-01-01",
            "degrees": [
                {"type": "Degree", "name": "Bachelor of Science"},
                {"type": "Degree", "name": "Master of Science"}
            ]
        }
    })
}

fn setup() -> (Suite, ProofOptions) {
    let mut keypair = Keypair::new(Some("did:example:issuer".to_string()));
    keypair
        .initialize(&CommitmentBbs, Some(&[0u8; 32]))
        .expect("keypair initialization");
    let method = keypair
        .export(&ExportOptions {
            flag: KeyFlag::Private,
            kind: MethodKind::Multikey,
        })
        .expect("keypair export");
    let url = keypair.id.clone().expect("keypair id");
    let loader = StaticLoader::new().with(url.clone(), serde_json::to_value(&method).unwrap());
    let suite = Bbs2023Suite::new(BasicProcessor::new(), loader, CommitmentBbs);
    (suite, ProofOptions::new(url))
}

fn mandatory() -> Vec<String> {
    vec!["/issuer".to_string()]
}

async fn not_verified(suite: &Suite, document: &Value, proof: &sdvc_bbs2023::Proof) -> bool {
    match suite.verify_proof(document, proof).await {
        Ok(verified) => !verified,
        Err(_) => true,
    }
}

#[tokio::test]
async fn base_proof_is_a_baseline_envelope() {
    let (suite, options) = setup();
    let proof = suite
        .create_base_proof(&credential(), &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let proof_value = proof.proof_value.as_deref().unwrap();
    assert!(proof_value.starts_with('u'));
    let base = parse_base_proof_value(proof_value).unwrap();
    assert_eq!(base.feature, Feature::Baseline);
    assert_eq!(base.mandatory_pointers, mandatory());
    assert!(base.signer_nym_entropy.is_none());
}

#[tokio::test]
async fn derive_with_no_selective_pointers_reveals_mandatory_only() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derived = suite
        .derive_proof(&document, &proof, &DeriveOptions::default())
        .unwrap();

    let reveal = derived.reveal_document.as_object().unwrap();
    assert_eq!(reveal["issuer"], json!("did:example:issuer"));
    assert!(reveal.contains_key("@context"));
    assert!(!reveal.contains_key("credentialSubject"));
    assert!(!reveal.contains_key("validFrom"));

    let value = parse_derived_proof_value(derived.proof.proof_value.as_deref().unwrap()).unwrap();
    assert_eq!(value.feature, Feature::Baseline);
    assert!(value.selective_indexes.is_empty());
}

#[tokio::test]
async fn mandatory_only_disclosure_verifies() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derived = suite
        .derive_proof(&document, &proof, &DeriveOptions::default())
        .unwrap();
    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn selective_disclosure_verifies() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derive_options = DeriveOptions {
        selective_pointers: vec!["/credentialSubject/name".to_string()],
        presentation_header: b"presentation-context".to_vec(),
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();

    let subject = &derived.reveal_document["credentialSubject"];
    assert_eq!(subject["name"], json!("Jane Doe"));
    assert!(subject.get("birthCountry").is_none());

    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn array_element_disclosure_verifies() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derive_options = DeriveOptions {
        selective_pointers: vec!["/credentialSubject/degrees/1/name".to_string()],
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();

    let degrees = derived.reveal_document["credentialSubject"]["degrees"]
        .as_array()
        .unwrap();
    assert_eq!(degrees.len(), 1);
    assert_eq!(degrees[0]["name"], json!("Master of Science"));

    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn overlapping_mandatory_and_selective_pointers_verify() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derive_options = DeriveOptions {
        selective_pointers: vec![
            "/issuer".to_string(),
            "/credentialSubject/birthCountry".to_string(),
        ],
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();
    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn derived_index_arrays_are_strictly_ascending_and_bounded() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let base = parse_base_proof_value(proof.proof_value.as_deref().unwrap()).unwrap();
    let derive_options = DeriveOptions {
        selective_pointers: vec![
            "/credentialSubject/name".to_string(),
            "/credentialSubject/birthCountry".to_string(),
        ],
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();
    let value = parse_derived_proof_value(derived.proof.proof_value.as_deref().unwrap()).unwrap();

    assert!(value.mandatory_indexes.windows(2).all(|w| w[0] < w[1]));
    assert!(value.selective_indexes.windows(2).all(|w| w[0] < w[1]));
    assert!(!value.mandatory_indexes.is_empty());
    assert!(!value.selective_indexes.is_empty());

    // Mandatory indexes address positions within the revealed statements.
    let revealed_statements = sdvc_bbs2023::group::canonicalize_with_label_map(
        &BasicProcessor::new(),
        &derived.reveal_document,
        &value.label_map,
    )
    .unwrap();
    for &index in &value.mandatory_indexes {
        assert!(index < revealed_statements.len());
    }
    // Selective indexes address the issuer's non-mandatory list, whose
    // size is the full statement count less the mandatory ones.
    let issued = sdvc_bbs2023::base::transform(
        &BasicProcessor::new(),
        &document,
        &options,
        &base.mandatory_pointers,
    )
    .unwrap();
    let non_mandatory_count = issued.non_mandatory.len();
    for &index in &value.selective_indexes {
        assert!(index < non_mandatory_count);
    }
}

#[tokio::test]
async fn tampered_reveal_document_fails_verification() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derive_options = DeriveOptions {
        selective_pointers: vec!["/credentialSubject/name".to_string()],
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();

    let mut tampered = derived.reveal_document.clone();
    tampered["credentialSubject"]["name"] = json!("John Doe");
    assert!(not_verified(&suite, &tampered, &derived.proof).await);

    let mut tampered = derived.reveal_document.clone();
    tampered["issuer"] = json!("did:example:mallory");
    assert!(not_verified(&suite, &tampered, &derived.proof).await);
}

#[tokio::test]
async fn tampered_proof_value_fails_verification() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derived = suite
        .derive_proof(&document, &proof, &DeriveOptions::default())
        .unwrap();

    let original = derived.proof.proof_value.clone().unwrap();
    // Flip one payload character at a time; every mutation must fail.
    // The final characters are skipped: their low bits can be encoding
    // padding rather than payload.
    for position in [4, original.len() / 2, original.len() - 8] {
        let mut chars: Vec<char> = original.chars().collect();
        chars[position] = if chars[position] == 'A' { 'B' } else { 'A' };
        let mut tampered_proof = derived.proof.clone();
        tampered_proof.proof_value = Some(chars.into_iter().collect());
        assert!(
            not_verified(&suite, &derived.reveal_document, &tampered_proof).await,
            "mutation at {position} slipped through"
        );
    }
}

#[tokio::test]
async fn anonymous_holder_binding_end_to_end() {
    let (suite, options) = setup();
    let document = credential();
    let holder_secret = b"holder-secret".to_vec();
    let prover_blind = b"prover-blind".to_vec();
    let features = FeatureOptions {
        feature: Feature::AnonymousHolderBinding,
        commitment_with_proof: Some(CommitmentBbs::commitment_with_proof(
            &holder_secret,
            &prover_blind,
        )),
        signer_nym_entropy: None,
    };
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &features)
        .await
        .unwrap();
    let base = parse_base_proof_value(proof.proof_value.as_deref().unwrap()).unwrap();
    assert_eq!(base.feature, Feature::AnonymousHolderBinding);

    let derive_options = DeriveOptions {
        selective_pointers: vec!["/credentialSubject/name".to_string()],
        holder_secret: Some(holder_secret),
        prover_blind: Some(prover_blind),
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();
    let value = parse_derived_proof_value(derived.proof.proof_value.as_deref().unwrap()).unwrap();
    assert!(value.length_bbs_messages.is_some());

    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn pseudonym_end_to_end() {
    let (suite, options) = setup();
    let document = credential();
    let features = FeatureOptions {
        feature: Feature::Pseudonym,
        commitment_with_proof: Some(CommitmentBbs::commitment_with_proof(b"hs", b"pb")),
        signer_nym_entropy: Some(b"signer-entropy".to_vec()),
    };
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &features)
        .await
        .unwrap();

    let derive_options = DeriveOptions {
        selective_pointers: vec!["/credentialSubject/birthCountry".to_string()],
        nym_domain: Some(b"https://verifier.example".to_vec()),
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();
    let value = parse_derived_proof_value(derived.proof.proof_value.as_deref().unwrap()).unwrap();
    assert_eq!(value.feature, Feature::Pseudonym);
    assert!(value.pseudonym.is_some());
    assert_eq!(value.nym_domain.as_deref(), Some(b"https://verifier.example".as_slice()));

    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn holder_binding_pseudonym_end_to_end() {
    let (suite, options) = setup();
    let document = credential();
    let features = FeatureOptions {
        feature: Feature::HolderBindingPseudonym,
        commitment_with_proof: Some(CommitmentBbs::commitment_with_proof(b"hs", b"pb")),
        signer_nym_entropy: Some(b"signer-entropy".to_vec()),
    };
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &features)
        .await
        .unwrap();

    let derive_options = DeriveOptions {
        selective_pointers: vec!["/credentialSubject/name".to_string()],
        holder_secret: Some(b"hs".to_vec()),
        nym_domain: Some(b"https://verifier.example".to_vec()),
        ..DeriveOptions::default()
    };
    let derived = suite.derive_proof(&document, &proof, &derive_options).unwrap();
    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn issue_requires_feature_inputs() {
    let (suite, options) = setup();
    let features = FeatureOptions {
        feature: Feature::AnonymousHolderBinding,
        commitment_with_proof: None,
        signer_nym_entropy: None,
    };
    let err = suite
        .create_base_proof(&credential(), &options, &mandatory(), &features)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProofGeneration);

    let features = FeatureOptions {
        feature: Feature::Pseudonym,
        commitment_with_proof: Some(vec![1, 2, 3]),
        signer_nym_entropy: None,
    };
    let err = suite
        .create_base_proof(&credential(), &options, &mandatory(), &features)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProofGeneration);
}

#[tokio::test]
async fn derive_requires_feature_inputs() {
    let (suite, options) = setup();
    let document = credential();
    let features = FeatureOptions {
        feature: Feature::Pseudonym,
        commitment_with_proof: Some(CommitmentBbs::commitment_with_proof(b"hs", b"pb")),
        signer_nym_entropy: Some(b"signer-entropy".to_vec()),
    };
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &features)
        .await
        .unwrap();
    // No nymDomain supplied.
    let err = suite
        .derive_proof(&document, &proof, &DeriveOptions::default())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProofGeneration);
}

#[tokio::test]
async fn derive_rejects_foreign_proofs() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();

    let mut foreign = proof.clone();
    foreign.cryptosuite = "ecdsa-sd-2023".to_string();
    let err = suite
        .derive_proof(&document, &foreign, &DeriveOptions::default())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProofVerification);

    let mut missing = proof.clone();
    missing.proof_value = None;
    assert!(suite
        .derive_proof(&document, &missing, &DeriveOptions::default())
        .is_err());
}

#[tokio::test]
async fn derive_rejects_unmatched_selective_pointer() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derive_options = DeriveOptions {
        selective_pointers: vec!["/credentialSubject/passportNumber".to_string()],
        ..DeriveOptions::default()
    };
    let err = suite
        .derive_proof(&document, &proof, &derive_options)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProofGeneration);
}

#[tokio::test]
async fn unresolvable_verification_method_fails_issuance() {
    let (_, options) = setup();
    let empty_loader_suite = Bbs2023Suite::new(BasicProcessor::new(), StaticLoader::new(), CommitmentBbs);
    let err = empty_loader_suite
        .create_base_proof(&credential(), &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidVerificationMethod);
}

#[tokio::test]
async fn presentation_header_is_bound_into_the_proof() {
    let (suite, options) = setup();
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    let derived_a = suite
        .derive_proof(
            &document,
            &proof,
            &DeriveOptions {
                presentation_header: b"context-a".to_vec(),
                ..DeriveOptions::default()
            },
        )
        .unwrap();
    let derived_b = suite
        .derive_proof(
            &document,
            &proof,
            &DeriveOptions {
                presentation_header: b"context-b".to_vec(),
                ..DeriveOptions::default()
            },
        )
        .unwrap();
    assert_ne!(derived_a.proof.proof_value, derived_b.proof.proof_value);
    assert!(suite
        .verify_proof(&derived_a.reveal_document, &derived_a.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn dated_proofs_roundtrip() {
    let (suite, mut options) = setup();
    options.created = Some("2026-02-01T08:00:00Z".to_string());
    let document = credential();
    let proof = suite
        .create_base_proof(&document, &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap();
    assert_eq!(proof.created.as_deref(), Some("2026-02-01T08:00:00Z"));
    let derived = suite
        .derive_proof(&document, &proof, &DeriveOptions::default())
        .unwrap();
    assert!(suite
        .verify_proof(&derived.reveal_document, &derived.proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn invalid_created_timestamp_fails_issuance() {
    let (suite, mut options) = setup();
    options.created = Some("yesterday".to_string());
    let err = suite
        .create_base_proof(&credential(), &options, &mandatory(), &FeatureOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProofGeneration);
}
