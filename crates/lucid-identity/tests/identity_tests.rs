//! Tests for lucid-identity: memory registry, did:web URL mapping,
//! Ed25519 credential verification, rotation policy

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use lucid_core::{AgentDid, Credential, IdentityDocument};
use lucid_identity::*;
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};

fn did(s: &str) -> AgentDid {
    AgentDid::new(s)
}

// ===========================================================================
// MemoryRegistry — resolution
// ===========================================================================

#[tokio::test]
async fn memory_registry_resolve_roundtrip() {
    let registry = MemoryRegistry::new();
    registry.register(IdentityDocument::new("did:web:example.com").with_public_key("a2V5"));

    let doc = registry.resolve(&did("did:web:example.com")).await.unwrap();
    assert_eq!(doc.did.as_str(), "did:web:example.com");
    assert_eq!(doc.public_key.as_deref(), Some("a2V5"));
}

#[tokio::test]
async fn memory_registry_unknown_did_is_not_found() {
    let registry = MemoryRegistry::new();
    let err = registry.resolve(&did("did:web:missing")).await.unwrap_err();
    assert!(matches!(err, IdentityError::NotFound(_)));
    assert!(err.to_string().contains("did:web:missing"));
}

#[tokio::test]
async fn memory_registry_remove_unregisters() {
    let registry = MemoryRegistry::new();
    registry.register(IdentityDocument::new("did:web:gone"));
    registry.remove(&did("did:web:gone"));
    assert!(registry.resolve(&did("did:web:gone")).await.is_err());
}

// ===========================================================================
// MemoryRegistry — credential store
// ===========================================================================

#[tokio::test]
async fn memory_registry_lists_credentials_per_subject() {
    let registry = MemoryRegistry::new();
    registry.register(IdentityDocument::new("did:web:a"));
    registry.register(IdentityDocument::new("did:web:b"));
    registry.add_credential(Credential::new("vc-1", "did:web:a", ["read"]));
    registry.add_credential(Credential::new("vc-2", "did:web:a", ["write"]));
    registry.add_credential(Credential::new("vc-3", "did:web:b", ["admin"]));

    let a = registry
        .list_credentials(&IdentityDocument::new("did:web:a"))
        .await
        .unwrap();
    assert_eq!(a.len(), 2);

    let b = registry
        .list_credentials(&IdentityDocument::new("did:web:b"))
        .await
        .unwrap();
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].id, "vc-3");
}

#[tokio::test]
async fn memory_registry_empty_credentials_for_unknown_subject() {
    let registry = MemoryRegistry::new();
    let credentials = registry
        .list_credentials(&IdentityDocument::new("did:web:nobody"))
        .await
        .unwrap();
    assert!(credentials.is_empty());
}

// ===========================================================================
// AcceptAllVerifier
// ===========================================================================

#[tokio::test]
async fn accept_all_verifier_accepts_unsigned_credentials() {
    let verifier = AcceptAllVerifier::new();
    let credential = Credential::new("vc-1", "did:web:a", ["read"]);
    assert!(verifier.verify(&credential).await.unwrap());
}

// ===========================================================================
// Ed25519Verifier
// ===========================================================================

fn test_keypair() -> Ed25519KeyPair {
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&SystemRandom::new()).unwrap();
    Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap()
}

fn sign_credential(key_pair: &Ed25519KeyPair, credential: Credential) -> Credential {
    let signature = BASE64.encode(key_pair.sign(&credential.signing_bytes()).as_ref());
    credential.with_signature(signature)
}

#[tokio::test]
async fn ed25519_verifier_accepts_valid_signature() {
    let key_pair = test_keypair();
    let verifier = Ed25519Verifier::new();
    verifier
        .trust(
            &did("did:web:a"),
            &BASE64.encode(key_pair.public_key().as_ref()),
        )
        .unwrap();

    let credential = sign_credential(&key_pair, Credential::new("vc-1", "did:web:a", ["read"]));
    assert!(verifier.verify(&credential).await.unwrap());
}

#[tokio::test]
async fn ed25519_verifier_rejects_tampered_credential() {
    let key_pair = test_keypair();
    let verifier = Ed25519Verifier::new();
    verifier
        .trust(
            &did("did:web:a"),
            &BASE64.encode(key_pair.public_key().as_ref()),
        )
        .unwrap();

    let mut credential =
        sign_credential(&key_pair, Credential::new("vc-1", "did:web:a", ["read"]));
    // Escalate capabilities after signing
    credential.capabilities.insert("admin".to_string());
    assert!(!verifier.verify(&credential).await.unwrap());
}

#[tokio::test]
async fn ed25519_verifier_rejects_wrong_key() {
    let signing_pair = test_keypair();
    let other_pair = test_keypair();
    let verifier = Ed25519Verifier::new();
    verifier
        .trust(
            &did("did:web:a"),
            &BASE64.encode(other_pair.public_key().as_ref()),
        )
        .unwrap();

    let credential =
        sign_credential(&signing_pair, Credential::new("vc-1", "did:web:a", ["read"]));
    assert!(!verifier.verify(&credential).await.unwrap());
}

#[tokio::test]
async fn ed25519_verifier_missing_signature_is_invalid() {
    let key_pair = test_keypair();
    let verifier = Ed25519Verifier::new();
    verifier
        .trust(
            &did("did:web:a"),
            &BASE64.encode(key_pair.public_key().as_ref()),
        )
        .unwrap();

    let credential = Credential::new("vc-1", "did:web:a", ["read"]);
    assert!(!verifier.verify(&credential).await.unwrap());
}

#[tokio::test]
async fn ed25519_verifier_garbled_signature_is_invalid() {
    let key_pair = test_keypair();
    let verifier = Ed25519Verifier::new();
    verifier
        .trust(
            &did("did:web:a"),
            &BASE64.encode(key_pair.public_key().as_ref()),
        )
        .unwrap();

    let credential =
        Credential::new("vc-1", "did:web:a", ["read"]).with_signature("not base64!!!");
    assert!(!verifier.verify(&credential).await.unwrap());
}

#[tokio::test]
async fn ed25519_verifier_untrusted_subject_errors() {
    let verifier = Ed25519Verifier::new();
    let credential = Credential::new("vc-1", "did:web:stranger", ["read"]);
    let err = verifier.verify(&credential).await.unwrap_err();
    assert!(matches!(err, IdentityError::Verifier(_)));
}

#[tokio::test]
async fn ed25519_verifier_trust_document_registers_key() {
    let key_pair = test_keypair();
    let verifier = Ed25519Verifier::new();
    let doc = IdentityDocument::new("did:web:a")
        .with_public_key(BASE64.encode(key_pair.public_key().as_ref()));
    verifier.trust_document(&doc).unwrap();

    let credential = sign_credential(&key_pair, Credential::new("vc-1", "did:web:a", ["read"]));
    assert!(verifier.verify(&credential).await.unwrap());
}

#[test]
fn ed25519_verifier_rejects_malformed_trusted_key() {
    let verifier = Ed25519Verifier::new();
    assert!(verifier.trust(&did("did:web:a"), "???").is_err());
}

// ===========================================================================
// MaxAgeRotationPolicy
// ===========================================================================

#[tokio::test]
async fn rotation_fresh_key_is_not_due() {
    let policy = MaxAgeRotationPolicy::new(Duration::days(90));
    policy.record_rotation(&did("did:web:a"), Utc::now());
    assert!(!policy.needs_rotation(&did("did:web:a")).await.unwrap());
}

#[tokio::test]
async fn rotation_old_key_is_due() {
    let policy = MaxAgeRotationPolicy::new(Duration::days(90));
    policy.record_rotation(&did("did:web:a"), Utc::now() - Duration::days(120));
    assert!(policy.needs_rotation(&did("did:web:a")).await.unwrap());
}

#[tokio::test]
async fn rotation_unrecorded_key_is_due() {
    let policy = MaxAgeRotationPolicy::new(Duration::days(90));
    assert!(policy.needs_rotation(&did("did:web:never")).await.unwrap());
}
