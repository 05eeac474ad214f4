//! Attestation signer trait and the default Ed25519 implementation

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use lucid_core::{AgentDid, RuntimeAttestation, RuntimeType};
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Result type for signer operations
pub type SignerResult<T> = Result<T, SignerError>;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("signer unavailable: {0}")]
    Unavailable(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Signs a runtime snapshot into an attestation bound to an agent DID.
#[async_trait::async_trait]
pub trait AttestationSigner: Send + Sync {
    fn name(&self) -> &str;

    async fn sign(
        &self,
        agent_did: &AgentDid,
        runtime_type: RuntimeType,
        manifest: BTreeMap<String, String>,
        state: BTreeMap<String, serde_json::Value>,
    ) -> SignerResult<RuntimeAttestation>;
}

/// The payload actually signed. Field order and `BTreeMap` keys make the
/// JSON encoding deterministic.
#[derive(Serialize)]
struct AttestationPayload<'a> {
    agent_did: &'a AgentDid,
    runtime_type: RuntimeType,
    manifest: &'a BTreeMap<String, String>,
    state: &'a BTreeMap<String, serde_json::Value>,
    issued_at: DateTime<Utc>,
}

/// In-process Ed25519 signer.
#[derive(Debug)]
pub struct Ed25519Signer {
    key_pair: Ed25519KeyPair,
}

impl Ed25519Signer {
    /// Generate a fresh keypair from the system RNG.
    pub fn generate() -> SignerResult<Self> {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng)
            .map_err(|_| SignerError::Unavailable("keypair generation failed".into()))?;
        let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref())
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { key_pair })
    }

    /// Build a signer from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8]) -> SignerResult<Self> {
        let key_pair = Ed25519KeyPair::from_seed_unchecked(seed)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { key_pair })
    }

    /// Base64 encoding of the public key, suitable for
    /// `IdentityDocument::public_key` and verifier trust stores.
    pub fn public_key_b64(&self) -> String {
        BASE64.encode(self.key_pair.public_key().as_ref())
    }
}

#[async_trait::async_trait]
impl AttestationSigner for Ed25519Signer {
    fn name(&self) -> &str {
        "ed25519"
    }

    async fn sign(
        &self,
        agent_did: &AgentDid,
        runtime_type: RuntimeType,
        manifest: BTreeMap<String, String>,
        state: BTreeMap<String, serde_json::Value>,
    ) -> SignerResult<RuntimeAttestation> {
        let issued_at = Utc::now();
        let payload = AttestationPayload {
            agent_did,
            runtime_type,
            manifest: &manifest,
            state: &state,
            issued_at,
        };
        let bytes = serde_json::to_vec(&payload)?;
        let signature = BASE64.encode(self.key_pair.sign(&bytes).as_ref());

        debug!(
            "signed attestation for {} ({}, {} facts)",
            agent_did,
            runtime_type,
            manifest.len()
        );

        Ok(RuntimeAttestation {
            runtime_type,
            manifest,
            state,
            signature,
            issued_at,
        })
    }
}

/// Recompute the signed bytes for an attestation, for out-of-band
/// signature checks against the signer's public key.
pub fn attestation_signing_bytes(
    agent_did: &AgentDid,
    attestation: &RuntimeAttestation,
) -> SignerResult<Vec<u8>> {
    let payload = AttestationPayload {
        agent_did,
        runtime_type: attestation.runtime_type,
        manifest: &attestation.manifest,
        state: &attestation.state,
        issued_at: attestation.issued_at,
    };
    Ok(serde_json::to_vec(&payload)?)
}
