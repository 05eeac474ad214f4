//! Credential listing and verification seams

use crate::error::{IdentityError, IdentityResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use dashmap::DashMap;
use lucid_core::{AgentDid, Credential, IdentityDocument};
use ring::signature::{UnparsedPublicKey, ED25519};

/// Lists the credentials associated with a resolved identity.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn list_credentials(&self, document: &IdentityDocument) -> IdentityResult<Vec<Credential>>;
}

/// Verifies a single credential's validity.
///
/// `Ok(false)` means the credential is cryptographically invalid;
/// `Err` means the verifier could not run at all (misconfiguration,
/// unreachable backend). The orchestrator treats both as fatal.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credential: &Credential) -> IdentityResult<bool>;
}

/// Ed25519 credential verifier backed by a per-DID trust store.
///
/// Checks the credential signature over `Credential::signing_bytes()`
/// against the trusted public key for the credential subject.
#[derive(Default)]
pub struct Ed25519Verifier {
    keys: DashMap<String, Vec<u8>>,
}

impl Ed25519Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust a base64-encoded Ed25519 public key for a DID.
    pub fn trust(&self, did: &AgentDid, public_key_b64: &str) -> IdentityResult<()> {
        let key = BASE64
            .decode(public_key_b64)
            .map_err(|e| IdentityError::Verifier(format!("invalid public key for {did}: {e}")))?;
        self.keys.insert(did.as_str().to_string(), key);
        Ok(())
    }

    /// Trust every public key carried by an identity document.
    pub fn trust_document(&self, document: &IdentityDocument) -> IdentityResult<()> {
        if let Some(ref key) = document.public_key {
            self.trust(&document.did, key)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for Ed25519Verifier {
    async fn verify(&self, credential: &Credential) -> IdentityResult<bool> {
        let key = self
            .keys
            .get(credential.subject.as_str())
            .ok_or_else(|| {
                IdentityError::Verifier(format!(
                    "no trusted key for {}",
                    credential.subject
                ))
            })?;

        let Some(ref signature_b64) = credential.signature else {
            return Ok(false);
        };
        let Ok(signature) = BASE64.decode(signature_b64) else {
            return Ok(false);
        };

        let public_key = UnparsedPublicKey::new(&ED25519, key.value().as_slice());
        Ok(public_key
            .verify(&credential.signing_bytes(), &signature)
            .is_ok())
    }
}

/// Verifier that accepts every credential.
///
/// For tests and deployments where the credential store itself is the
/// trust boundary.
#[derive(Default)]
pub struct AcceptAllVerifier;

impl AcceptAllVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for AcceptAllVerifier {
    async fn verify(&self, _credential: &Credential) -> IdentityResult<bool> {
        Ok(true)
    }
}
