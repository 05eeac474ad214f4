//! Wake protocol - the state machine turning a dormant agent process
//! into a verified, session-holding one
//!
//! Three phases in strict order: identity verification, attestation,
//! session establishment. Each phase either completes fully or fails the
//! whole wake-up; no partial session is ever installed.

use crate::config::WakeConfig;
use chrono::Duration;
use lucid_attest::manifest;
use lucid_attest::{AttestationSigner, Ed25519Signer, SignerError};
use lucid_core::{AgentDid, Result, RuntimeType, Session, SessionId, WakeError};
use lucid_identity::{
    CredentialStore, CredentialVerifier, Ed25519Verifier, IdentityRegistry, MaxAgeRotationPolicy,
    MemoryRegistry, RotationPolicy,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Wake-up lifecycle states.
///
/// `Dormant` is the only initial state; `Conscious` and `Failed` are the
/// only states a `wake_up()` call can end in. `Failed` is reachable from
/// any of the three working states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeState {
    Dormant,
    Verifying,
    Attesting,
    Establishing,
    Conscious,
    Failed,
}

/// The wake-up orchestrator for one agent process.
///
/// Owns exactly one agent identity and at most one active session.
/// `wake_up()` and `sleep()` take `&mut self`, so concurrent calls on the
/// same instance cannot exist - single ownership is the serialization
/// mechanism. There is no internal timeout or retry: callers needing
/// bounded latency wrap `wake_up()` in their own deadline, and a failed
/// wake-up is always safe to retry with another call.
pub struct WakeProtocol {
    agent_did: AgentDid,
    runtime_type: RuntimeType,
    state: WakeState,
    verification_errors: Vec<String>,
    active_session: Option<Session>,
    registry: Arc<dyn IdentityRegistry>,
    credentials: Arc<dyn CredentialStore>,
    verifier: Arc<dyn CredentialVerifier>,
    rotation: Option<Arc<dyn RotationPolicy>>,
    signer: Arc<dyn AttestationSigner>,
}

impl WakeProtocol {
    /// All-defaults construction: in-memory registry/store, strict
    /// Ed25519 verifier with an empty trust store, no rotation policy,
    /// freshly generated Ed25519 signer.
    pub fn new(agent_did: impl Into<AgentDid>) -> std::result::Result<Self, SignerError> {
        Self::builder(agent_did).build()
    }

    pub fn builder(agent_did: impl Into<AgentDid>) -> WakeProtocolBuilder {
        WakeProtocolBuilder {
            agent_did: agent_did.into(),
            runtime_type: None,
            config: None,
            registry: None,
            credentials: None,
            verifier: None,
            rotation: None,
            signer: None,
        }
    }

    pub fn agent_did(&self) -> &AgentDid {
        &self.agent_did
    }

    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }

    pub fn state(&self) -> WakeState {
        self.state
    }

    /// The diagnostic trail of the current or most recent `wake_up()`.
    ///
    /// After a successful wake-up this holds only advisory entries (key
    /// rotation warnings); callers inspect it to detect rotation lag.
    pub fn verification_errors(&self) -> &[String] {
        &self.verification_errors
    }

    pub fn is_conscious(&self) -> bool {
        self.state == WakeState::Conscious
    }

    /// The active session, `None` unless conscious.
    pub fn get_session(&self) -> Option<&Session> {
        match self.state {
            WakeState::Conscious => self.active_session.as_ref(),
            _ => None,
        }
    }

    /// Run the full wake-up sequence.
    ///
    /// Callable from any state. From `Conscious` it performs a fresh
    /// re-wake: a new session with a new id supersedes the old one. On
    /// failure the state is `Failed`, the previous session value is left
    /// as it was, and the returned error carries the accumulated
    /// diagnostic trail.
    pub async fn wake_up(&mut self) -> Result<Session> {
        self.verification_errors.clear();
        self.state = WakeState::Verifying;
        info!("{}: waking up ({})", self.agent_did, self.runtime_type);

        let credentials = self.verify_identity().await?;

        self.state = WakeState::Attesting;
        let attestation = self.generate_attestation().await?;

        self.state = WakeState::Establishing;
        let capabilities: BTreeSet<String> = credentials
            .iter()
            .flat_map(|c| c.capabilities.iter().cloned())
            .collect();
        let session = Session {
            id: SessionId::new(),
            agent_did: self.agent_did.clone(),
            runtime_type: self.runtime_type,
            attestation,
            capabilities,
            conscious: true,
        };

        self.active_session = Some(session.clone());
        self.state = WakeState::Conscious;
        info!(
            "{}: conscious (session {}, {} capabilities)",
            self.agent_did,
            session.id,
            session.capabilities.len()
        );
        Ok(session)
    }

    /// Graceful shutdown signal. Clears the session from `Conscious`;
    /// idempotent no-op from every other state.
    pub fn sleep(&mut self) {
        if self.state == WakeState::Conscious {
            info!("{}: sleeping", self.agent_did);
            self.active_session = None;
            self.state = WakeState::Dormant;
        }
    }

    /// Phase 1: resolve the identity, check every credential, record any
    /// rotation warning. Returns the verified credential set.
    async fn verify_identity(&mut self) -> Result<Vec<lucid_core::Credential>> {
        let document = match self.registry.resolve(&self.agent_did).await {
            Ok(document) => document,
            Err(e) => {
                self.verification_errors
                    .push(format!("identity resolution failed: {e}"));
                return Err(self.fail_identity());
            }
        };
        debug!("{}: identity document resolved", self.agent_did);

        let credentials = match self.credentials.list_credentials(&document).await {
            Ok(credentials) => credentials,
            Err(e) => {
                self.verification_errors
                    .push(format!("credential listing failed: {e}"));
                return Err(self.fail_identity());
            }
        };
        if credentials.is_empty() {
            // Zero credentials means zero derivable capabilities.
            self.verification_errors
                .push(format!("no credentials for {}", self.agent_did));
            return Err(self.fail_identity());
        }

        // Every credential is checked so the error carries the full
        // diagnostic trail, but a single invalid one fails the wake-up:
        // partial credential sets produce ambiguous capability grants.
        let mut invalid = false;
        for credential in &credentials {
            match self.verifier.verify(credential).await {
                Ok(true) => {}
                Ok(false) => {
                    self.verification_errors
                        .push(format!("credential {} failed verification", credential.id));
                    invalid = true;
                }
                Err(e) => {
                    self.verification_errors.push(format!(
                        "credential {} could not be verified: {e}",
                        credential.id
                    ));
                    invalid = true;
                }
            }
        }
        if invalid {
            return Err(self.fail_identity());
        }
        debug!(
            "{}: {} credentials verified",
            self.agent_did,
            credentials.len()
        );

        // Rotation lag is a compliance signal, not an operational
        // blocker: record it and keep going. A failing rotation
        // collaborator degrades the same way.
        if let Some(rotation) = &self.rotation {
            match rotation.needs_rotation(&self.agent_did).await {
                Ok(true) => {
                    warn!("{}: key rotation due", self.agent_did);
                    self.verification_errors
                        .push(format!("key rotation due for {}", self.agent_did));
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("{}: rotation check failed: {}", self.agent_did, e);
                    self.verification_errors
                        .push(format!("rotation check failed: {e}"));
                }
            }
        }

        Ok(credentials)
    }

    /// Phase 2: collect the runtime manifest and have it signed.
    async fn generate_attestation(&mut self) -> Result<lucid_core::RuntimeAttestation> {
        let manifest = manifest::collect_manifest(self.runtime_type);
        let mut state = BTreeMap::new();
        state.insert("wake_up".to_string(), serde_json::Value::Bool(true));

        match self
            .signer
            .sign(&self.agent_did, self.runtime_type, manifest, state)
            .await
        {
            Ok(attestation) => Ok(attestation),
            Err(e) => {
                self.verification_errors
                    .push(format!("attestation signing failed: {e}"));
                Err(self.fail_establishment())
            }
        }
    }

    fn fail_identity(&mut self) -> WakeError {
        self.state = WakeState::Failed;
        warn!(
            "{}: wake-up failed during identity verification: {}",
            self.agent_did,
            self.verification_errors.join("; ")
        );
        WakeError::identity(self.agent_did.as_str(), self.verification_errors.clone())
    }

    fn fail_establishment(&mut self) -> WakeError {
        self.state = WakeState::Failed;
        warn!(
            "{}: wake-up failed during session establishment: {}",
            self.agent_did,
            self.verification_errors.join("; ")
        );
        WakeError::establishment(self.agent_did.as_str(), self.verification_errors.clone())
    }
}

/// Builder for `WakeProtocol` - every collaborator is injectable, unset
/// ones get the default concrete implementation.
pub struct WakeProtocolBuilder {
    agent_did: AgentDid,
    runtime_type: Option<RuntimeType>,
    config: Option<WakeConfig>,
    registry: Option<Arc<dyn IdentityRegistry>>,
    credentials: Option<Arc<dyn CredentialStore>>,
    verifier: Option<Arc<dyn CredentialVerifier>>,
    rotation: Option<Arc<dyn RotationPolicy>>,
    signer: Option<Arc<dyn AttestationSigner>>,
}

impl WakeProtocolBuilder {
    /// Pin the runtime type, skipping environment detection. Takes
    /// precedence over the config override.
    pub fn with_runtime_type(mut self, runtime_type: RuntimeType) -> Self {
        self.runtime_type = Some(runtime_type);
        self
    }

    pub fn with_config(mut self, config: WakeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn IdentityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Optional collaborator: without one the rotation check is skipped
    /// entirely, never treated as a failure.
    pub fn with_rotation_policy(mut self, policy: Arc<dyn RotationPolicy>) -> Self {
        self.rotation = Some(policy);
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn AttestationSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the protocol in the `Dormant` state. Fails only when the
    /// default signer's key generation does.
    pub fn build(self) -> std::result::Result<WakeProtocol, SignerError> {
        let config = self.config.unwrap_or_default();

        let runtime_type = self
            .runtime_type
            .or(config.runtime.runtime_type)
            .unwrap_or_else(manifest::detect_runtime);

        // Registry and store default to one shared in-memory instance so
        // registered documents and credentials stay in step.
        let (registry, credentials) = match (self.registry, self.credentials) {
            (Some(registry), Some(credentials)) => (registry, credentials),
            (registry, credentials) => {
                let memory = Arc::new(MemoryRegistry::new());
                let registry =
                    registry.unwrap_or_else(|| memory.clone() as Arc<dyn IdentityRegistry>);
                let credentials =
                    credentials.unwrap_or_else(|| memory as Arc<dyn CredentialStore>);
                (registry, credentials)
            }
        };

        let verifier = self
            .verifier
            .unwrap_or_else(|| Arc::new(Ed25519Verifier::new()));

        let rotation = self.rotation.or_else(|| {
            config.rotation.enabled.then(|| {
                Arc::new(MaxAgeRotationPolicy::new(Duration::days(
                    config.rotation.max_key_age_days,
                ))) as Arc<dyn RotationPolicy>
            })
        });

        let signer = match self.signer {
            Some(signer) => signer,
            None => Arc::new(Ed25519Signer::generate()?),
        };

        Ok(WakeProtocol {
            agent_did: self.agent_did,
            runtime_type,
            state: WakeState::Dormant,
            verification_errors: Vec::new(),
            active_session: None,
            registry,
            credentials,
            verifier,
            rotation,
            signer,
        })
    }
}
