//! Core types for the wake protocol

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Decentralized identifier for an agent - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct AgentDid(Arc<str>);

impl AgentDid {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentDid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentDid {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AgentDid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for AgentDid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AgentDid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::new(String::deserialize(deserializer)?))
    }
}

/// Unique identifier for one established session.
///
/// Generated fresh inside session establishment; consecutive wake-ups of
/// the same agent always produce distinct ids, so a stale session can
/// never be mistaken for the current one.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Execution environment the agent wakes up in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    #[default]
    Kubernetes,
    Serverless,
    Edge,
}

impl RuntimeType {
    pub fn as_str(&self) -> &str {
        match self {
            RuntimeType::Kubernetes => "kubernetes",
            RuntimeType::Serverless => "serverless",
            RuntimeType::Edge => "edge",
        }
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved identity document.
///
/// Opaque to the orchestrator - it is handed to the credential store and
/// the verifier, which are the only consumers of its contents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub did: AgentDid,
    /// Base64-encoded Ed25519 public key, when the registry carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default)]
    pub service_endpoints: Vec<String>,
}

impl IdentityDocument {
    pub fn new(did: impl Into<AgentDid>) -> Self {
        Self {
            did: did.into(),
            public_key: None,
            service_endpoints: Vec::new(),
        }
    }

    pub fn with_public_key(mut self, key_b64: impl Into<String>) -> Self {
        self.public_key = Some(key_b64.into());
        self
    }
}

/// A verifiable credential asserting capabilities for an agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub subject: AgentDid,
    pub capabilities: BTreeSet<String>,
    /// Base64-encoded signature over `signing_bytes()`. Consumed only by
    /// verifier implementations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new<I, S>(id: impl Into<String>, subject: impl Into<AgentDid>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            subject: subject.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            signature: None,
            issued_at: None,
        }
    }

    pub fn with_signature(mut self, signature_b64: impl Into<String>) -> Self {
        self.signature = Some(signature_b64.into());
        self
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    /// Canonical byte representation signed by issuers and checked by
    /// verifiers. The signature field itself is excluded; `BTreeSet`
    /// keeps the capability order stable.
    pub fn signing_bytes(&self) -> Vec<u8> {
        #[derive(Serialize)]
        struct SigningView<'a> {
            id: &'a str,
            subject: &'a AgentDid,
            capabilities: &'a BTreeSet<String>,
            issued_at: &'a Option<DateTime<Utc>>,
        }
        let view = SigningView {
            id: &self.id,
            subject: &self.subject,
            capabilities: &self.capabilities,
            issued_at: &self.issued_at,
        };
        // BTreeSet/struct field order make this deterministic.
        serde_json::to_vec(&view).unwrap_or_default()
    }
}

/// A signed statement binding an agent identity to a runtime snapshot.
///
/// Produced once per successful wake-up and owned exclusively by the
/// session it is embedded in - never persisted or reused across sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuntimeAttestation {
    pub runtime_type: RuntimeType,
    pub manifest: BTreeMap<String, String>,
    pub state: BTreeMap<String, serde_json::Value>,
    pub signature: String,
    pub issued_at: DateTime<Utc>,
}

/// The product of a successful wake-up.
///
/// Immutable once built - a re-wake produces a brand-new value rather
/// than mutating the old one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub agent_did: AgentDid,
    pub runtime_type: RuntimeType,
    pub attestation: RuntimeAttestation,
    pub capabilities: BTreeSet<String>,
    pub conscious: bool,
}
