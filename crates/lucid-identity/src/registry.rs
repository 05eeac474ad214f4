//! Identity registry - DID resolution seam with in-memory and did:web backends

use crate::credentials::CredentialStore;
use crate::error::{IdentityError, IdentityResult};
use dashmap::DashMap;
use lucid_core::{AgentDid, Credential, IdentityDocument};
use reqwest::Client;
use reqwest::StatusCode;
use tracing::debug;

/// Resolves an agent DID to its identity document.
#[async_trait::async_trait]
pub trait IdentityRegistry: Send + Sync {
    /// Resolve a DID. `IdentityError::NotFound` for absent identities;
    /// any other error means the registry itself misbehaved.
    async fn resolve(&self, did: &AgentDid) -> IdentityResult<IdentityDocument>;
}

/// In-memory registry and credential store.
///
/// The default backend for embedded deployments and tests: documents and
/// credentials are registered directly on the instance.
#[derive(Default)]
pub struct MemoryRegistry {
    documents: DashMap<String, IdentityDocument>,
    credentials: DashMap<String, Vec<Credential>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, document: IdentityDocument) {
        self.documents
            .insert(document.did.as_str().to_string(), document);
    }

    pub fn add_credential(&self, credential: Credential) {
        self.credentials
            .entry(credential.subject.as_str().to_string())
            .or_default()
            .push(credential);
    }

    pub fn remove(&self, did: &AgentDid) {
        self.documents.remove(did.as_str());
        self.credentials.remove(did.as_str());
    }
}

#[async_trait::async_trait]
impl IdentityRegistry for MemoryRegistry {
    async fn resolve(&self, did: &AgentDid) -> IdentityResult<IdentityDocument> {
        self.documents
            .get(did.as_str())
            .map(|d| d.clone())
            .ok_or_else(|| IdentityError::NotFound(did.as_str().to_string()))
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryRegistry {
    async fn list_credentials(&self, document: &IdentityDocument) -> IdentityResult<Vec<Credential>> {
        Ok(self
            .credentials
            .get(document.did.as_str())
            .map(|c| c.clone())
            .unwrap_or_default())
    }
}

/// `did:web` registry - resolves documents over HTTPS.
///
/// `did:web:example.com` maps to
/// `https://example.com/.well-known/did.json`; additional segments map to
/// path components (`did:web:example.com:agents:alpha` →
/// `https://example.com/agents/alpha/did.json`).
pub struct HttpRegistry {
    client: Client,
    base_url: Option<String>,
}

impl Default for HttpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRegistry {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
        }
    }

    /// Override the scheme+host derived from the DID. Used against local
    /// test servers.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    fn document_url(&self, did: &AgentDid) -> IdentityResult<String> {
        let mut parts = did.as_str().split(':');
        let (scheme, method) = (parts.next(), parts.next());
        if scheme != Some("did") || method != Some("web") {
            return Err(IdentityError::Registry(format!(
                "unsupported did method: {did}"
            )));
        }
        let host = parts
            .next()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| IdentityError::Registry(format!("malformed did: {did}")))?;
        let path: Vec<&str> = parts.collect();

        let origin = match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{host}"),
        };
        if path.is_empty() {
            Ok(format!("{origin}/.well-known/did.json"))
        } else {
            Ok(format!("{origin}/{}/did.json", path.join("/")))
        }
    }
}

#[async_trait::async_trait]
impl IdentityRegistry for HttpRegistry {
    async fn resolve(&self, did: &AgentDid) -> IdentityResult<IdentityDocument> {
        let url = self.document_url(did)?;
        debug!("resolving {} via {}", did, url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound(did.as_str().to_string())),
            status if status.is_success() => Ok(response.json::<IdentityDocument>().await?),
            status => Err(IdentityError::Registry(format!(
                "registry returned {status} for {did}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_web_root_maps_to_well_known() {
        let registry = HttpRegistry::new();
        let url = registry
            .document_url(&AgentDid::new("did:web:example.com"))
            .unwrap();
        assert_eq!(url, "https://example.com/.well-known/did.json");
    }

    #[test]
    fn did_web_path_segments_map_to_path() {
        let registry = HttpRegistry::new();
        let url = registry
            .document_url(&AgentDid::new("did:web:example.com:agents:alpha"))
            .unwrap();
        assert_eq!(url, "https://example.com/agents/alpha/did.json");
    }

    #[test]
    fn non_web_method_is_rejected() {
        let registry = HttpRegistry::new();
        assert!(registry
            .document_url(&AgentDid::new("did:key:z6Mk"))
            .is_err());
        assert!(registry.document_url(&AgentDid::new("not-a-did")).is_err());
    }

    #[test]
    fn base_url_override_replaces_host() {
        let registry = HttpRegistry::new().with_base_url("http://127.0.0.1:9999/");
        let url = registry
            .document_url(&AgentDid::new("did:web:example.com"))
            .unwrap();
        assert_eq!(url, "http://127.0.0.1:9999/.well-known/did.json");
    }
}
