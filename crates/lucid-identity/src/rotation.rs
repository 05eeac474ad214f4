//! Key rotation policy seam

use crate::error::IdentityResult;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use lucid_core::AgentDid;

/// Reports whether an agent's key material is due for rotation.
///
/// An optional collaborator: a protocol built without one skips the
/// rotation check entirely. Rotation-due is advisory - the orchestrator
/// records a warning and wakes the agent anyway.
#[async_trait::async_trait]
pub trait RotationPolicy: Send + Sync {
    async fn needs_rotation(&self, did: &AgentDid) -> IdentityResult<bool>;
}

/// Flags rotation once the recorded key age exceeds a maximum.
///
/// A DID with no recorded rotation is treated as due - a key with no
/// rotation history is overdue by definition.
pub struct MaxAgeRotationPolicy {
    max_age: Duration,
    rotated_at: DashMap<String, DateTime<Utc>>,
}

impl MaxAgeRotationPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            rotated_at: DashMap::new(),
        }
    }

    /// Record that a DID's key was rotated at the given instant.
    pub fn record_rotation(&self, did: &AgentDid, when: DateTime<Utc>) {
        self.rotated_at.insert(did.as_str().to_string(), when);
    }
}

#[async_trait::async_trait]
impl RotationPolicy for MaxAgeRotationPolicy {
    async fn needs_rotation(&self, did: &AgentDid) -> IdentityResult<bool> {
        let due = match self.rotated_at.get(did.as_str()) {
            Some(rotated) => Utc::now() - *rotated > self.max_age,
            None => true,
        };
        Ok(due)
    }
}
