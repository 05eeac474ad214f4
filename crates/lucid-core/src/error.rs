//! Error types for the wake protocol

use thiserror::Error;

/// Fatal wake-up failures.
///
/// Both kinds carry the full diagnostic trail accumulated across phases,
/// so a caller can surface every recorded problem rather than the first
/// one. Rotation-due is never an error — it stays in the protocol's
/// `verification_errors` as a warning while the wake-up proceeds.
#[derive(Error, Debug)]
pub enum WakeError {
    /// Identity resolution failed, the credential set was empty, or a
    /// credential failed verification. Remediation is identity-side:
    /// re-issue credentials or re-register the DID.
    #[error("identity verification failed for {did}: {}", .detail.join("; "))]
    IdentityVerification { did: String, detail: Vec<String> },

    /// Anything downstream of a verified identity: manifest collection,
    /// attestation signing, or session construction. Remediation is
    /// infrastructure-side.
    #[error("session establishment failed for {did}: {}", .detail.join("; "))]
    SessionEstablishment { did: String, detail: Vec<String> },
}

pub type Result<T> = std::result::Result<T, WakeError>;

impl WakeError {
    pub fn identity(did: impl Into<String>, detail: Vec<String>) -> Self {
        Self::IdentityVerification {
            did: did.into(),
            detail,
        }
    }

    pub fn establishment(did: impl Into<String>, detail: Vec<String>) -> Self {
        Self::SessionEstablishment {
            did: did.into(),
            detail,
        }
    }

    /// The DID of the agent whose wake-up failed.
    pub fn did(&self) -> &str {
        match self {
            Self::IdentityVerification { did, .. } => did,
            Self::SessionEstablishment { did, .. } => did,
        }
    }

    /// The accumulated diagnostic trail, in the order it was recorded.
    pub fn detail(&self) -> &[String] {
        match self {
            Self::IdentityVerification { detail, .. } => detail,
            Self::SessionEstablishment { detail, .. } => detail,
        }
    }
}
