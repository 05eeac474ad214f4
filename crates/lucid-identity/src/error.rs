//! Identity collaborator error types

use thiserror::Error;

/// Result type for identity-side collaborators
pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The registry has no document for the DID. Always fatal to a
    /// wake-up - absence of identity is never a warning.
    #[error("identity not found: {0}")]
    NotFound(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("credential store error: {0}")]
    Store(String),

    #[error("verifier error: {0}")]
    Verifier(String),

    #[error("rotation policy error: {0}")]
    Rotation(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
