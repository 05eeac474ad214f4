//! Lucid Identity - collaborator interfaces for the identity side of the
//! wake protocol, with default implementations.
//!
//! The orchestrator consumes four seams from this crate: identity
//! resolution, credential listing, credential verification, and rotation
//! policy. Each is a trait so hosts can plug in their own registry or
//! verifier; the defaults here cover embedded deployments
//! (`MemoryRegistry`), `did:web` resolution (`HttpRegistry`), and Ed25519
//! credential verification (`Ed25519Verifier`).

pub mod credentials;
pub mod error;
pub mod registry;
pub mod rotation;

pub use credentials::{AcceptAllVerifier, CredentialStore, CredentialVerifier, Ed25519Verifier};
pub use error::{IdentityError, IdentityResult};
pub use registry::{HttpRegistry, IdentityRegistry, MemoryRegistry};
pub use rotation::{MaxAgeRotationPolicy, RotationPolicy};
