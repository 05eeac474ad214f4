//! Lucid Attest - runtime manifest collection and attestation signing
//!
//! The manifest side answers "where is this agent running" with a stable,
//! sentineled fact set per runtime type. The signer side binds those facts
//! to the agent identity in a signed `RuntimeAttestation`.

pub mod manifest;
pub mod signer;

pub use manifest::{collect_manifest, detect_runtime, UNKNOWN};
pub use signer::{
    attestation_signing_bytes, AttestationSigner, Ed25519Signer, SignerError, SignerResult,
};
