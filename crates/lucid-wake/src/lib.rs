//! Lucid Wake - the wake-up orchestrator
//!
//! Takes a dormant agent process through identity verification, runtime
//! attestation, and session establishment, and holds the resulting
//! session until `sleep()` or the next wake-up supersedes it.

pub mod config;
pub mod protocol;

pub use config::{RotationConfig, RuntimeConfig, WakeConfig};
pub use protocol::{WakeProtocol, WakeProtocolBuilder, WakeState};
