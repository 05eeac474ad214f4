//! Lucid Core - shared types and error taxonomy for the wake protocol

pub mod error;
pub mod types;

pub use error::{Result, WakeError};
pub use types::*;
