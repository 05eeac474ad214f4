//! Wake protocol configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists.

use lucid_core::RuntimeType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level wake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeConfig {
    /// Runtime detection overrides.
    pub runtime: RuntimeConfig,
    /// Key rotation policy parameters.
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Explicit runtime type. Unset means detect from the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_type: Option<RuntimeType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Wire up the default max-age rotation policy. Off by default - the
    /// rotation check is skipped entirely when no policy is present.
    pub enabled: bool,
    /// Key age, in days, past which rotation is flagged.
    pub max_key_age_days: i64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_key_age_days: 90,
        }
    }
}

impl WakeConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} — using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
