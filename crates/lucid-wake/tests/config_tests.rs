//! Tests for WakeConfig loading and defaults

use lucid_core::RuntimeType;
use lucid_wake::WakeConfig;
use std::fs;
use tempfile::TempDir;

#[test]
fn defaults_are_sensible() {
    let config = WakeConfig::default();
    assert!(config.runtime.runtime_type.is_none());
    assert!(!config.rotation.enabled);
    assert_eq!(config.rotation.max_key_age_days, 90);
}

#[test]
fn toml_roundtrip() {
    let mut config = WakeConfig::default();
    config.runtime.runtime_type = Some(RuntimeType::Serverless);
    config.rotation.enabled = true;
    config.rotation.max_key_age_days = 30;

    let toml = config.to_toml();
    let back: WakeConfig = toml::from_str(&toml).unwrap();
    assert_eq!(back.runtime.runtime_type, Some(RuntimeType::Serverless));
    assert!(back.rotation.enabled);
    assert_eq!(back.rotation.max_key_age_days, 30);
}

#[test]
fn load_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = WakeConfig::load(&dir.path().join("nope.toml"));
    assert!(!config.rotation.enabled);
    assert_eq!(config.rotation.max_key_age_days, 90);
}

#[test]
fn load_reads_partial_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wake.toml");
    fs::write(&path, "[rotation]\nenabled = true\n").unwrap();

    let config = WakeConfig::load(&path);
    assert!(config.rotation.enabled);
    // Unspecified fields keep their defaults
    assert_eq!(config.rotation.max_key_age_days, 90);
    assert!(config.runtime.runtime_type.is_none());
}

#[test]
fn load_invalid_toml_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wake.toml");
    fs::write(&path, "rotation = [not toml").unwrap();

    let config = WakeConfig::load(&path);
    assert!(!config.rotation.enabled);
}

#[test]
fn runtime_type_parses_lowercase() {
    let config: WakeConfig =
        toml::from_str("[runtime]\nruntime_type = \"edge\"\n").unwrap();
    assert_eq!(config.runtime.runtime_type, Some(RuntimeType::Edge));
}
