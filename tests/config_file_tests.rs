//! # Configuration Loading Tests
//!
//! File + environment layering as the CLI performs it.

use ecoverse_probe::config::{ProbeConfig, RunOverrides};
use ecoverse_probe::types::ActivityEncoding;
use ecoverse_probe::{ProbeError, ProbeSettings, StepId};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("ecoverse-probe.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_file_then_env_precedence() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[endpoint]
base_url = "http://from-file:3001/api"
auth_token = "file-token"

[fixtures]
expected_email = "file@example.com"

[activity]
kind = "WALKING"
co2_saved = 0.4
encoding = "multipart"

[probe]
extended = true
"#,
    );

    std::env::set_var("ECOVERSE_PROBE_BASE_URL", "http://from-env:3001/api");
    let loaded = ProbeConfig::load_with_file(&path);
    std::env::remove_var("ECOVERSE_PROBE_BASE_URL");
    let config = loaded.unwrap();

    assert_eq!(config.endpoint.base_url, "http://from-env:3001/api");
    assert_eq!(config.endpoint.auth_token, "file-token");
    assert_eq!(config.fixtures.expected_email, "file@example.com");
    assert_eq!(config.activity.encoding, ActivityEncoding::Multipart);
    assert_eq!(config.activity.title, "Morning Commute");

    let settings = ProbeSettings::from_config(&config);
    assert_eq!(settings.inputs.activity.kind, "WALKING");
    assert_eq!(settings.inputs.expected_email, "file@example.com");
    assert!(settings
        .selection
        .plan()
        .iter()
        .any(|(step, _)| *step == StepId::ApiDocument));
}

#[test]
#[serial]
fn test_invalid_file_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[readiness]
max_attempts = 0
"#,
    );

    let config = ProbeConfig::load_with_file(&path).unwrap();
    assert!(matches!(config.validate(), Err(ProbeError::Config(_))));
}

#[test]
#[serial]
fn test_token_flag_repairs_empty_file_token() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[endpoint]
base_url = "http://from-file:3001/api"
auth_token = ""
"#,
    );

    let mut config = ProbeConfig::load_with_file(&path).unwrap();
    assert!(config.validate().is_err());

    config.apply_run_overrides(RunOverrides {
        auth_token: Some("good".to_string()),
        ..Default::default()
    });

    config.validate().unwrap();
    assert_eq!(config.endpoint.auth_token, "good");
    assert_eq!(config.endpoint.base_url, "http://from-file:3001/api");
}

#[test]
#[serial]
fn test_flags_override_environment() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    std::env::set_var("ECOVERSE_PROBE_BASE_URL", "not a url");
    let loaded = ProbeConfig::load_with_file(&path);
    std::env::remove_var("ECOVERSE_PROBE_BASE_URL");
    let mut config = loaded.unwrap();

    config.apply_run_overrides(RunOverrides {
        base_url: Some("http://from-flag:3001/api".to_string()),
        ..Default::default()
    });

    config.validate().unwrap();
    assert_eq!(config.endpoint.base_url, "http://from-flag:3001/api");
}

#[test]
#[serial]
fn test_default_file_replaces_broken_one() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[endpoint\nauth_token = ");
    assert!(ProbeConfig::load_with_file(&path).is_err());

    ProbeConfig::default().save_to_file(&path).unwrap();

    let config = ProbeConfig::load_with_file(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.endpoint.auth_token, "mock-token");
}

#[test]
#[serial]
fn test_unknown_encoding_in_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[activity]
encoding = "xml"
"#,
    );

    assert!(ProbeConfig::load_with_file(&path).is_err());
}

#[test]
#[serial]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = ProbeConfig::load_with_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
