//! Configuration loading from the environment and from TOML files

use std::time::Duration;

use serial_test::serial;

use inquiry_circle::shared::{AppConfig, ConfigError};

const VARS: [&str; 5] = [
    "IC_API_BASE_URL",
    "IC_REQUEST_TIMEOUT_SECS",
    "IC_CONFERENCE_DOMAIN",
    "IC_CONFERENCE_TENANT",
    "IC_SESSION_PATH",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("IC_API_BASE_URL", "https://circles.example.org");
    std::env::set_var("IC_REQUEST_TIMEOUT_SECS", "3");
    std::env::set_var("IC_CONFERENCE_DOMAIN", "meet.example.org");
    std::env::set_var("IC_CONFERENCE_TENANT", "vpaas-magic-cookie-1");
    std::env::set_var("IC_SESSION_PATH", "/tmp/ic-test/session.json");

    let config = crate::assert_ok!(AppConfig::from_env());
    clear_env();

    assert_eq!(config.api_root(), "https://circles.example.org/api");
    assert_eq!(config.request_timeout, Some(Duration::from_secs(3)));
    assert_eq!(config.conference_domain, "meet.example.org");
    assert_eq!(config.conference_tenant.as_deref(), Some("vpaas-magic-cookie-1"));
    assert_eq!(
        config.session_path,
        std::path::PathBuf::from("/tmp/ic-test/session.json")
    );
}

#[test]
#[serial]
fn test_from_env_zero_timeout_disables() {
    clear_env();
    std::env::set_var("IC_REQUEST_TIMEOUT_SECS", "0");
    let config = crate::assert_ok!(AppConfig::from_env());
    clear_env();
    assert_eq!(config.request_timeout, None);
}

#[test]
#[serial]
fn test_from_env_rejects_bad_timeout() {
    clear_env();
    std::env::set_var("IC_REQUEST_TIMEOUT_SECS", "soon");
    let result = AppConfig::from_env();
    clear_env();
    crate::assert_err!(result, ConfigError::InvalidValue("IC_REQUEST_TIMEOUT_SECS", _));
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = crate::assert_ok!(AppConfig::from_env());
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("circle.toml");
    std::fs::write(
        &path,
        r#"
api_base_url = "http://10.0.0.5:8000"
request_timeout_secs = 20
conference_tenant = "tenant-a"
"#,
    )
    .unwrap();

    let config = crate::assert_ok!(AppConfig::from_toml_file(&path));
    assert_eq!(config.api_root(), "http://10.0.0.5:8000/api");
    assert_eq!(config.request_timeout, Some(Duration::from_secs(20)));
    assert_eq!(config.conference_domain, "8x8.vc");
    assert_eq!(config.conference_tenant.as_deref(), Some("tenant-a"));
}

#[test]
fn test_missing_toml_file_is_file_error() {
    let result = AppConfig::from_toml_file("/nonexistent/inquiry-circle.toml");
    crate::assert_err!(result, ConfigError::File(_));
}
