//! Application configuration module
//!
//! Provides the configuration consumed by the API client, the session store
//! and the conferencing adapter. Values come from the builder, from `IC_*`
//! environment variables or from a TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default backend origin; `/api` is appended for every request.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default conferencing domain (JaaS).
pub const DEFAULT_CONFERENCE_DOMAIN: &str = "8x8.vc";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Backend origin, without the `/api` suffix
    pub api_base_url: String,
    /// Per-request timeout; `None` disables it
    pub request_timeout: Option<Duration>,
    /// Domain the conferencing widget script is served from
    pub conference_domain: String,
    /// Tenant (JaaS app id) prefix for script path and room names
    pub conference_tenant: Option<String>,
    /// Location of the durable session record
    pub session_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            conference_domain: DEFAULT_CONFERENCE_DOMAIN.to_string(),
            conference_tenant: None,
            session_path: default_session_path(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Build a configuration from `IC_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Ok(url) = std::env::var("IC_API_BASE_URL") {
            builder = builder.api_base_url(url);
        }
        if let Ok(secs) = std::env::var("IC_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("IC_REQUEST_TIMEOUT_SECS", secs.clone()))?;
            builder = builder.request_timeout(timeout_from_secs(secs));
        }
        if let Ok(domain) = std::env::var("IC_CONFERENCE_DOMAIN") {
            builder = builder.conference_domain(domain);
        }
        if let Ok(tenant) = std::env::var("IC_CONFERENCE_TENANT") {
            builder = builder.conference_tenant(tenant);
        }
        if let Ok(path) = std::env::var("IC_SESSION_PATH") {
            builder = builder.session_path(PathBuf::from(path));
        }

        builder.build()
    }

    /// Load a configuration from a TOML file. Missing keys take defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::File(e.to_string()))?;

        let mut builder = Self::builder();
        if let Some(url) = file.api_base_url {
            builder = builder.api_base_url(url);
        }
        if let Some(secs) = file.request_timeout_secs {
            builder = builder.request_timeout(timeout_from_secs(secs));
        }
        if let Some(domain) = file.conference_domain {
            builder = builder.conference_domain(domain);
        }
        if let Some(tenant) = file.conference_tenant {
            builder = builder.conference_tenant(tenant);
        }
        if let Some(path) = file.session_path {
            builder = builder.session_path(path);
        }
        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingValue("api_base_url"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_base_url.clone()));
        }
        if self.conference_domain.trim().is_empty() {
            return Err(ConfigError::MissingValue("conference_domain"));
        }
        Ok(())
    }

    /// Root of the REST surface, e.g. `http://localhost:8000/api`
    pub fn api_root(&self) -> String {
        format!("{}/api", self.api_base_url.trim_end_matches('/'))
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_base_url: Option<String>,
    request_timeout: Option<Option<Duration>>,
    conference_domain: Option<String>,
    conference_tenant: Option<String>,
    session_path: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Set the backend origin
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the per-request timeout (`None` disables it)
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn conference_domain(mut self, domain: impl Into<String>) -> Self {
        self.conference_domain = Some(domain.into());
        self
    }

    pub fn conference_tenant(mut self, tenant: impl Into<String>) -> Self {
        let tenant = tenant.into();
        self.conference_tenant = (!tenant.trim().is_empty()).then_some(tenant);
        self
    }

    pub fn session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            conference_domain: self.conference_domain.unwrap_or(defaults.conference_domain),
            conference_tenant: self.conference_tenant,
            session_path: self.session_path.unwrap_or(defaults.session_path),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("config file error: {0}")]
    File(String),
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    conference_domain: Option<String>,
    conference_tenant: Option<String>,
    session_path: Option<PathBuf>,
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn default_session_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("inquiry-circle");
    path.push("session.json");
    path
}
