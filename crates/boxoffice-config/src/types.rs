//! Configuration types.
//!
//! ```toml
//! data_dir = "/var/lib/boxoffice"
//!
//! [endpoints]
//! identity = "https://users.example.com"
//! catalog = "https://events.example.com"
//! ticketing = "https://tickets.example.com"
//!
//! [client]
//! timeout_secs = 15
//! ```
//!
//! Every field is optional so files can be layered; accessors fill defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::{ConfigError, Result};

pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:5001";
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:5002";
pub const DEFAULT_TICKETING_URL: &str = "http://localhost:5003";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variables overriding the service addresses.
pub const IDENTITY_URL_ENV: &str = "BOXOFFICE_IDENTITY_API";
pub const CATALOG_URL_ENV: &str = "BOXOFFICE_CATALOG_API";
pub const TICKETING_URL_ENV: &str = "BOXOFFICE_TICKETING_API";

/// Application name for platform directory resolution.
pub(crate) const APP_NAME: &str = "boxoffice";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoxofficeConfig {
    /// Where persisted storage and logs live.
    pub data_dir: Option<PathBuf>,

    /// Backend base addresses.
    pub endpoints: EndpointsConfig,

    /// HTTP client settings.
    pub client: ClientSettings,
}

/// Base addresses of the identity, catalog and ticketing services.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub identity: Option<String>,
    pub catalog: Option<String>,
    pub ticketing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Per-request timeout.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl BoxofficeConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: BoxofficeConfig) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }

        let endpoints = other.endpoints;
        if endpoints.identity.is_some() {
            self.endpoints.identity = endpoints.identity;
        }
        if endpoints.catalog.is_some() {
            self.endpoints.catalog = endpoints.catalog;
        }
        if endpoints.ticketing.is_some() {
            self.endpoints.ticketing = endpoints.ticketing;
        }

        if other.client.timeout_secs.is_some() {
            self.client.timeout_secs = other.client.timeout_secs;
        }
        if other.client.user_agent.is_some() {
            self.client.user_agent = other.client.user_agent;
        }
    }

    /// Apply service address overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply service address overrides using `lookup` for variable values.
    /// Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(IDENTITY_URL_ENV) {
            self.endpoints.identity = Some(url);
        }
        if let Some(url) = get(CATALOG_URL_ENV) {
            self.endpoints.catalog = Some(url);
        }
        if let Some(url) = get(TICKETING_URL_ENV) {
            self.endpoints.ticketing = Some(url);
        }
    }

    /// Reject values that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.client.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "client.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let urls = [
            ("endpoints.identity", &self.endpoints.identity),
            ("endpoints.catalog", &self.endpoints.catalog),
            ("endpoints.ticketing", &self.endpoints.ticketing),
        ];
        for (field, url) in urls {
            if let Some(url) = url
                && !(url.starts_with("http://") || url.starts_with("https://"))
            {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("'{}' is not an http(s) URL", url),
                });
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Effective values
    // ─────────────────────────────────────────────────────────────────────────

    pub fn identity_url(&self) -> &str {
        self.endpoints
            .identity
            .as_deref()
            .unwrap_or(DEFAULT_IDENTITY_URL)
    }

    pub fn catalog_url(&self) -> &str {
        self.endpoints
            .catalog
            .as_deref()
            .unwrap_or(DEFAULT_CATALOG_URL)
    }

    pub fn ticketing_url(&self) -> &str {
        self.endpoints
            .ticketing
            .as_deref()
            .unwrap_or(DEFAULT_TICKETING_URL)
    }

    /// Effective request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Effective data directory: configured, else the platform data dir,
    /// else `./.boxoffice`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_NAME)))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_NAME)))
    }
}
