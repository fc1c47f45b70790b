//! Application configuration structures.
//!
//! Two layers: [`Config`] holds optional, non-secret settings loaded from a
//! TOML file, and [`EnvConfig`] holds the endpoints and secrets read from the
//! process environment. Both are built once at startup and handed to the
//! components that need them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::crypto::KeyEncoding;
use crate::error::{AppError, Result};

/// Root settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Static notification fields
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Snapshot file location
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.notification.title.trim().is_empty() {
            return Err(AppError::config("notification.title is empty"));
        }
        if self.storage.snapshot_file.trim().is_empty() {
            return Err(AppError::config("storage.snapshot_file is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings shared by the catalog and Bark requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Fields copied verbatim into every notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Bark group label
    #[serde(default = "defaults::group")]
    pub group: String,

    /// Ask Bark to keep the message in its history
    #[serde(default = "defaults::archive")]
    pub archive: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: defaults::title(),
            group: defaults::group(),
            archive: defaults::archive(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File name of the snapshot inside the storage directory
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_file: defaults::snapshot_file(),
        }
    }
}

/// Endpoints and secrets taken from the environment.
#[derive(Clone)]
pub struct EnvConfig {
    pub device_key: String,
    pub bark_base_url: String,
    pub raycast_api_url: String,
    pub icon: String,
    pub encrypt_key: String,
    pub encrypt_iv: String,
    pub key_encoding: KeyEncoding,
}

impl EnvConfig {
    pub const DEVICE_KEY: &'static str = "DEVICE_KEY";
    pub const BARK_BASE_URL: &'static str = "BARK_BASE_URL";
    pub const RAYCAST_API_URL: &'static str = "RAYCAST_API_URL";
    pub const ICON: &'static str = "ICON";
    pub const BARK_ENCRYPT_KEY: &'static str = "BARK_ENCRYPT_KEY";
    pub const BARK_ENCRYPT_IV: &'static str = "BARK_ENCRYPT_IV";
    pub const BARK_KEY_ENCODING: &'static str = "BARK_KEY_ENCODING";

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(AppError::config(format!(
                    "missing required environment variable {key}"
                ))),
            }
        };

        let key_encoding = match lookup(Self::BARK_KEY_ENCODING) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => KeyEncoding::default(),
        };

        let config = Self {
            device_key: required(Self::DEVICE_KEY)?,
            bark_base_url: required(Self::BARK_BASE_URL)?,
            raycast_api_url: required(Self::RAYCAST_API_URL)?,
            icon: required(Self::ICON)?,
            encrypt_key: required(Self::BARK_ENCRYPT_KEY)?,
            encrypt_iv: required(Self::BARK_ENCRYPT_IV)?,
            key_encoding,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the URLs parse before any request is made.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.raycast_api_url).map_err(|e| {
            AppError::config(format!("{} is not a valid URL: {e}", Self::RAYCAST_API_URL))
        })?;
        Url::parse(&self.bark_endpoint()).map_err(|e| {
            AppError::config(format!(
                "{}{} is not a valid URL: {e}",
                Self::BARK_BASE_URL,
                Self::DEVICE_KEY
            ))
        })?;
        Ok(())
    }

    /// Full Bark push endpoint: base URL with the device key appended.
    pub fn bark_endpoint(&self) -> String {
        format!("{}{}", self.bark_base_url, self.device_key)
    }
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("device_key", &"<redacted>")
            .field("bark_base_url", &self.bark_base_url)
            .field("raycast_api_url", &self.raycast_api_url)
            .field("icon", &self.icon)
            .field("encrypt_key", &"<redacted>")
            .field("encrypt_iv", &"<redacted>")
            .field("key_encoding", &self.key_encoding)
            .finish()
    }
}

mod defaults {
    pub fn user_agent() -> String {
        concat!("raycast-stats/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        10
    }

    pub fn title() -> String {
        "Raycast Extension Stats".into()
    }
    pub fn group() -> String {
        "Raycast统计".into()
    }
    pub fn archive() -> bool {
        true
    }

    pub fn snapshot_file() -> String {
        crate::storage::local::DEFAULT_SNAPSHOT_FILE.into()
    }
}
