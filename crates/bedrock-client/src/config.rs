//! # Client Configuration
//!
//! Configuration management for the HTTP client and local storage.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BEDROCK_API_URL=https://bedrock.example.com/api                    │
//! │     BEDROCK_TIMEOUT_MS=10000                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bedrock-console/client.toml (Linux)                      │
//! │     ~/Library/Application Support/com.bedrock.console/client.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://127.0.0.1:9090/api, namespace "sor", 10s timeout            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [api]
//! base_url = "http://127.0.0.1:9090/api"
//! namespace = "sor"
//! timeout_ms = 10000
//!
//! [auth]
//! login_path = "auth/token/"
//! refresh_path = "auth/token/refresh/"
//! refresh_on_check = true
//!
//! [storage]
//! path = "/var/lib/bedrock/storage.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

const CONFIG_FILE: &str = "client.toml";
const STORAGE_FILE: &str = "storage.json";

// =============================================================================
// API Settings
// =============================================================================

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every request path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path segment prefixed to every inventory resource path.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Request timeout (milliseconds), applied to every request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:9090/api".to_string()
}

fn default_namespace() -> String {
    "sor".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            namespace: default_namespace(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

// =============================================================================
// Auth Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Endpoint that exchanges username/password for a token pair.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Endpoint that exchanges a refresh token for a new access token.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Refresh the access token whenever a stored one is found at startup.
    #[serde(default = "default_true")]
    pub refresh_on_check: bool,
}

fn default_login_path() -> String {
    "auth/token/".to_string()
}

fn default_refresh_path() -> String {
    "auth/token/refresh/".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            refresh_on_check: true,
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Storage file override. Defaults to the per-user data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default config pointed at another backend.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "Base URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if self.api.namespace.trim_matches('/').is_empty() {
            return Err(ClientError::InvalidConfig("namespace must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("BEDROCK_API_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.api.base_url = url;
        }

        if let Ok(namespace) = std::env::var("BEDROCK_API_NAMESPACE") {
            self.api.namespace = namespace;
        }

        if let Ok(timeout) = std::env::var("BEDROCK_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.api.timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric BEDROCK_TIMEOUT_MS"),
            }
        }

        if let Ok(path) = std::env::var("BEDROCK_STORAGE_PATH") {
            debug!(path = %path, "Overriding storage path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(flag) = std::env::var("BEDROCK_REFRESH_ON_CHECK") {
            self.auth.refresh_on_check = flag != "false" && flag != "0";
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    /// Resolved storage file path.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage
            .path
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(STORAGE_FILE)))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "bedrock", "console")
}
