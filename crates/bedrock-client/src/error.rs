//! # Client Error Types
//!
//! Error types for configuration, storage and HTTP operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     HTTP Response       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Status (non-2xx)       │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Deserialization        │ │
//! │  │  ConfigLoad/Save│  │                 │  │  Serialization          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                               │
//! │  │    Storage      │  │      Auth       │                               │
//! │  │                 │  │                 │                               │
//! │  │  Storage        │  │  Missing-       │                               │
//! │  │                 │  │  Credentials    │                               │
//! │  └─────────────────┘  └─────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are retried. The store turns every one of them into a
//! notification.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Network failure: connection refused, DNS, TLS, reset.
    #[error("Network Error: {0}")]
    Transport(String),

    /// The fixed client timeout elapsed.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    // =========================================================================
    // HTTP Response Errors
    // =========================================================================
    /// Non-2xx response. `message` is the backend's `message`/`detail`
    /// text when it sent one, otherwise the canonical reason phrase.
    #[error("Request failed with status code {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    // =========================================================================
    // Auth Errors
    // =========================================================================
    /// An auth call needs a stored token and there is none.
    #[error("No {0} token stored")]
    MissingCredentials(&'static str),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Deserialization(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidUrl(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Deserialization(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// True for failures that never produced an HTTP response.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout(_))
    }

    /// True when the backend rejected the credentials (401/403).
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ClientError::Status { status: 401 | 403, .. })
    }

    /// HTTP status, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
