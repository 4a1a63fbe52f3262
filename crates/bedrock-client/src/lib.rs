//! # bedrock-client: HTTP and Durable Storage for the Bedrock Console
//!
//! Everything in the console that performs I/O: the REST client, the API
//! facades on top of it, and the small key/value store that keeps tokens and
//! the theme flag across restarts.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ResourceApi::list(Server)                                             │
//! │        │  "sor/servers" + ""                                            │
//! │        ▼                                                                │
//! │   HttpClient::get ──► AuthInterceptor (if authorized) ──► reqwest       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   2xx  → JSON body decoded                                              │
//! │   4xx/5xx → ClientError::Status { status, message }                     │
//! │   timeout → ClientError::Timeout(ms)                                    │
//! │   network → ClientError::Transport                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - `client.toml` + environment configuration
//! - [`storage`] - Durable string key/value storage
//! - [`token`] - Access/refresh token persistence
//! - [`theme`] - Dark theme preference
//! - [`http`] - JSON HTTP verbs and the bearer interceptor
//! - [`api`] - Resource and auth facades
//! - [`error`] - Client error types

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod storage;
pub mod theme;
pub mod token;

pub use api::{AuthApi, RefreshResponse, ResourceApi};
pub use config::{ApiSettings, AuthSettings, ClientConfig, StorageSettings};
pub use error::{ClientError, ClientResult};
pub use http::{AuthInterceptor, HttpClient};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use theme::ThemePreference;
pub use token::{TokenKind, TokenStore};
