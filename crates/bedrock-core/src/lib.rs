//! # bedrock-core: Pure Domain Model for the Bedrock Console
//!
//! This crate holds the inventory domain as plain values and pure functions.
//! Everything that talks to the network or to disk lives in `bedrock-client`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Bedrock Console Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bedrock-cli (views)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Command                                │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              bedrock-store (actions / mutations)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bedrock-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ collection │  │  session  │  │notification│ │   │
//! │  │   │ Resource  │  │ set / add  │  │ Profile   │  │ Severity  │  │   │
//! │  │   │ Kind / Id │  │ edit / rm  │  │ Creds     │  │ Message   │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO STORAGE • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Resource kinds, ids, opaque records, status colours
//! - [`collection`] - Per-kind record lists and their mutations
//! - [`session`] - User profile, credential pair, login response parsing
//! - [`notification`] - Toast message and severity
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bedrock_core::{Resource, ResourceCollections, ResourceKind};
//! use serde_json::json;
//!
//! let mut collections = ResourceCollections::new();
//! let created = Resource::from_value(json!({"id": 5, "name": "x"})).unwrap();
//! collections.add(ResourceKind::Server, created).unwrap();
//!
//! assert_eq!(collections.len(ResourceKind::Server), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collection;
pub mod error;
pub mod notification;
pub mod session;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use collection::{parse_collection, ResourceCollections};
pub use error::{CoreError, CoreResult};
pub use notification::{Notification, Severity};
pub use session::{parse_login_response, Credentials, UserProfile};
pub use types::{status_color, Resource, ResourceId, ResourceKind, ServerStatus};

/// Message shown after an explicit logout.
pub const LOGOUT_MESSAGE: &str = "Successfully Logged Out!";

/// Message shown when the refresh token is rejected.
pub const REFRESH_FAILED_MESSAGE: &str = "Token Refresh Failed, Logged Out!";
