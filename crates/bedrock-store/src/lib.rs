//! # bedrock-store: Client-Side State Store for the Bedrock Console
//!
//! Holds the session, the loaded inventory collections and the current
//! notification, and runs the actions that keep them in step with the
//! backend.
//!
//! ## Usage
//! ```text
//! let store = Store::from_config(ClientConfig::load_or_default(None))?;
//! store.check_auth().await.ok();
//! store.dispatch(Command::FetchResources(ResourceKind::Server)).await.ok();
//!
//! for server in store.resources(ResourceKind::Server) { ... }
//! if let Some(n) = store.notification() { ... }
//! ```
//!
//! Actions never panic. A failed action leaves its notification in the
//! [`NotificationCenter`] and also returns the error, which the caller may
//! ignore.

pub mod auth;
pub mod error;
pub mod notification;
pub mod resources;
pub mod store;

pub use auth::{AuthState, AuthStatus};
pub use error::{StoreError, StoreResult};
pub use notification::NotificationCenter;
pub use resources::ResourceState;
pub use store::{Command, Mutation, Store};
