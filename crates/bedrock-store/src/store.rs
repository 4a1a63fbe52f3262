//! # Store
//!
//! The explicit context object every front end is handed at startup.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   front end ──► dispatch(Command) ──► action ──► ResourceApi / AuthApi  │
//! │                                         │                               │
//! │                          response ◄─────┘                               │
//! │                             │                                           │
//! │                             ▼                                           │
//! │                      commit(Mutation) ──► AuthState / ResourceState     │
//! │                             │                                           │
//! │   front end ◄── getters ◄───┘        failures ──► NotificationCenter    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations are synchronous and only run after a request completes, so the
//! state locks are never held across an `.await`. Concurrent actions are not
//! coordinated: when two updates for the same record race, the response that
//! arrives last is the one merged last.

use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use bedrock_client::{
    ClientConfig, ClientError, ClientResult, FileStorage, HttpClient, Storage, ThemePreference,
    TokenStore,
};
use bedrock_core::{
    CoreResult, Notification, Resource, ResourceCollections, ResourceId, ResourceKind,
    UserProfile,
};

use crate::auth::AuthState;
use crate::error::StoreResult;
use crate::notification::NotificationCenter;
use crate::resources::ResourceState;

// =============================================================================
// Mutations
// =============================================================================

/// Synchronous state transitions. Applied only through [`Store::commit`].
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Login succeeded.
    SetAuth(UserProfile),
    /// A stored or refreshed token is in use; the profile is unknown.
    RestoreSession,
    SetAuthError(String),
    /// Back to the initial anonymous session.
    PurgeAuth,

    SetLoading(bool),
    SetResources {
        kind: ResourceKind,
        records: Vec<Resource>,
    },
    SetResource {
        kind: ResourceKind,
        record: Resource,
    },
    AddResource {
        kind: ResourceKind,
        record: Resource,
    },
    EditResource {
        kind: ResourceKind,
        record: Resource,
    },
    RemoveResource {
        kind: ResourceKind,
        id: ResourceId,
    },
    /// Empties every collection.
    ResetResources,

    SetNotification(Notification),
}

// =============================================================================
// Commands
// =============================================================================

/// Asynchronous actions. Each performs at most one round of requests.
#[derive(Debug, Clone)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    CheckAuth,
    RefreshAuth,
    FetchResources(ResourceKind),
    FetchResource { kind: ResourceKind, id: ResourceId },
    CreateResource { kind: ResourceKind, resource: Value },
    UpdateResource { kind: ResourceKind, resource: Value },
    DeleteResource { kind: ResourceKind, id: ResourceId },
}

impl Command {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::CheckAuth => "check_auth",
            Command::RefreshAuth => "refresh_auth",
            Command::FetchResources(_) => "fetch_resources",
            Command::FetchResource { .. } => "fetch_resource",
            Command::CreateResource { .. } => "create_resource",
            Command::UpdateResource { .. } => "update_resource",
            Command::DeleteResource { .. } => "delete_resource",
        }
    }
}

// =============================================================================
// Store
// =============================================================================

pub struct Store {
    pub(crate) config: ClientConfig,

    /// Client with no credentials. Auth endpoints always go through this one.
    pub(crate) anonymous: HttpClient,

    /// Client used for resource requests; swapped on login and purge.
    client: RwLock<HttpClient>,

    pub(crate) tokens: TokenStore,
    theme: ThemePreference,

    auth: RwLock<AuthState>,
    resources: RwLock<ResourceState>,
    notifications: NotificationCenter,
}

impl Store {
    /// Creates a store with an anonymous session and empty collections.
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> ClientResult<Self> {
        let anonymous = HttpClient::new(&config)?;
        info!(base_url = %anonymous.base_url(), "Store initialized");

        Ok(Store {
            client: RwLock::new(anonymous.clone()),
            anonymous,
            tokens: TokenStore::new(storage.clone()),
            theme: ThemePreference::new(storage),
            auth: RwLock::new(AuthState::default()),
            resources: RwLock::new(ResourceState::default()),
            notifications: NotificationCenter::new(),
            config,
        })
    }

    /// Creates a store backed by the configured storage file.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let path = config
            .storage_path()
            .ok_or_else(|| ClientError::InvalidConfig("no storage path available".into()))?;
        let storage = FileStorage::open(path)?;
        Self::new(config, Arc::new(storage))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn auth_state(&self) -> AuthState {
        read(&self.auth).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        read(&self.auth).is_authenticated
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        read(&self.auth).user.clone()
    }

    pub fn auth_error(&self) -> Option<String> {
        read(&self.auth).last_error.clone()
    }

    pub fn is_loading(&self) -> bool {
        read(&self.resources).loading
    }

    /// Snapshot of one collection, in stored order.
    pub fn resources(&self, kind: ResourceKind) -> Vec<Resource> {
        read(&self.resources).collections.get(kind).to_vec()
    }

    pub fn resource(&self, kind: ResourceKind, id: &ResourceId) -> Option<Resource> {
        read(&self.resources).collections.find(kind, id).cloned()
    }

    pub fn collections(&self) -> ResourceCollections {
        read(&self.resources).collections.clone()
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifications.current()
    }

    // =========================================================================
    // Commit / Dispatch
    // =========================================================================

    /// Applies one mutation. Only edit and remove can fail.
    pub fn commit(&self, mutation: Mutation) -> CoreResult<()> {
        match mutation {
            Mutation::SetAuth(user) => {
                let mut auth = write(&self.auth);
                auth.user = Some(user);
                auth.is_authenticated = true;
                auth.last_error = None;
            }
            Mutation::RestoreSession => {
                let mut auth = write(&self.auth);
                auth.is_authenticated = true;
                auth.last_error = None;
            }
            Mutation::SetAuthError(message) => {
                let mut auth = write(&self.auth);
                auth.is_authenticated = false;
                auth.last_error = Some(message);
            }
            Mutation::PurgeAuth => *write(&self.auth) = AuthState::default(),
            Mutation::SetLoading(loading) => write(&self.resources).loading = loading,
            Mutation::SetResources { kind, records } => {
                write(&self.resources).collections.set(kind, records)
            }
            Mutation::SetResource { kind, record } => {
                write(&self.resources).collections.upsert(kind, record)?
            }
            Mutation::AddResource { kind, record } => {
                write(&self.resources).collections.add(kind, record)?
            }
            Mutation::EditResource { kind, record } => {
                self.edit_resource(kind, record)?;
            }
            Mutation::RemoveResource { kind, id } => {
                write(&self.resources).collections.remove(kind, &id)?;
            }
            Mutation::ResetResources => write(&self.resources).collections.clear(),
            Mutation::SetNotification(notification) => {
                self.notifications.set_notification(notification)
            }
        }
        Ok(())
    }

    /// `EditResource` that hands back the merged record, read under the
    /// same lock that applied the merge.
    pub(crate) fn edit_resource(
        &self,
        kind: ResourceKind,
        record: Resource,
    ) -> CoreResult<Resource> {
        write(&self.resources).collections.edit(kind, record).cloned()
    }

    /// Runs one action. Failures have already been turned into a
    /// notification by the time the error is returned.
    pub async fn dispatch(&self, command: Command) -> StoreResult<Value> {
        debug!(command = command.name(), "Dispatching");
        match command {
            Command::Login { username, password } => self.login(&username, &password).await,
            Command::Logout => self.logout().await.map(|_| Value::Null),
            Command::CheckAuth => self.check_auth().await.map(|_| Value::Null),
            Command::RefreshAuth => self.refresh_auth().await.map(|_| Value::Null),
            Command::FetchResources(kind) => self
                .fetch_resources(kind)
                .await
                .map(|records| Value::Array(records.into_iter().map(Resource::into_value).collect())),
            Command::FetchResource { kind, id } => {
                self.fetch_resource(kind, id).await.map(Resource::into_value)
            }
            Command::CreateResource { kind, resource } => {
                self.create_resource(kind, resource).await.map(Resource::into_value)
            }
            Command::UpdateResource { kind, resource } => {
                self.update_resource(kind, resource).await.map(Resource::into_value)
            }
            Command::DeleteResource { kind, id } => {
                self.delete_resource(kind, id).await.map(|_| Value::Null)
            }
        }
    }

    // =========================================================================
    // Shared Action Plumbing
    // =========================================================================

    /// Client for resource requests, carrying the current credentials.
    pub(crate) fn http(&self) -> HttpClient {
        read(&self.client).clone()
    }

    pub(crate) fn install_token(&self, token: &str) {
        *write(&self.client) = self.anonymous.authorized(token);
        debug!("Authorization installed");
    }

    pub(crate) fn uninstall_token(&self) {
        *write(&self.client) = self.anonymous.anonymous();
    }

    pub(crate) fn notify(&self, notification: Notification) {
        // SetNotification cannot fail
        let _ = self.commit(Mutation::SetNotification(notification));
    }

    /// Raises a notification for a failed action, then passes the result on.
    pub(crate) fn report<T>(&self, action: &'static str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(err) = &result {
            warn!(action, error = %err, "Action failed");
            self.notify(Notification::new(err.to_string(), err.severity()));
        }
        result
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
