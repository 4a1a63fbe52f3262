//! # API Facades
//!
//! Thin path-prefixing wrappers over [`HttpClient`]. They add no logic of
//! their own: every call is one request.

use serde::Deserialize;
use serde_json::{json, Value};

use bedrock_core::{ResourceId, ResourceKind};

use crate::config::AuthSettings;
use crate::error::ClientResult;
use crate::http::HttpClient;

// =============================================================================
// Resource API
// =============================================================================

/// Inventory resources under `{namespace}/{endpoint}`.
pub struct ResourceApi<'a> {
    http: &'a HttpClient,
    namespace: &'a str,
}

impl<'a> ResourceApi<'a> {
    pub fn new(http: &'a HttpClient, namespace: &'a str) -> Self {
        ResourceApi { http, namespace }
    }

    /// `sor/servers`, `sor/operating_systems`, ...
    pub fn path(&self, kind: ResourceKind) -> String {
        format!("{}/{}", self.namespace.trim_matches('/'), kind.endpoint())
    }

    /// GET the whole collection.
    pub async fn list(&self, kind: ResourceKind) -> ClientResult<Value> {
        self.http.get(&self.path(kind), "").await
    }

    pub async fn get(&self, kind: ResourceKind, id: &ResourceId) -> ClientResult<Value> {
        self.http.get(&self.path(kind), &id.to_string()).await
    }

    pub async fn create(&self, kind: ResourceKind, body: &Value) -> ClientResult<Value> {
        self.http.post(&self.path(kind), body).await
    }

    pub async fn update(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        body: &Value,
    ) -> ClientResult<Value> {
        self.http.update(&self.path(kind), &id.to_string(), body).await
    }

    pub async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> ClientResult<()> {
        self.http
            .delete(&format!("{}/{}", self.path(kind), id))
            .await
    }
}

// =============================================================================
// Auth API
// =============================================================================

/// Body of a successful refresh call.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    /// Present only when the backend rotates refresh tokens.
    #[serde(default)]
    pub refresh: Option<String>,
}

pub struct AuthApi<'a> {
    http: &'a HttpClient,
    settings: &'a AuthSettings,
}

impl<'a> AuthApi<'a> {
    pub fn new(http: &'a HttpClient, settings: &'a AuthSettings) -> Self {
        AuthApi { http, settings }
    }

    /// Exchanges credentials for the raw login payload.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Value> {
        let body = json!({ "username": username, "password": password });
        self.http.post(&self.settings.login_path, &body).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<RefreshResponse> {
        let body = json!({ "refresh": refresh_token });
        self.http.post(&self.settings.refresh_path, &body).await
    }
}
