//! # Auth Module
//!
//! Session state and the four session actions.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                 login ok / check_auth (token stored)                    │
//! │   ┌───────────┐ ─────────────────────────────────────► ┌─────────────┐  │
//! │   │ Anonymous │                                        │Authenticated│  │
//! │   └───────────┘ ◄───────────────────────────────────── └─────────────┘  │
//! │        │  ▲       logout / refresh rejected (purge)           │         │
//! │        │  │                                                   │         │
//! │  login │  │ logout / check_auth (no token)       login failed │         │
//! │  failed▼  │                                                   ▼         │
//! │   ┌───────────┐ ◄──────────────────────────────────────────────         │
//! │   │   Error   │                                                         │
//! │   └───────────┘                                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any doubt about a token ends in a purge: no retry, no partial session.
//! A failed login purges too, so the Error state never holds credentials.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use bedrock_client::{AuthApi, ClientError, TokenKind};
use bedrock_core::{
    parse_login_response, Notification, UserProfile, LOGOUT_MESSAGE, REFRESH_FAILED_MESSAGE,
};

use crate::error::StoreResult;
use crate::store::{Mutation, Store};

// =============================================================================
// Auth State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Anonymous,
    Authenticated,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub last_error: Option<String>,
}

impl AuthState {
    pub fn status(&self) -> AuthStatus {
        if self.is_authenticated {
            AuthStatus::Authenticated
        } else if self.last_error.is_some() {
            AuthStatus::Error
        } else {
            AuthStatus::Anonymous
        }
    }
}

// =============================================================================
// Auth Actions
// =============================================================================

impl Store {
    /// Exchanges credentials for a session and resolves with the raw
    /// response payload.
    pub async fn login(&self, username: &str, password: &str) -> StoreResult<Value> {
        info!(username, "Logging in");
        match self.request_login(username, password).await {
            Ok(payload) => {
                info!(username, "Login succeeded");
                Ok(payload)
            }
            Err(err) => {
                // a rejected login also ends any session that was in place
                if let Err(purge_err) = self.purge() {
                    warn!(error = %purge_err, "Failed to clear stored tokens");
                }
                let _ = self.commit(Mutation::SetAuthError(err.to_string()));
                self.report("login", Err(err))
            }
        }
    }

    async fn request_login(&self, username: &str, password: &str) -> StoreResult<Value> {
        let payload = AuthApi::new(&self.anonymous, &self.config.auth)
            .login(username, password)
            .await?;
        let (user, credentials) = parse_login_response(&payload)?;

        self.tokens.store(&credentials)?;
        self.install_token(&credentials.access);
        self.commit(Mutation::SetAuth(user))?;
        Ok(payload)
    }

    /// Ends the session and confirms with a success notification.
    pub async fn logout(&self) -> StoreResult<()> {
        let purged = self.purge();
        if purged.is_ok() {
            info!("Logged out");
            self.notify(Notification::success(LOGOUT_MESSAGE));
        }
        self.report("logout", purged)
    }

    /// Picks up a stored session at startup.
    ///
    /// With a stored access token the session is restored and, when
    /// `refresh_on_check` is set, immediately refreshed. Without one the
    /// session is purged.
    pub async fn check_auth(&self) -> StoreResult<()> {
        let stored = match self.tokens.get_token(TokenKind::Access) {
            Ok(stored) => stored,
            Err(err) => return self.report("check_auth", Err(err.into())),
        };

        let Some(token) = stored else {
            debug!("No stored token, purging session");
            return self.report("check_auth", self.purge());
        };

        self.install_token(&token);
        let _ = self.commit(Mutation::RestoreSession);
        debug!("Stored session restored");

        if self.config.auth.refresh_on_check {
            self.refresh_auth().await
        } else {
            Ok(())
        }
    }

    /// Trades the refresh token for a new access token. Any failure purges
    /// the session.
    pub async fn refresh_auth(&self) -> StoreResult<()> {
        match self.request_refresh().await {
            Ok(access) => {
                self.install_token(&access);
                let _ = self.commit(Mutation::RestoreSession);
                info!("Access token refreshed");
                Ok(())
            }
            Err(err) => {
                if err.is_auth_rejected() {
                    warn!(error = %err, "Refresh token rejected, purging session");
                } else {
                    warn!(error = %err, "Token refresh failed, purging session");
                }
                if let Err(purge_err) = self.purge() {
                    warn!(error = %purge_err, "Failed to clear stored tokens");
                }
                self.notify(Notification::warning(REFRESH_FAILED_MESSAGE));
                Err(err)
            }
        }
    }

    async fn request_refresh(&self) -> StoreResult<String> {
        let refresh = self
            .tokens
            .get_token(TokenKind::Refresh)?
            .ok_or(ClientError::MissingCredentials("refresh"))?;
        let response = AuthApi::new(&self.anonymous, &self.config.auth)
            .refresh(&refresh)
            .await?;
        self.tokens
            .set_token(Some(response.access.as_str()), response.refresh.as_deref())?;
        Ok(response.access)
    }

    /// Resets to the initial anonymous state and forgets stored tokens.
    ///
    /// In-memory state is reset even when the tokens cannot be removed.
    fn purge(&self) -> StoreResult<()> {
        self.uninstall_token();
        let _ = self.commit(Mutation::PurgeAuth);
        let _ = self.commit(Mutation::ResetResources);
        self.tokens.remove_token()?;
        Ok(())
    }
}
