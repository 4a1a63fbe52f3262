//! # Session Types
//!
//! The user profile and credential pair produced by a successful login.
//!
//! ## Login Response Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Nested (token endpoint with custom serializer)                        │
//! │  { "user": { "username", "email", "access", "refresh" } }              │
//! │                                                                         │
//! │  Flat                                                                   │
//! │  { "access", "refresh", "user": { "username", "email" } }              │
//! │                                                                         │
//! │  Both parse into the same (UserProfile, Credentials) pair. Tokens are  │
//! │  stripped from the profile so they are never shown to the UI.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

const ACCESS_FIELD: &str = "access";
const REFRESH_FIELD: &str = "refresh";

/// Profile of the logged-in user. Only `username` and `email` are known;
/// anything else the backend sends is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Access token plus optional refresh token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl Credentials {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Credentials {
            access: access.into(),
            refresh,
        }
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access)
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Splits a login response into profile and credentials.
///
/// Top-level tokens win over nested ones. A response without any access
/// token is rejected.
pub fn parse_login_response(payload: &Value) -> CoreResult<(UserProfile, Credentials)> {
    let root = payload
        .as_object()
        .ok_or_else(|| CoreError::InvalidPayload("login response must be an object".into()))?;

    let mut user = match root.get("user") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(_) => {
            return Err(CoreError::InvalidPayload(
                "login response 'user' must be an object".into(),
            ))
        }
    };

    let nested_access = take_string(&mut user, ACCESS_FIELD);
    let nested_refresh = take_string(&mut user, REFRESH_FIELD);
    let access = root
        .get(ACCESS_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(nested_access)
        .ok_or_else(|| CoreError::InvalidPayload("login response has no access token".into()))?;
    let refresh = root
        .get(REFRESH_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(nested_refresh);

    let profile: UserProfile = serde_json::from_value(Value::Object(user))
        .map_err(|e| CoreError::InvalidPayload(format!("user profile: {}", e)))?;

    Ok((profile, Credentials::new(access, refresh)))
}

fn take_string(map: &mut Map<String, Value>, field: &str) -> Option<String> {
    match map.remove(field) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_tokens() {
        let payload = json!({
            "user": {
                "username": "admin",
                "email": "admin@example.com",
                "access": "a-token",
                "refresh": "r-token"
            }
        });
        let (profile, creds) = parse_login_response(&payload).unwrap();
        assert_eq!(profile.username.as_deref(), Some("admin"));
        assert_eq!(profile.email.as_deref(), Some("admin@example.com"));
        assert!(profile.extra.is_empty());
        assert_eq!(creds.access, "a-token");
        assert_eq!(creds.refresh.as_deref(), Some("r-token"));
    }

    #[test]
    fn test_flat_tokens_keep_extra_fields() {
        let payload = json!({
            "access": "a",
            "refresh": "r",
            "user": {"username": "ops", "team": "infra"}
        });
        let (profile, creds) = parse_login_response(&payload).unwrap();
        assert_eq!(profile.username.as_deref(), Some("ops"));
        assert_eq!(profile.extra.get("team"), Some(&json!("infra")));
        assert_eq!(creds, Credentials::new("a", Some("r".into())));
    }

    #[test]
    fn test_missing_access_token_is_rejected() {
        let payload = json!({"user": {"username": "ops"}});
        assert!(parse_login_response(&payload).is_err());
    }

    #[test]
    fn test_bearer_and_redacted_debug() {
        let creds = Credentials::new("secret", None);
        assert_eq!(creds.bearer(), "Bearer secret");
        assert!(!format!("{:?}", creds).contains("secret"));
    }
}
