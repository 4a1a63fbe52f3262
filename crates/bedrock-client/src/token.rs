//! # Token Store
//!
//! Persists the access/refresh credential pair under two fixed storage keys.
//!
//! No validation of token format or expiry happens here. An expired token is
//! only discovered when the backend rejects a request made with it.

use std::sync::Arc;
use tracing::debug;

use bedrock_core::Credentials;

use crate::error::ClientResult;
use crate::storage::Storage;

pub const ACCESS_TOKEN_KEY: &str = "id_access_token";
pub const REFRESH_TOKEN_KEY: &str = "id_refresh_token";

/// Which half of the credential pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenKind {
    #[default]
    Access,
    Refresh,
}

impl TokenKind {
    pub const fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_TOKEN_KEY,
            TokenKind::Refresh => REFRESH_TOKEN_KEY,
        }
    }
}

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        TokenStore { storage }
    }

    /// Reads one token.
    pub fn get_token(&self, kind: TokenKind) -> ClientResult<Option<String>> {
        self.storage.get(kind.key())
    }

    /// Writes whichever tokens are given. `None` leaves the stored value alone.
    pub fn set_token(&self, access: Option<&str>, refresh: Option<&str>) -> ClientResult<()> {
        if let Some(access) = access {
            self.storage.set(ACCESS_TOKEN_KEY, access)?;
        }
        if let Some(refresh) = refresh {
            self.storage.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        debug!(
            access = access.is_some(),
            refresh = refresh.is_some(),
            "Stored tokens"
        );
        Ok(())
    }

    /// Persists a full credential pair.
    pub fn store(&self, credentials: &Credentials) -> ClientResult<()> {
        self.set_token(Some(credentials.access.as_str()), credentials.refresh.as_deref())
    }

    /// Clears both keys.
    pub fn remove_token(&self) -> ClientResult<()> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        debug!("Removed stored tokens");
        Ok(())
    }

    /// The stored pair, if an access token exists.
    pub fn credentials(&self) -> ClientResult<Option<Credentials>> {
        let Some(access) = self.get_token(TokenKind::Access)? else {
            return Ok(None);
        };
        let refresh = self.get_token(TokenKind::Refresh)?;
        Ok(Some(Credentials::new(access, refresh)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, TokenStore) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), TokenStore::new(storage))
    }

    #[test]
    fn test_set_token_leaves_absent_fields_untouched() {
        let (storage, tokens) = store();
        tokens.set_token(Some("a1"), Some("r1")).unwrap();
        tokens.set_token(Some("a2"), None).unwrap();

        assert_eq!(tokens.get_token(TokenKind::Access).unwrap().as_deref(), Some("a2"));
        assert_eq!(tokens.get_token(TokenKind::Refresh).unwrap().as_deref(), Some("r1"));
        assert_eq!(storage.get("id_access_token").unwrap().as_deref(), Some("a2"));
    }

    #[test]
    fn test_remove_token_clears_both_keys() {
        let (storage, tokens) = store();
        tokens
            .store(&Credentials::new("a", Some("r".to_string())))
            .unwrap();
        tokens.remove_token().unwrap();

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap(), None);
        assert_eq!(tokens.credentials().unwrap(), None);
    }

    #[test]
    fn test_default_kind_is_access() {
        let (_, tokens) = store();
        tokens.set_token(Some("a"), None).unwrap();
        assert_eq!(tokens.get_token(TokenKind::default()).unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_credentials_without_refresh() {
        let (_, tokens) = store();
        tokens.set_token(Some("only-access"), None).unwrap();
        let creds = tokens.credentials().unwrap().unwrap();
        assert_eq!(creds.access, "only-access");
        assert_eq!(creds.refresh, None);
    }
}
