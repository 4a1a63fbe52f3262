//! # Store Error Types
//!
//! Every action failure is one of these. Actions also turn them into a
//! notification before handing them back, so callers are free to ignore the
//! returned error.

use thiserror::Error;

use bedrock_client::ClientError;
use bedrock_core::{CoreError, Severity};

/// Result type alias for store actions.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Request, storage or configuration failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The response arrived but could not be applied.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// True when an update/delete targeted a record that is not loaded.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Core(CoreError::NotFound { .. }))
    }

    /// True when the backend refused the credentials (401/403).
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, StoreError::Client(err) if err.is_auth_rejected())
    }

    /// Severity of the notification raised for this error.
    pub fn severity(&self) -> Severity {
        if self.is_not_found() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}
