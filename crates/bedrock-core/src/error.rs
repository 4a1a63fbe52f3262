//! # Error Types
//!
//! Domain-specific error types for bedrock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bedrock-core errors (this file)                                       │
//! │  └── CoreError        - Collection / payload / parsing failures        │
//! │                                                                         │
//! │  bedrock-client errors (separate crate)                                │
//! │  └── ClientError      - Config, storage and transport failures         │
//! │                                                                         │
//! │  bedrock-store errors (separate crate)                                 │
//! │  └── StoreError       - What an action hands back to its caller        │
//! │                                                                         │
//! │  Flow: CoreError / ClientError → StoreError → Notification             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::{ResourceId, ResourceKind};

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised by pure collection logic and value parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No record with the given id exists in the collection.
    ///
    /// ## When This Occurs
    /// - Update or delete for an id that was never fetched
    /// - Another response removed the record first (last-response-wins)
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: ResourceId },

    /// A record returned by the backend has no usable `id` field.
    #[error("{kind} record has no id")]
    MissingId { kind: ResourceKind },

    /// A resource type name that is not part of the closed set.
    #[error("Unknown resource kind: '{0}'")]
    UnknownResourceKind(String),

    /// Unknown notification severity name.
    #[error("Unknown severity: '{0}'")]
    UnknownSeverity(String),

    /// The backend returned a body of the wrong shape.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
