//! # Domain Types
//!
//! Core domain types used throughout the Bedrock console.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ResourceKind   │   │    Resource     │   │   ResourceId    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Server         │   │  id             │   │  Int(i64)       │       │
//! │  │  Environment    │   │  ...backend-    │   │  Str(String)    │       │
//! │  │  Cluster        │   │  defined fields │   └─────────────────┘       │
//! │  │  Product        │   │  (opaque JSON)  │                              │
//! │  │  OperatingSystem│   └─────────────────┘   ┌─────────────────┐       │
//! │  │  Label          │                         │  ServerStatus   │       │
//! │  │  Owner          │                         │  ─────────────  │       │
//! │  │  Domain         │                         │  Active → green │       │
//! │  └─────────────────┘                         │  Inactive→orange│       │
//! │                                              │  Decom  → red   │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Opaque Records
//! The backend owns the schema of every inventory entity. A [`Resource`] only
//! guarantees an `id` field; everything else passes through unmodified.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Resource Kind
// =============================================================================

/// The closed set of inventory resource types the backend exposes.
///
/// Each kind has two spellings:
/// - [`name`](ResourceKind::name): the display name used by views and the CLI
///   (`server`, `operating-system`)
/// - [`endpoint`](ResourceKind::endpoint): the path segment registered on the
///   backend router (`servers`, `operating_systems`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Server,
    Environment,
    Cluster,
    /// Hosted application. The views call these "applications".
    Product,
    OperatingSystem,
    Label,
    Owner,
    Domain,
}

impl ResourceKind {
    /// Every kind, in the order the navigation lists them.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Server,
        ResourceKind::Environment,
        ResourceKind::Cluster,
        ResourceKind::Product,
        ResourceKind::OperatingSystem,
        ResourceKind::Label,
        ResourceKind::Owner,
        ResourceKind::Domain,
    ];

    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            ResourceKind::Server => "server",
            ResourceKind::Environment => "environment",
            ResourceKind::Cluster => "cluster",
            ResourceKind::Product => "product",
            ResourceKind::OperatingSystem => "operating-system",
            ResourceKind::Label => "label",
            ResourceKind::Owner => "owner",
            ResourceKind::Domain => "domain",
        }
    }

    /// Backend collection path segment.
    pub const fn endpoint(&self) -> &'static str {
        match self {
            ResourceKind::Server => "servers",
            ResourceKind::Environment => "environments",
            ResourceKind::Cluster => "clusters",
            ResourceKind::Product => "products",
            ResourceKind::OperatingSystem => "operating_systems",
            ResourceKind::Label => "labels",
            ResourceKind::Owner => "owners",
            ResourceKind::Domain => "domains",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "server" | "servers" => Ok(ResourceKind::Server),
            "environment" | "environments" => Ok(ResourceKind::Environment),
            "cluster" | "clusters" => Ok(ResourceKind::Cluster),
            "product" | "products" | "application" | "applications" => Ok(ResourceKind::Product),
            "operating-system" | "operating-systems" | "os" => Ok(ResourceKind::OperatingSystem),
            "label" | "labels" => Ok(ResourceKind::Label),
            "owner" | "owners" => Ok(ResourceKind::Owner),
            "domain" | "domains" => Ok(ResourceKind::Domain),
            _ => Err(CoreError::UnknownResourceKind(s.to_string())),
        }
    }
}

// =============================================================================
// Resource Id
// =============================================================================

/// Identifier of a record within its collection.
///
/// The backend issues integer keys, but the record format does not promise
/// that, so string ids are carried too. Equality is strict: `Int(5)` and
/// `Str("5")` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Str(String),
}

impl ResourceId {
    /// Reads an id out of a JSON value. Floats, booleans and nulls are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ResourceId::Int),
            Value::String(s) => Some(ResourceId::Str(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Str(id)
    }
}

impl From<ResourceId> for Value {
    fn from(id: ResourceId) -> Self {
        match id {
            ResourceId::Int(id) => Value::from(id),
            ResourceId::Str(id) => Value::String(id),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Str(id) => f.write_str(id),
        }
    }
}

/// Numeric text becomes `Int`, anything else `Str`.
impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(ResourceId::Int)
            .unwrap_or_else(|_| ResourceId::Str(s.to_string())))
    }
}

// =============================================================================
// Resource
// =============================================================================

/// One inventory record: an opaque JSON object with at least an `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    /// Creates an empty record (no id yet, as sent on create).
    pub fn new() -> Self {
        Resource(Map::new())
    }

    /// Wraps a JSON value, which must be an object.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(map) => Ok(Resource(map)),
            other => Err(CoreError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Returns the record id, if present and usable.
    pub fn id(&self) -> Option<ResourceId> {
        self.0.get("id").and_then(ResourceId::from_value)
    }

    /// Returns a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Shallow merge: every top-level field of `other` overwrites the same
    /// field here. Fields absent from `other` are kept.
    pub fn merge(&mut self, other: Resource) {
        for (field, value) in other.0 {
            self.0.insert(field, value);
        }
    }

    /// The `name` field, which every backend entity carries.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The `status` field parsed as a [`ServerStatus`].
    pub fn status(&self) -> Option<ServerStatus> {
        self.0
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Borrows all fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts back into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Resource {
    fn from(map: Map<String, Value>) -> Self {
        Resource(map)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Server Status
// =============================================================================

/// Lifecycle status shared by servers and domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerStatus {
    Active,
    Inactive,
    Decom,
}

impl ServerStatus {
    /// Badge colour shown next to the status.
    pub const fn color(&self) -> &'static str {
        match self {
            ServerStatus::Active => "green",
            ServerStatus::Inactive => "orange",
            ServerStatus::Decom => "red",
        }
    }
}

impl FromStr for ServerStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ServerStatus::Active),
            "INACTIVE" => Ok(ServerStatus::Inactive),
            "DECOM" => Ok(ServerStatus::Decom),
            other => Err(CoreError::InvalidPayload(format!("unknown status '{}'", other))),
        }
    }
}

/// Badge colour for a raw status string. Anything unrecognized is red.
pub fn status_color(status: &str) -> &'static str {
    status
        .parse::<ServerStatus>()
        .map(|s| s.color())
        .unwrap_or("red")
}

// =============================================================================
// Unit Tests
// =============================================================================
