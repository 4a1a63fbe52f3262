//! # Notifications
//!
//! The single transient message shown by the global toast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Toast severity. `Warning` serializes as `amber`, the toast colour name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
    #[serde(rename = "amber", alias = "warning")]
    Warning,
}

impl Severity {
    /// Toast colour.
    pub const fn color(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "amber",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(Severity::Success),
            "error" => Ok(Severity::Error),
            "warning" | "amber" => Ok(Severity::Warning),
            other => Err(CoreError::UnknownSeverity(other.to_string())),
        }
    }
}

/// A message for global display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Notification {
            message: message.into(),
            severity,
            raised_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }
}
