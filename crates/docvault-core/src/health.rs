//! # Backend Health
//!
//! Reported by blob stores, metadata indexes, and user directories so the
//! readiness probe can tell operators which dependency is down.

use serde::{Deserialize, Serialize};

/// Health of one storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackendHealth {
    /// Backend answered its probe.
    Healthy,
    /// Backend is unreachable or misconfigured.
    Unavailable {
        /// Human-readable reason for the failure.
        reason: String,
    },
}

impl BackendHealth {
    /// Shorthand for an unavailable backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether the backend answered its probe.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl std::fmt::Display for BackendHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Unavailable { reason } => write!(f, "unavailable: {reason}"),
        }
    }
}
