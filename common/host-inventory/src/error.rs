//! Error types for host inventory operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hint shown to users when an operation was refused by the OS
pub const ELEVATION_HINT: &str = "administrator privileges may be required; re-run elevated";

/// Coarse classification of an [`InventoryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Timeout,
    Unavailable,
    Cancelled,
    Unknown,
}

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("Access denied while trying to {action} ({})", ELEVATION_HINT)]
    AccessDenied { action: String },

    #[error("Timed out after {secs:.1}s waiting for {what}")]
    Timeout { what: String, secs: f64 },

    #[error("Unavailable on this host: {0}")]
    Unavailable(String),

    #[error("Cancelled while waiting for {0}")]
    Cancelled(String),

    #[error("{0}")]
    Unknown(String),
}

impl InventoryError {
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    pub fn access_denied(action: impl Into<String>) -> Self {
        Self::AccessDenied {
            action: action.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// User-facing remedy, if there is one
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AccessDenied { .. } => Some(ELEVATION_HINT),
            _ => None,
        }
    }

    /// Classify an I/O error raised while talking to the OS
    pub fn from_io(action: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                Self::Unavailable(format!("{}: {}", action, err))
            }
            std::io::ErrorKind::PermissionDenied => Self::access_denied(action),
            _ => Self::Unknown(format!("{}: {}", action, err)),
        }
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;
