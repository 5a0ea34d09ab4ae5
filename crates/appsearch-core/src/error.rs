//! Error types for the application search index.
//!
//! Query paths never surface these to callers (searches degrade to empty or
//! alphabetic results); they are returned by the lower-level components and
//! logged by the scheduler and service.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the appsearch crate.
#[derive(Debug, Error)]
pub enum AppSearchError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Usage store schema version {found} is not supported (expected {expected})")]
    SchemaVersionMismatch { found: i64, expected: i64 },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Caller input errors
    #[error("Invalid item id: {0}")]
    InvalidItemId(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    // Index invariants
    #[error("Item {item} does not belong to rebuild scope {scope}")]
    ScopeMismatch { scope: String, item: String },

    // Rebuild pipeline
    #[error("Enumeration failed for scope {scope}: {message}")]
    Enumeration { scope: String, message: String },

    #[error("Update scheduler is not running")]
    SchedulerStopped,
}

/// Result type alias for appsearch operations.
pub type Result<T> = std::result::Result<T, AppSearchError>;

impl From<std::io::Error> for AppSearchError {
    fn from(err: std::io::Error) -> Self {
        AppSearchError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for AppSearchError {
    fn from(err: serde_json::Error) -> Self {
        AppSearchError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for AppSearchError {
    fn from(err: rusqlite::Error) -> Self {
        AppSearchError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl AppSearchError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        AppSearchError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }
}
