//! Error types for usagegate-core
//!
//! Data-shape problems (missing or corrupted records, unknown action names)
//! never surface here: they resolve to defaults or a deny decision. What
//! remains are environment faults from the persistence backends and caller
//! misuse such as an unknown tier name.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for usagegate operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Backend Errors
    // ===================
    #[error("Failed to read record file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write record file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove record file: {path}")]
    FileRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite {operation} failed")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid storage key '{key}': only [a-z0-9_-] allowed")]
    InvalidKey { key: String },

    // ===================
    // Record Errors
    // ===================
    #[error("Failed to serialize record '{key}'")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Caller Errors
    // ===================
    #[error("Unknown tier '{name}' (expected one of: free, pro, teams, enterprise)")]
    UnknownTier { name: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl CoreError {
    /// Wrap a rusqlite error with the operation that produced it
    pub(crate) fn sqlite(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| CoreError::Sqlite { operation, source }
    }

    /// True for failures of the persistence layer itself
    pub fn is_backend_fault(&self) -> bool {
        matches!(
            self,
            CoreError::FileRead { .. }
                | CoreError::FileWrite { .. }
                | CoreError::FileRemove { .. }
                | CoreError::Sqlite { .. }
        )
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, CoreError>;
