//! Storage error types shared by the SQLite-backed stores.
//!
//! Typed variants keep store failures distinguishable in logs while
//! `user_message()` provides text suitable for display.

use thiserror::Error;

/// Local storage errors (SQLite-backed stores).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Storage query failed: {0}")]
    QueryFailed(String),

    #[error("Storage corruption detected: {0}")]
    Corruption(String),
}

impl StorageError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::ConnectionFailed(_) => {
                "Unable to access local data. Try restarting the app."
            }
            StorageError::QueryFailed(_) => "A data operation failed. Please try again.",
            StorageError::Corruption(_) => {
                "Local data may be corrupted. Consider resetting app data."
            }
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_storage_error(self) -> StorageError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_storage_error(self) -> StorageError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                StorageError::Corruption(self.to_string())
            }
            _ => StorageError::QueryFailed(self.to_string()),
        }
    }
}
