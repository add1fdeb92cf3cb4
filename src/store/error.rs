//! Error types for alert store operations

use std::fmt;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during alert store operations
#[derive(Debug)]
pub enum StoreError {
    /// Connection to the backing store failed
    ConnectionFailed(String),

    /// A query against the store failed
    QueryFailed(String),

    /// The requested alert does not exist
    NotFound(u64),

    /// Backend-specific error
    BackendError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ConnectionFailed(msg) => {
                write!(f, "failed to connect to alert store: {}", msg)
            }
            StoreError::QueryFailed(msg) => write!(f, "alert store query failed: {}", msg),
            StoreError::NotFound(id) => write!(f, "alert {} not found", id),
            StoreError::BackendError(msg) => write!(f, "alert store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
