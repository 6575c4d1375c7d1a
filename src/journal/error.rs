//! Journal persistence error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the durable journal store
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// History file could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another writer holds the store
    #[error("Journal store is locked by another writer: {}", .0.display())]
    Locked(PathBuf),
}

/// Result type alias for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;
