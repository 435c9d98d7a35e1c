//! Error types for logcache
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;

/// Unified error type for logcache operations
#[derive(Debug, Error)]
pub enum CacheError {
    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------
    /// The key has no live record. The only variant callers are expected
    /// to branch on.
    #[error("Key not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt log at offset {offset}: {reason}")]
    CorruptLog { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Bucket Store Errors
    // -------------------------------------------------------------------------
    #[error("Bucket store error: {0}")]
    Bucket(Box<redb::Error>),
}

impl CacheError {
    /// True for the recoverable "absent key" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound)
    }

    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        CacheError::CorruptLog {
            offset,
            reason: reason.into(),
        }
    }
}

impl From<redb::Error> for CacheError {
    fn from(e: redb::Error) -> Self {
        CacheError::Bucket(Box::new(e))
    }
}

impl From<redb::DatabaseError> for CacheError {
    fn from(e: redb::DatabaseError) -> Self {
        CacheError::Bucket(Box::new(e.into()))
    }
}

impl From<redb::TransactionError> for CacheError {
    fn from(e: redb::TransactionError) -> Self {
        CacheError::Bucket(Box::new(e.into()))
    }
}

impl From<redb::TableError> for CacheError {
    fn from(e: redb::TableError) -> Self {
        CacheError::Bucket(Box::new(e.into()))
    }
}

impl From<redb::StorageError> for CacheError {
    fn from(e: redb::StorageError) -> Self {
        CacheError::Bucket(Box::new(e.into()))
    }
}

impl From<redb::CommitError> for CacheError {
    fn from(e: redb::CommitError) -> Self {
        CacheError::Bucket(Box::new(e.into()))
    }
}
