//! Error types for chunkio
//!
//! This module defines the common error type used throughout the store.

use std::sync::Arc;

use thiserror::Error;

/// Common result type for chunkio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for chunkio
#[derive(Debug, Error)]
pub enum Error {
    /// Address is absent from the metadata store
    #[error("chunk not found")]
    ChunkNotFound,

    /// Operation started after shutdown was initiated
    #[error("database closed")]
    DbClosed,

    /// Address violates the non-empty contract
    #[error("invalid address: address must not be empty")]
    InvalidAddress,

    /// Payload does not fit in a slot
    #[error("payload size {size} exceeds slot size {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Meta record failed to decode
    #[error("corrupted meta record: got {len} bytes, want 10")]
    CorruptMeta { len: usize },

    /// Filesystem failure, surfaced verbatim
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata backend failure
    #[error("metadata backend error: {0}")]
    Backend(String),

    /// Storage engine failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid store configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure preserved from an earlier call, replayed to later callers
    #[error(transparent)]
    Shared(Arc<Error>),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check if this is a not found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ChunkNotFound => true,
            Self::Shared(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a closed store
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::DbClosed => true,
            Self::Shared(e) => e.is_closed(),
            _ => false,
        }
    }
}

impl From<redb::DatabaseError> for Error {
    fn from(e: redb::DatabaseError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(e: redb::TransactionError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<redb::TableError> for Error {
    fn from(e: redb::TableError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<redb::StorageError> for Error {
    fn from(e: redb::StorageError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<redb::CommitError> for Error {
    fn from(e: redb::CommitError) -> Self {
        Self::Backend(e.to_string())
    }
}
