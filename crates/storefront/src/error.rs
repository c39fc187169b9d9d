//! Unified error handling for cart operations.
//!
//! Cart operations never fail because of *what* is stored: malformed data
//! reads as an empty cart and unparsable prices count as zero. The only
//! failures are environment failures of the storage area, which propagate to
//! the caller inside [`StoreError`].

use thiserror::Error;

use crate::storage::StorageError;

/// Error type for [`CartStore`](crate::store::CartStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage area could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the failure is the storage area running out of space.
    #[must_use]
    pub const fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Storage(StorageError::QuotaExceeded { .. }))
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
