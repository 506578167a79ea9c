//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document matched the filter.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The backing store failed or is unreachable.
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A patch could not be applied to the stored document.
    #[error("patch failed: {0}")]
    PatchFailed(String),
}
