//! Error types for cache operations

use thiserror::Error;

/// Main error type for all cache operations
///
/// Only [`CacheError::UnknownStore`] ever reaches callers of the manager;
/// the remaining variants exist for the backends' internal fallible paths
/// and are converted to sentinel results (`None` / `false` / `0`) at the
/// store boundary.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Requested store name is not one of the known backend kinds
    #[error("cache store [{0}] is not supported")]
    UnknownStore(String),

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Backend connection failed
    #[error("connection error: {0}")]
    Connection(String),

    /// Backend operation failed
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
