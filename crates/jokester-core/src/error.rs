use thiserror::Error;

/// Errors raised while constructing core domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}

/// Errors returned by store adapters.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("joke already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("invalid storage argument: {0}")]
    InvalidArgument(String),
}
