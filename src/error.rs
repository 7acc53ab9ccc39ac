use thiserror::Error;

/// Errors raised by a key-value store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error reported by the Redis client (connection, timeout, protocol)
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    /// The store cannot serve requests (e.g. a poisoned in-process lock)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Defines errors that may occur while storing or looking up translations
#[derive(Error, Debug)]
pub enum BackendError {
    /// A deferred (callback) value was found where a storable terminal was required
    #[error("Key-value stores cannot handle deferred values (key '{key}')")]
    UnsupportedValueKind { key: String },
    /// A backend address could not be parsed
    #[error("Invalid store address '{address}': {message}")]
    InvalidAddress { address: String, message: String },
    /// A translation document did not have the expected shape
    #[error("Invalid translation tree: {0}")]
    InvalidTree(String),
    /// Error passed through unchanged from the store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<redis::RedisError> for BackendError {
    fn from(error: redis::RedisError) -> Self {
        Self::Store(StoreError::Redis(error))
    }
}
