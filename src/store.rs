//! Key-value store contract and its implementations.

/// Address parsing for Redis stores
mod address;
/// In-process store
mod memory;
/// Redis-backed store
mod redis_store;

pub use address::RedisAddress;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::error::StoreError;

/// Operations the adapter needs from a key-value store.
///
/// Calls are blocking request/response round trips. Implementations add no
/// caching or retries; errors are returned as they occur.
pub trait KeyValueStore {
    /// Returns the value stored at `key`, or `None` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` at `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns every key that starts with `prefix` (matched literally).
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Returns every key in the store.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}
