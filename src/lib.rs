//! i18n-redis-backend
//!
//! An i18n backend that keeps translations in Redis. Translation trees are
//! stored as flat keys and put back together on lookup.

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod flatten;
pub mod importer;
pub mod store;
#[cfg(test)]
mod test_utils;
pub mod types;

// Re-export the backend
pub use backend::{
    I18nBackend,
    LookupOptions,
    RedisBackend,
    StoreOptions,
};
pub use error::{
    BackendError,
    StoreError,
};
pub use types::{
    LookupResult,
    TerminalValue,
    TranslationNode,
    TranslationTree,
};
