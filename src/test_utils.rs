//! Test helpers
//!
//! Shared by the unit test modules.
#![cfg(test)]

use serde_json::Value;

use crate::backend::RedisBackend;
use crate::store::MemoryStore;
use crate::types::{
    TranslationTree,
    tree_from_json,
};

/// Backend over an empty in-memory store
pub(crate) fn memory_backend() -> RedisBackend<MemoryStore> {
    RedisBackend::new(MemoryStore::new())
}

/// Builds a translation tree from JSON
///
/// # Panics
/// If the root is not an object
#[allow(clippy::expect_used)]
pub(crate) fn tree(json: Value) -> TranslationTree {
    tree_from_json(json).expect("test tree root must be an object")
}
