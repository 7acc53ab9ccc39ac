//! Translation backend that keeps translations in a key-value store.

use std::collections::{
    BTreeMap,
    BTreeSet,
};

use serde_json::Value;

use crate::codec;
use crate::error::BackendError;
use crate::flatten::{
    FLATTEN_SEPARATOR,
    flatten,
    normalize_flat_keys,
};
use crate::store::{
    KeyValueStore,
    RedisStore,
};
use crate::types::{
    LookupResult,
    TerminalValue,
    TranslationTree,
    tree_from_json,
};

/// Options for [`I18nBackend::store_translations`].
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Escape separators that appear inside segment names.
    pub escape: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { escape: true }
    }
}

/// Options for [`I18nBackend::lookup`].
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    /// Separator used in `key` and `scope`; `.` when unset.
    pub separator: Option<String>,
}

/// Surface an i18n framework uses to read and write translations.
///
/// Fallbacks, pluralization and interpolation are the framework's job; a
/// backend only maps keys to stored values.
pub trait I18nBackend {
    /// Writes every leaf of `data` under `locale`.
    fn store_translations(
        &self,
        locale: &str,
        data: &TranslationTree,
        options: StoreOptions,
    ) -> Result<(), BackendError>;

    /// Looks up `key` (prefixed by `scope`) in `locale`.
    ///
    /// Returns `Ok(None)` when nothing is stored at or below the key.
    fn lookup(
        &self,
        locale: &str,
        key: &str,
        scope: &[&str],
        options: &LookupOptions,
    ) -> Result<Option<LookupResult>, BackendError>;

    /// Locales that have at least one stored key.
    fn available_locales(&self) -> Result<BTreeSet<String>, BackendError>;

    /// Link resolution hook. Returns the key unchanged.
    fn resolve_link(&self, _locale: &str, key: String) -> String {
        key
    }
}

/// Stores translations as one JSON-encoded entry per leaf.
///
/// `en.messages.greeting` holds `"Hello"`; a lookup of an intermediate key
/// collects its descendants.
#[derive(Debug)]
pub struct RedisBackend<S = RedisStore> {
    /// Underlying key-value store
    store: S,
}

impl RedisBackend<RedisStore> {
    /// Connects to Redis using address specifications
    /// (`host[:port][/db][/namespace]`). Several addresses form a cluster.
    pub fn connect<A: AsRef<str>>(addresses: &[A]) -> Result<Self, BackendError> {
        Ok(Self::new(RedisStore::open(addresses)?))
    }
}

impl<S: KeyValueStore> RedisBackend<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Stores a document whose top-level keys are locales.
    ///
    /// A locale mapped to `null` stores nothing. Returns the number of entries
    /// written.
    pub fn load_translations(
        &self,
        document: Value,
        options: StoreOptions,
    ) -> Result<usize, BackendError> {
        let Value::Object(locales) = document else {
            return Err(BackendError::InvalidTree(
                "top-level value must be an object keyed by locale".to_string(),
            ));
        };

        let mut written = 0;
        for (locale, data) in locales {
            if data.is_null() {
                continue;
            }
            let tree = tree_from_json(data)?;
            written += self.write_tree(&locale, &tree, options)?;
        }
        Ok(written)
    }

    /// Writes a tree and returns the number of entries written.
    fn write_tree(
        &self,
        locale: &str,
        data: &TranslationTree,
        options: StoreOptions,
    ) -> Result<usize, BackendError> {
        let mut written = 0;
        for pair in flatten(data, locale, options.escape) {
            let (key, value) = pair?;
            self.store.set(&key, &codec::encode(value))?;
            written += 1;
        }
        tracing::debug!(locale, written, "Stored translations");
        Ok(written)
    }

    /// Decodes the value at `key`; `None` if it vanished since it was listed.
    fn read(&self, key: &str) -> Result<Option<TerminalValue>, BackendError> {
        Ok(self.store.get(key)?.as_deref().map(codec::decode))
    }
}

impl<S: KeyValueStore> I18nBackend for RedisBackend<S> {
    fn store_translations(
        &self,
        locale: &str,
        data: &TranslationTree,
        options: StoreOptions,
    ) -> Result<(), BackendError> {
        self.write_tree(locale, data, options).map(|_| ())
    }

    fn lookup(
        &self,
        locale: &str,
        key: &str,
        scope: &[&str],
        options: &LookupOptions,
    ) -> Result<Option<LookupResult>, BackendError> {
        let key = normalize_flat_keys(scope, key, options.separator.as_deref());
        let key = self.resolve_link(locale, key);

        let main_key = format!("{locale}{FLATTEN_SEPARATOR}{key}");

        if let Some(value) = self.read(&main_key)? {
            return Ok(Some(LookupResult::Value(value)));
        }

        let prefix = format!("{main_key}{FLATTEN_SEPARATOR}");
        let child_keys = self.store.scan_prefix(&prefix)?;
        if child_keys.is_empty() {
            tracing::debug!(key = %main_key, "Translation not found");
            return Ok(None);
        }

        let mut subtree = BTreeMap::new();
        for child_key in child_keys {
            let Some(subkey) = child_key.strip_prefix(&prefix) else {
                continue;
            };
            if let Some(value) = self.read(&child_key)? {
                subtree.insert(subkey.to_string(), value);
            }
        }

        if subtree.is_empty() { Ok(None) } else { Ok(Some(LookupResult::Subtree(subtree))) }
    }

    fn available_locales(&self) -> Result<BTreeSet<String>, BackendError> {
        let locales = self
            .store
            .keys()?
            .into_iter()
            .filter_map(|key| {
                key.split_once(FLATTEN_SEPARATOR).map(|(locale, _)| locale.to_string())
            })
            .collect();
        Ok(locales)
    }
}
