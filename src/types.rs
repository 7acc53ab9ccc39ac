//! Core types used throughout the project.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{
    Number,
    Value,
};

use crate::error::BackendError;

/// A translation root: segment name to child node.
pub type TranslationTree = BTreeMap<String, TranslationNode>;

/// A leaf value that can be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Arrays are stored as a single entry, never flattened.
    List(Vec<Value>),
    /// Stored text that did not decode as JSON (or decoded to an object).
    Raw(String),
}

impl TerminalValue {
    /// Returns the text for string-like values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Raw(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for TerminalValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TerminalValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for TerminalValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for TerminalValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&TerminalValue> for Value {
    fn from(value: &TerminalValue) -> Self {
        match value {
            TerminalValue::Null => Self::Null,
            TerminalValue::Bool(b) => Self::Bool(*b),
            TerminalValue::Number(n) => Self::Number(n.clone()),
            TerminalValue::String(s) | TerminalValue::Raw(s) => Self::String(s.clone()),
            TerminalValue::List(items) => Self::Array(items.clone()),
        }
    }
}

/// Callback signature of a lazily computed translation: `(locale, key) -> value`.
type DeferredFn = dyn Fn(&str, &str) -> TerminalValue + Send + Sync;

/// A value computed by the framework at lookup time.
///
/// Deferred values only live in memory; they have no encoded form and are
/// rejected when a tree is written to a key-value store.
#[derive(Clone)]
pub struct Deferred(Arc<DeferredFn>);

impl Deferred {
    #[must_use]
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str, &str) -> TerminalValue + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    /// Evaluates the callback.
    #[must_use]
    pub fn call(&self, locale: &str, key: &str) -> TerminalValue {
        (self.0)(locale, key)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(<callback>)")
    }
}

/// A node of a translation tree.
#[derive(Debug, Clone)]
pub enum TranslationNode {
    Value(TerminalValue),
    Map(TranslationTree),
    Deferred(Deferred),
}

impl From<TerminalValue> for TranslationNode {
    fn from(value: TerminalValue) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for TranslationNode {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<TranslationTree> for TranslationNode {
    fn from(tree: TranslationTree) -> Self {
        Self::Map(tree)
    }
}

impl From<Value> for TranslationNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
            other => Self::Value(TerminalValue::from(other)),
        }
    }
}

impl From<Value> for TerminalValue {
    /// Objects are not terminals; they are kept as their JSON text.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items),
            object @ Value::Object(_) => Self::Raw(object.to_string()),
        }
    }
}

/// Builds a translation tree from a JSON document whose root is an object.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use i18n_redis_backend::types::tree_from_json;
///
/// let tree = tree_from_json(json!({"messages": {"greeting": "hi"}})).unwrap();
/// assert!(tree.contains_key("messages"));
/// ```
pub fn tree_from_json(value: Value) -> Result<TranslationTree, BackendError> {
    match TranslationNode::from(value) {
        TranslationNode::Map(tree) => Ok(tree),
        _ => Err(BackendError::InvalidTree("translation root must be an object".to_string())),
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    /// An exact key match.
    Value(TerminalValue),
    /// Descendants of an intermediate key, keyed by their dotted path relative to it.
    Subtree(BTreeMap<String, TerminalValue>),
}

impl LookupResult {
    #[must_use]
    pub const fn as_value(&self) -> Option<&TerminalValue> {
        match self {
            Self::Value(value) => Some(value),
            Self::Subtree(_) => None,
        }
    }

    #[must_use]
    pub const fn as_subtree(&self) -> Option<&BTreeMap<String, TerminalValue>> {
        match self {
            Self::Subtree(map) => Some(map),
            Self::Value(_) => None,
        }
    }
}

impl From<&LookupResult> for Value {
    fn from(result: &LookupResult) -> Self {
        match result {
            LookupResult::Value(value) => Self::from(value),
            LookupResult::Subtree(map) => {
                Self::Object(map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use serde_json::json;

    use super::*;

    #[googletest::test]
    fn test_node_from_json_nested_objects_become_maps() {
        let node = TranslationNode::from(json!({"a": {"b": "x"}, "n": 1}));

        let TranslationNode::Map(root) = node else {
            panic!("expected a map");
        };
        expect_that!(matches!(root.get("a"), Some(TranslationNode::Map(_))), eq(true));
        expect_that!(
            matches!(root.get("n"), Some(TranslationNode::Value(TerminalValue::Number(_)))),
            eq(true)
        );
    }

    #[googletest::test]
    fn test_arrays_are_terminal() {
        let value = TerminalValue::from(json!(["Sun", "Mon"]));

        assert_eq!(value, TerminalValue::List(vec![json!("Sun"), json!("Mon")]));
    }

    #[googletest::test]
    fn test_tree_from_json_rejects_scalar_root() {
        let result = tree_from_json(json!("hello"));

        expect_that!(matches!(result, Err(BackendError::InvalidTree(_))), eq(true));
    }

    #[googletest::test]
    fn test_deferred_debug_hides_callback() {
        let deferred = Deferred::new(|locale, key| format!("{locale}:{key}").into());

        expect_that!(format!("{deferred:?}"), eq("Deferred(<callback>)"));
        let value = deferred.call("en", "a");
        expect_that!(value.as_str(), some(eq("en:a")));
    }

    #[googletest::test]
    fn test_lookup_result_to_json() {
        let mut map = BTreeMap::new();
        map.insert("b.c".to_string(), TerminalValue::from("x"));
        let result = LookupResult::Subtree(map);

        assert_eq!(Value::from(&result), json!({"b.c": "x"}));
        expect_that!(result.as_value(), none());
    }
}
