//! Mapping between translation trees and flat, dot-separated keys.

use std::borrow::Cow;
use std::collections::btree_map;
use std::iter::FusedIterator;

use crate::error::BackendError;
use crate::types::{
    TerminalValue,
    TranslationNode,
    TranslationTree,
};

/// Separator between segments of a flat key.
pub const FLATTEN_SEPARATOR: &str = ".";

/// Replaces [`FLATTEN_SEPARATOR`] inside a segment name when escaping is on.
pub const SEPARATOR_ESCAPE_CHAR: char = '\u{1}';

/// Escapes the default separator inside a single segment name.
///
/// # Examples
/// ```
/// use i18n_redis_backend::flatten::escape_default_separator;
///
/// assert_eq!(escape_default_separator("a.b"), "a\u{1}b");
/// assert_eq!(escape_default_separator("plain"), "plain");
/// ```
#[must_use]
pub fn escape_default_separator(segment: &str) -> Cow<'_, str> {
    if segment.contains(FLATTEN_SEPARATOR) {
        Cow::Owned(segment.replace(FLATTEN_SEPARATOR, &SEPARATOR_ESCAPE_CHAR.to_string()))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Flattens a translation tree into `(flat key, terminal)` pairs.
///
/// Keys are `locale` followed by the dot-joined path of segment names. The
/// returned iterator walks the tree depth-first and lazily, so a consumer can
/// write each pair as it comes.
///
/// # Examples
/// ```
/// use i18n_redis_backend::flatten::flatten;
/// use i18n_redis_backend::types::tree_from_json;
/// use serde_json::json;
///
/// let tree = tree_from_json(json!({"common": {"hello": "Hello"}})).unwrap();
/// let pairs: Vec<_> = flatten(&tree, "en", true).collect::<Result<_, _>>().unwrap();
///
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(pairs[0].0, "en.common.hello");
/// ```
#[must_use]
pub fn flatten<'a>(tree: &'a TranslationTree, locale: &str, escape: bool) -> Flatten<'a> {
    Flatten { stack: vec![(locale.to_string(), tree.iter())], escape, failed: false }
}

/// Depth-first iterator returned by [`flatten`].
///
/// Yields [`BackendError::UnsupportedValueKind`] for a deferred leaf and stops
/// after it.
#[derive(Debug)]
pub struct Flatten<'a> {
    /// Prefix and remaining children of every mapping on the current path.
    stack: Vec<(String, btree_map::Iter<'a, String, TranslationNode>)>,
    /// Whether separators inside segment names are escaped.
    escape: bool,
    /// Set once an error has been yielded.
    failed: bool,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = Result<(String, &'a TerminalValue), BackendError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let (prefix, children) = self.stack.last_mut()?;
            let Some((segment, node)) = children.next() else {
                self.stack.pop();
                continue;
            };

            let segment =
                if self.escape { escape_default_separator(segment) } else { Cow::from(segment) };
            let key = format!("{prefix}{FLATTEN_SEPARATOR}{segment}");

            match node {
                TranslationNode::Value(value) => return Some(Ok((key, value))),
                TranslationNode::Map(tree) => self.stack.push((key, tree.iter())),
                TranslationNode::Deferred(_) => {
                    self.failed = true;
                    return Some(Err(BackendError::UnsupportedValueKind { key }));
                }
            }
        }
    }
}

impl FusedIterator for Flatten<'_> {}

/// Builds the flat key (without locale) for a lookup.
///
/// Scope segments come first, then the key. With a custom separator, literal
/// dots are escaped and the separator is rewritten to [`FLATTEN_SEPARATOR`].
/// Parts are joined as given, so an empty key or `a..b` never matches a
/// stored entry.
///
/// # Examples
/// ```
/// use i18n_redis_backend::flatten::normalize_flat_keys;
///
/// assert_eq!(normalize_flat_keys(&["messages"], "greeting", None), "messages.greeting");
/// assert_eq!(normalize_flat_keys(&[], "a|b", Some("|")), "a.b");
/// ```
#[must_use]
pub fn normalize_flat_keys(scope: &[&str], key: &str, separator: Option<&str>) -> String {
    let separator = separator.filter(|s| !s.is_empty()).unwrap_or(FLATTEN_SEPARATOR);

    scope
        .iter()
        .copied()
        .chain(std::iter::once(key))
        .map(|part| {
            if separator == FLATTEN_SEPARATOR {
                Cow::Borrowed(part)
            } else {
                Cow::Owned(
                    part.replace(FLATTEN_SEPARATOR, &SEPARATOR_ESCAPE_CHAR.to_string())
                        .replace(separator, FLATTEN_SEPARATOR),
                )
            }
        })
        .collect::<Vec<_>>()
        .join(FLATTEN_SEPARATOR)
}
