//! Bulk import of translation files into a backend.

use std::path::{
    Path,
    PathBuf,
};

use ignore::WalkBuilder;
use jsonc_parser::ParseOptions;
use serde_json::Value;
use thiserror::Error;

use crate::backend::{
    RedisBackend,
    StoreOptions,
};
use crate::config::{
    BackendSettings,
    FileMatcher,
    MatcherError,
};
use crate::error::BackendError;
use crate::store::KeyValueStore;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Matcher(#[from] MatcherError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files stored
    pub files: usize,
    /// Entries written across all files
    pub entries: usize,
    /// Files that could not be read or parsed
    pub skipped: usize,
}

/// Loads translation files found under a directory.
///
/// Each file is a JSON (comments and trailing commas allowed) document whose
/// top-level keys are locales.
#[derive(Debug)]
pub struct TranslationImporter<'a, S> {
    backend: &'a RedisBackend<S>,
    options: StoreOptions,
}

impl<'a, S: KeyValueStore> TranslationImporter<'a, S> {
    #[must_use]
    pub const fn new(backend: &'a RedisBackend<S>, options: StoreOptions) -> Self {
        Self { backend, options }
    }

    /// Imports every translation file under `root` that the settings select.
    ///
    /// Unreadable or malformed files are skipped with a warning; a store
    /// error stops the import.
    pub fn import_dir(
        &self,
        root: &Path,
        settings: &BackendSettings,
    ) -> Result<ImportSummary, ImportError> {
        tracing::debug!(root = %root.display(), "Importing translations");
        let matcher = FileMatcher::new(root.to_path_buf(), settings)?;

        let mut summary = ImportSummary::default();
        for file in find_translation_files(&matcher) {
            let document = match load_translation_file(&file) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", file, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.backend.load_translations(document, self.options) {
                Ok(entries) => {
                    tracing::debug!(file = %file.display(), entries, "Imported translation file");
                    summary.files += 1;
                    summary.entries += entries;
                }
                Err(BackendError::InvalidTree(reason)) => {
                    tracing::warn!("Skipping {:?}: {}", file, reason);
                    summary.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            files = summary.files,
            entries = summary.entries,
            skipped = summary.skipped,
            "Import finished"
        );
        Ok(summary)
    }
}

/// Finds translation files, sorted by path.
fn find_translation_files(matcher: &FileMatcher) -> Vec<PathBuf> {
    let root = matcher.root();
    let mut found_files = Vec::new();

    for result in WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };
        if matcher.is_translation_file(relative_path) {
            found_files.push(path.to_path_buf());
        }
    }

    found_files.sort();
    found_files
}

/// Reads and parses one translation file.
///
/// An empty file yields an empty document.
///
/// # Errors
/// Returns error if file read or parse fails.
pub fn load_translation_file(file_path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(file_path)
        .map_err(|e| format!("Failed to read translation file: {e}"))?;

    let parsed = jsonc_parser::parse_to_serde_value(&content, &ParseOptions::default())
        .map_err(|e| format!("Failed to parse JSON: {e}"))?;

    Ok(parsed.unwrap_or_else(|| Value::Object(serde_json::Map::new())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::backend::I18nBackend;
    use crate::test_utils::memory_backend;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[googletest::test]
    fn test_load_translation_file_allows_comments() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "en.json",
            r#"{
  // greeting shown on the front page
  "en": { "hello": "Hello", },
}"#,
        );

        let document = load_translation_file(&temp_dir.path().join("en.json")).unwrap();

        expect_that!(document["en"]["hello"].as_str(), some(eq("Hello")));
    }

    #[googletest::test]
    fn test_load_translation_file_empty_is_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "empty.json", "");

        let document = load_translation_file(&temp_dir.path().join("empty.json")).unwrap();

        expect_that!(document.as_object().map(serde_json::Map::len), some(eq(0)));
    }

    #[googletest::test]
    fn test_import_dir_stores_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "config/locales/en.json", r#"{"en": {"a": {"b": "x"}, "n": 1}}"#);
        write(temp_dir.path(), "config/locales/fr.json", r#"{"fr": {"a": {"b": "y"}}}"#);
        write(temp_dir.path(), "config/locales/broken.json", "{ not json");
        write(temp_dir.path(), "config/locales/list.json", r#"["not", "a", "tree"]"#);
        write(temp_dir.path(), "package.json", r#"{"name": {"x": "ignored"}}"#);
        write(temp_dir.path(), "node_modules/lib/locales/de.json", r#"{"de": {"a": "z"}}"#);

        let backend = memory_backend();
        let importer = TranslationImporter::new(&backend, StoreOptions::default());
        let summary = importer.import_dir(temp_dir.path(), &BackendSettings::default()).unwrap();

        expect_that!(summary, eq(ImportSummary { files: 2, entries: 3, skipped: 2 }));
        let locales: Vec<String> = backend.available_locales().unwrap().into_iter().collect();
        expect_that!(locales, elements_are![eq("en"), eq("fr")]);
    }

    #[googletest::test]
    fn test_import_dir_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = BackendSettings::default();
        settings.translation_files.include_patterns = vec!["**/*.{json".to_string()];

        let backend = memory_backend();
        let importer = TranslationImporter::new(&backend, StoreOptions::default());
        let result = importer.import_dir(temp_dir.path(), &settings);

        expect_that!(matches!(result, Err(ImportError::Matcher(_))), eq(true));
    }
}
