//! File pattern matcher for translation files.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::BackendSettings;

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid translation file pattern '{pattern}': {source}")]
    InvalidTranslationPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Matches files against the configured translation file patterns.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    root: PathBuf,
    include_set: GlobSet,
    exclude_set: GlobSet,
}

impl FileMatcher {
    /// Creates a new matcher from settings.
    pub fn new(root: PathBuf, settings: &BackendSettings) -> Result<Self, MatcherError> {
        let include_set = Self::build_glob_set(
            &settings.translation_files.include_patterns,
            |pattern, source| MatcherError::InvalidTranslationPattern { pattern, source },
        )?;

        let exclude_set = Self::build_glob_set(
            &settings.translation_files.exclude_patterns,
            |pattern, source| MatcherError::InvalidExcludePattern { pattern, source },
        )?;

        Ok(Self { root, include_set, exclude_set })
    }

    fn build_glob_set<F>(patterns: &[String], make_error: F) -> Result<GlobSet, MatcherError>
    where
        F: Fn(String, globset::Error) -> MatcherError,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| make_error(pattern.clone(), e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if the path, relative to the root, matches
    /// `translationFiles.includePatterns` but not
    /// `translationFiles.excludePatterns`.
    #[must_use]
    pub fn is_translation_file(&self, relative_path: &Path) -> bool {
        self.include_set.is_match(relative_path) && !self.exclude_set.is_match(relative_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::TranslationFilesConfig;

    fn create_settings(include: &[&str], exclude: &[&str]) -> BackendSettings {
        BackendSettings {
            translation_files: TranslationFilesConfig {
                include_patterns: include.iter().copied().map(String::from).collect(),
                exclude_patterns: exclude.iter().copied().map(String::from).collect(),
            },
            ..BackendSettings::default()
        }
    }

    #[rstest]
    fn is_translation_file_with_default_pattern() {
        let settings = BackendSettings::default();
        let matcher = FileMatcher::new(PathBuf::from("/app"), &settings).expect("valid patterns");

        assert!(matcher.is_translation_file(Path::new("config/locales/en.json")));
        assert!(matcher.is_translation_file(Path::new("locales/fr/common.json")));

        assert!(!matcher.is_translation_file(Path::new("package.json")));
        assert!(!matcher.is_translation_file(Path::new("node_modules/x/locales/en.json")));
    }

    #[rstest]
    fn is_translation_file_with_exclude() {
        let settings = create_settings(&["**/i18n/**/*.json"], &["**/legacy/**"]);
        let matcher = FileMatcher::new(PathBuf::from("/app"), &settings).expect("valid patterns");

        assert!(matcher.is_translation_file(Path::new("i18n/en.json")));
        assert!(!matcher.is_translation_file(Path::new("legacy/i18n/en.json")));
    }

    #[rstest]
    fn new_with_invalid_translation_pattern() {
        let settings = create_settings(&["**/*.{json"], &[]);

        let result = FileMatcher::new(PathBuf::from("/app"), &settings);

        assert!(matches!(result, Err(MatcherError::InvalidTranslationPattern { .. })));
    }

    #[rstest]
    fn new_with_invalid_exclude_pattern() {
        let settings = create_settings(&["**/*.json"], &["[invalid"]);

        let result = FileMatcher::new(PathBuf::from("/app"), &settings);

        assert!(matches!(result, Err(MatcherError::InvalidExcludePattern { .. })));
    }

    #[rstest]
    fn root_accessor() {
        let settings = BackendSettings::default();
        let matcher = FileMatcher::new(PathBuf::from("/app"), &settings).expect("valid patterns");

        assert_eq!(matcher.root(), Path::new("/app"));
    }
}
