use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::store::RedisAddress;

/// Settings file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".i18n-redis.json";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "addresses[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendSettings {
    /// Store addresses (`host[:port][/db][/namespace]`).
    /// More than one address configures a cluster.
    pub addresses: Vec<String>,

    /// Escape separators inside segment names when storing.
    pub escape: bool,

    /// Key separator used by lookups.
    pub separator: String,

    pub translation_files: TranslationFilesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl BackendSettings {
    /// Reads [`CONFIG_FILE_NAME`] from `dir` and validates it.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - The file cannot be read or is not valid JSON
    /// - The settings fail [`Self::validate`]
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        let settings = if config_path.exists() {
            tracing::debug!("Loading configuration from: {:?}", config_path);
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?
        } else {
            tracing::debug!("Configuration file not found, using defaults: {:?}", config_path);
            Self::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;
        Ok(settings)
    }

    /// # Errors
    /// - No address, or an address that does not parse
    /// - Invalid separator
    /// - Invalid glob pattern
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.addresses.is_empty() {
            errors.push(ValidationError::new(
                "addresses",
                "At least one address is required. Example: [\"localhost:6379/0\"]",
            ));
        }

        for (index, address) in self.addresses.iter().enumerate() {
            if let Err(e) = RedisAddress::parse(address) {
                errors.push(ValidationError::new(format!("addresses[{index}]"), e.to_string()));
            }
        }

        if self.separator.is_empty() {
            errors.push(ValidationError::new(
                "separator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.translation_files.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.includePatterns",
                "At least one pattern is required. Example: [\"**/locales/**/*.json\"]",
            ));
        }

        for (field, patterns) in [
            ("translationFiles.includePatterns", &self.translation_files.include_patterns),
            ("translationFiles.excludePatterns", &self.translation_files.exclude_patterns),
        ] {
            for (index, pattern) in patterns.iter().enumerate() {
                if let Err(e) = globset::Glob::new(pattern) {
                    errors.push(ValidationError::new(
                        format!("{field}[{index}]"),
                        format!("Invalid glob pattern '{pattern}': {e}"),
                    ));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Separator to pass to lookups; `None` when it is the default.
    #[must_use]
    pub fn lookup_separator(&self) -> Option<String> {
        (self.separator != crate::flatten::FLATTEN_SEPARATOR).then(|| self.separator.clone())
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            addresses: vec!["localhost:6379/0".to_string()],
            escape: true,
            separator: ".".to_string(),
            translation_files: TranslationFilesConfig::default(),
        }
    }
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/locales/**/*.json".to_string()],
            exclude_patterns: vec!["node_modules/**".to_string()],
        }
    }
}
