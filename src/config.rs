//! Backend configuration
/// Translation file pattern matcher
mod matcher;
/// Settings types, loading and validation
mod types;

pub use matcher::{
    FileMatcher,
    MatcherError,
};
pub use types::{
    BackendSettings,
    CONFIG_FILE_NAME,
    ConfigError,
    TranslationFilesConfig,
    ValidationError,
};
