//! Command line entry point.
//!
//! ```text
//! i18n-redis import [dir]          import translation files under dir
//! i18n-redis lookup <locale> <key> print a translation as JSON
//! i18n-redis locales               list stored locales
//! ```

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use i18n_redis_backend::config::{
    BackendSettings,
    ConfigError,
};
use i18n_redis_backend::importer::{
    ImportError,
    TranslationImporter,
};
use i18n_redis_backend::{
    BackendError,
    I18nBackend,
    LookupOptions,
    RedisBackend,
    StoreOptions,
};
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: i18n-redis <import [dir] | lookup <locale> <key> | locales>";

#[derive(Error, Debug)]
enum CliError {
    #[error("invalid arguments")]
    Usage,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => code,
        Err(CliError::Usage) => {
            let _ = writeln!(std::io::stderr(), "{USAGE}");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<ExitCode, CliError> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["import"] => import(Path::new(".")),
        ["import", dir] => import(Path::new(dir)),
        ["lookup", locale, key] => lookup(locale, key),
        ["locales"] => locales(),
        _ => Err(CliError::Usage),
    }
}

/// Loads settings from `root` and connects to the configured store.
fn connect(root: &Path) -> Result<(BackendSettings, RedisBackend), CliError> {
    let settings = BackendSettings::load(root)?;
    let backend = RedisBackend::connect(settings.addresses.as_slice())?;
    Ok((settings, backend))
}

fn import(dir: &Path) -> Result<ExitCode, CliError> {
    let (settings, backend) = connect(dir)?;

    let importer = TranslationImporter::new(&backend, StoreOptions { escape: settings.escape });
    let summary = importer.import_dir(dir, &settings)?;

    writeln!(
        std::io::stdout(),
        "imported {} entries from {} files ({} skipped)",
        summary.entries,
        summary.files,
        summary.skipped
    )?;
    Ok(ExitCode::SUCCESS)
}

fn lookup(locale: &str, key: &str) -> Result<ExitCode, CliError> {
    let (settings, backend) = connect(&std::env::current_dir()?)?;
    let options = LookupOptions { separator: settings.lookup_separator() };

    let Some(result) = backend.lookup(locale, key, &[], &options)? else {
        writeln!(std::io::stderr(), "translation missing: {locale}.{key}")?;
        return Ok(ExitCode::FAILURE);
    };

    writeln!(std::io::stdout(), "{}", Value::from(&result))?;
    Ok(ExitCode::SUCCESS)
}

fn locales() -> Result<ExitCode, CliError> {
    let (_, backend) = connect(&std::env::current_dir()?)?;

    let mut stdout = std::io::stdout().lock();
    for locale in backend.available_locales()? {
        writeln!(stdout, "{locale}")?;
    }
    Ok(ExitCode::SUCCESS)
}
