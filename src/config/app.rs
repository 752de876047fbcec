//! Application settings loaded from `config.toml`.
//!
//! Every setting has a default, so the file is optional. `LEDGER_PATH` in the
//! environment (or `.env`) takes precedence over the file's `ledger_path`.

use crate::{
    core::report::DEFAULT_HISTORY_LIMIT,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Where the ledger log lives unless configured otherwise.
pub const DEFAULT_LEDGER_PATH: &str = "data/ledger.csv";

/// Settings shared by the whole bot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Path of the CSV ledger log
    pub ledger_path: PathBuf,
    /// How many entries `/history` shows
    pub history_limit: usize,
    /// Prefix for text commands (slash commands work regardless)
    pub command_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            history_limit: DEFAULT_HISTORY_LIMIT,
            command_prefix: "/".to_string(),
        }
    }
}

impl AppConfig {
    /// Replaces the ledger path when an override is present and non-blank.
    #[must_use]
    pub fn with_ledger_override(mut self, ledger_path: Option<String>) -> Self {
        if let Some(path) = ledger_path.filter(|p| !p.trim().is_empty()) {
            debug!("Ledger path overridden to {}", path);
            self.ledger_path = PathBuf::from(path);
        }
        self
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML is malformed or has unknown keys.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file; a missing file yields the defaults.
///
/// # Errors
/// Returns `Error::Config` if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path);
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No configuration file at {:?}, using defaults", path);
            Ok(AppConfig::default())
        }
        Err(e) => Err(Error::Config {
            message: format!("Failed to read config file {}: {e}", path.display()),
        }),
    }
}

/// Loads the configuration the binary runs with.
///
/// The file comes from `CONFIG_PATH` (default `./config.toml`), then `LEDGER_PATH`
/// is applied on top.
pub fn load_app_configuration() -> Result<AppConfig> {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&config_path)?.with_ledger_override(std::env::var("LEDGER_PATH").ok());
    info!(
        "Configuration loaded: ledger at {}, history limit {}",
        config.ledger_path.display(),
        config.history_limit
    );
    Ok(config)
}
