//! Configuration schema (schemasheet.toml + environment)
//!
//! Values come from an optional TOML file and are then overlaid with the
//! `DB_*`, `CSV_DIRECTORY` and `GOOGLE_SERVICE_ACCOUNT_*` environment
//! variables. The environment always wins.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_DATABASE: &str = "DB_DATABASE";
pub const ENV_DB_USERNAME: &str = "DB_USERNAME";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_CSV_DIRECTORY: &str = "CSV_DIRECTORY";
pub const ENV_SERVICE_ACCOUNT_KEY_FILE: &str = "GOOGLE_SERVICE_ACCOUNT_KEY_FILE";
pub const ENV_SERVICE_ACCOUNT_EMAIL: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";

/// MySQL connection settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Schema to document
    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Check that the settings are usable for a connection
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_empty() {
            return Err(ConfigError::Missing(ENV_DB_DATABASE));
        }
        if self.host.is_empty() {
            return Err(ConfigError::Missing(ENV_DB_HOST));
        }
        Ok(())
    }

    /// `user@host:port/database`, never includes the password
    pub fn display_target(&self) -> String {
        format!("{}@{}:{}/{}", self.username, self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Export (MySQL → CSV) settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output directory, defaults to the database name
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Abort on the first table that fails to read
    #[serde(default)]
    pub fail_fast: bool,
}

/// Import (CSV → Google Sheets) settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Directory holding one CSV per table
    #[serde(default)]
    pub csv_directory: Option<PathBuf>,

    /// Service account JSON key
    #[serde(default)]
    pub service_account_key_file: Option<PathBuf>,

    /// Identity granted writer access on the new spreadsheet
    #[serde(default)]
    pub share_with: Option<String>,

    /// Minimum pause between per-sheet batch updates
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    /// Retries on 429 / 5xx before giving up on a request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_batch_interval_ms() -> u64 {
    3000
}

fn default_max_retries() -> u32 {
    5
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_directory: None,
            service_account_key_file: None,
            share_with: None,
            batch_interval_ms: default_batch_interval_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl ImportConfig {
    pub fn require_csv_directory(&self) -> Result<&PathBuf, ConfigError> {
        self.csv_directory.as_ref().ok_or(ConfigError::Missing(ENV_CSV_DIRECTORY))
    }

    pub fn require_key_file(&self) -> Result<&PathBuf, ConfigError> {
        self.service_account_key_file
            .as_ref()
            .ok_or(ConfigError::Missing(ENV_SERVICE_ACCOUNT_KEY_FILE))
    }

    pub fn require_share_with(&self) -> Result<&str, ConfigError> {
        self.share_with
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(ENV_SERVICE_ACCOUNT_EMAIL))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub import: ImportConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Overlay the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment lookup
    ///
    /// Empty variables are treated as unset.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = get(ENV_DB_HOST) {
            self.database.host = host;
        }
        if let Some(port) = get(ENV_DB_PORT) {
            self.database.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_DB_PORT,
                value: port.clone(),
            })?;
        }
        if let Some(database) = get(ENV_DB_DATABASE) {
            self.database.database = database;
        }
        if let Some(username) = get(ENV_DB_USERNAME) {
            self.database.username = username;
        }
        if let Some(password) = get(ENV_DB_PASSWORD) {
            self.database.password = password;
        }
        if let Some(dir) = get(ENV_CSV_DIRECTORY) {
            self.import.csv_directory = Some(PathBuf::from(dir));
        }
        if let Some(key_file) = get(ENV_SERVICE_ACCOUNT_KEY_FILE) {
            self.import.service_account_key_file = Some(PathBuf::from(key_file));
        }
        if let Some(email) = get(ENV_SERVICE_ACCOUNT_EMAIL) {
            self.import.share_with = Some(email);
        }

        Ok(self)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}
