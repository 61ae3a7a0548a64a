//! Application configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:8080"
//!
//! [storage]
//! sqlite_path = "renovation.db"
//!
//! [calendar]
//! working_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
//! holidays = ["2024-12-25"]
//!
//! [display]
//! currency_symbol = "R$"
//! ```

use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::format::CURRENCY_SYMBOL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "renovation.toml";
pub const CONFIG_PATH_ENV: &str = "RENOVATION_CONFIG";
pub const HTTP_ADDR_ENV: &str = "RENOVATION_HTTP_ADDR";
pub const DB_PATH_ENV: &str = "RENOVATION_DB_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub calendar: WorkCalendarConfig,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_addr")]
    pub addr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("renovation.db")
}

fn default_currency_symbol() -> String {
    CURRENCY_SYMBOL.to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            sqlite_path: default_sqlite_path(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the file named by `RENOVATION_CONFIG`, else `renovation.toml` in
    /// the working directory when it exists, else defaults; then applies the
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `RENOVATION_HTTP_ADDR` / `RENOVATION_DB_PATH` style overrides
    /// from any key lookup. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(addr) = lookup(HTTP_ADDR_ENV) {
            tracing::debug!(%addr, "http address overridden from environment");
            self.server.addr = addr;
        }
        if let Some(path) = lookup(DB_PATH_ENV) {
            tracing::debug!(%path, "sqlite path overridden from environment");
            self.storage.sqlite_path = PathBuf::from(path);
        }
    }

    pub fn work_calendar(&self) -> WorkCalendar {
        WorkCalendar::from_config(&self.calendar)
    }
}
