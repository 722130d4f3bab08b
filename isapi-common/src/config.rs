//! Configuration loading for the ISAPI mock
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments
//! 2. Environment variables (`ISAPI_MOCK_*`, resolved by the binary's CLI parser)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing default config file is not an error: the mock starts with
//! built-in defaults. A config file that is named explicitly, or that exists
//! at the default location, must parse.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::api::AuthMode;
use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin123";
pub const DEFAULT_REALM: &str = "DS-2CD2032";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub realm: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_mode: Option<AuthMode>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

impl TomlConfig {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub realm: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_mode: Option<AuthMode>,
    pub log_level: Option<String>,
}

/// Fully resolved mock configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub host: String,
    pub port: u16,
    pub realm: String,
    pub username: String,
    /// Only consulted by full digest verification
    pub password: String,
    pub auth_mode: AuthMode,
    pub log_level: String,
    /// Config file the values were read from, if any
    pub source: Option<PathBuf>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            realm: DEFAULT_REALM.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            auth_mode: AuthMode::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            source: None,
        }
    }
}

impl MockConfig {
    /// Resolve configuration from overrides, the TOML file and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let path = match &overrides.config_file {
            Some(path) => Some(path.clone()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let file = match &path {
            Some(path) => TomlConfig::load(path)?,
            None => TomlConfig::default(),
        };

        Ok(Self {
            source: path,
            ..Self::merge(overrides, file)
        })
    }

    /// Layer overrides over file values over defaults
    pub fn merge(overrides: &ConfigOverrides, file: TomlConfig) -> Self {
        let defaults = Self::default();

        Self {
            host: overrides.host.clone().or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            realm: overrides.realm.clone().or(file.realm).unwrap_or(defaults.realm),
            username: overrides
                .username
                .clone()
                .or(file.username)
                .unwrap_or(defaults.username),
            password: overrides
                .password
                .clone()
                .or(file.password)
                .unwrap_or(defaults.password),
            auth_mode: overrides
                .auth_mode
                .or(file.auth_mode)
                .unwrap_or(defaults.auth_mode),
            log_level: overrides
                .log_level
                .clone()
                .or(file.logging.level)
                .unwrap_or(defaults.log_level),
            source: None,
        }
    }

    /// `host:port` string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Platform config file location, e.g. `~/.config/isapi-mock/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("isapi-mock").join("config.toml"))
}
