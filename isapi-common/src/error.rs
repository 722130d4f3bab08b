//! Common error types for the ISAPI mock

use thiserror::Error;

/// Common result type for ISAPI mock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the ISAPI mock crates
#[derive(Error, Debug)]
pub enum Error {
    /// TOML configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
