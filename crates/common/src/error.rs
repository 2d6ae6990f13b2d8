//! Error types for Formpilot configuration

use thiserror::Error;

/// Result type alias using the configuration error
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown page: '{name}' is not in the page registry")]
    UnknownPage { name: String },

    #[error("Unknown user fixture: '{name}'")]
    UnknownUser { name: String },

    #[error("Environment '{name}' is not defined in the configuration")]
    UnknownEnvironment { name: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
