//! Formpilot Common Library
//!
//! Environment-scoped configuration, the logical page registry and the
//! credential fixtures shared by the scenario runner and the CLI.

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use config::{EnvConfig, LoginSelectors, SettingsSelectors, Timeouts, UserFixture};
pub use error::{ConfigError, Result};
pub use registry::{Location, PageRegistry};
pub use types::Credentials;

/// Formpilot version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment selected when neither the caller nor `FORMPILOT_ENV` names one
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Default configuration file, relative to the working directory
pub fn default_config_path() -> std::path::PathBuf {
    std::path::PathBuf::from("formpilot.toml")
}
