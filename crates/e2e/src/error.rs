//! Error types for sign-up scenarios
//!
//! Every failure a scenario can surface maps to one of the kinds below and
//! carries the selector or page name of the step that raised it.

use std::time::Duration;
use thiserror::Error;

use formpilot_common::ConfigError;

use crate::driver::DriverError;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Unknown page: '{name}' is not in the page registry")]
    UnknownPage { name: String },

    #[error("Navigation to {target} did not complete within {timeout:?}")]
    NavigationTimeout { target: String, timeout: Duration },

    #[error("Navigation to {target} failed: {reason}")]
    NavigationFailed { target: String, reason: String },

    #[error("Field '{selector}' could not be used: {reason}")]
    FieldInteraction { selector: String, reason: String },

    #[error("Login as '{username}' was rejected: {reason}")]
    Authentication { username: String, reason: String },

    #[error("Assertion failed: expected location {expected}, observed {actual}")]
    Assertion { expected: String, actual: String },

    #[error("Teardown step '{step}' failed: {reason}")]
    Teardown { step: String, reason: String },

    #[error("Application at {url} is not reachable after {attempts} attempt(s)")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Configuration error: {0}")]
    Config(#[source] ConfigError),

    #[error("Browser error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<ConfigError> for E2eError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::UnknownPage { name } => E2eError::UnknownPage { name },
            other => E2eError::Config(other),
        }
    }
}

impl E2eError {
    /// Stable name of the error kind, as recorded in reports
    pub fn kind(&self) -> &'static str {
        match self {
            E2eError::UnknownPage { .. } => "UnknownPageError",
            E2eError::NavigationTimeout { .. } => "NavigationTimeoutError",
            E2eError::NavigationFailed { .. } => "NavigationError",
            E2eError::FieldInteraction { .. } => "FieldInteractionError",
            E2eError::Authentication { .. } => "AuthenticationError",
            E2eError::Assertion { .. } => "AssertionError",
            E2eError::Teardown { .. } => "TeardownError",
            E2eError::AppUnreachable { .. } => "AppUnreachableError",
            E2eError::ScenarioParse(_) | E2eError::Yaml(_) => "ScenarioParseError",
            E2eError::Config(_) => "ConfigError",
            E2eError::Driver(_) => "BrowserError",
            E2eError::Io(_) | E2eError::Json(_) | E2eError::Http(_) => "IoError",
        }
    }

    /// Wrap any error raised while tearing down under `step`
    pub(crate) fn into_teardown(self, step: &str) -> Self {
        match self {
            E2eError::Teardown { .. } => self,
            other => E2eError::Teardown {
                step: step.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_page_config_error_keeps_its_kind() {
        let err: E2eError = ConfigError::UnknownPage {
            name: "nowhere".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "UnknownPageError");
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_other_config_errors_wrap() {
        let err: E2eError = ConfigError::InvalidConfig("bad".to_string()).into();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn test_into_teardown_names_the_step() {
        let err = E2eError::FieldInteraction {
            selector: "#delete_profile_button".to_string(),
            reason: "element not found".to_string(),
        }
        .into_teardown("delete_profile");
        match err {
            E2eError::Teardown { step, reason } => {
                assert_eq!(step, "delete_profile");
                assert!(reason.contains("#delete_profile_button"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
