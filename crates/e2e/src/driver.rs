//! Browser automation boundary
//!
//! Scenarios only ever ask a browser for a handful of primitives: load a
//! URL, report where it is, wait for an element, and type, select, check or
//! click. Everything else (transport, process lifecycle) belongs to the
//! implementation behind [`BrowserDriver`].

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a browser implementation
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element '{selector}' not found")]
    ElementNotFound { selector: String },

    #[error("element '{selector}' is not interactable: {reason}")]
    NotInteractable { selector: String, reason: String },

    #[error("wait for {condition} timed out after {timeout:?}")]
    Timeout { condition: String, timeout: Duration },

    #[error("browser protocol error: {0}")]
    Protocol(String),

    #[error("browser session is already closed")]
    Closed,
}

pub type DriverResult<T> = Result<T, DriverError>;

/// One browser session.
///
/// Each call is a single suspending step; callers never issue two calls on
/// the same session concurrently.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Start loading `url` in the current tab
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Block until the current document reports it has finished loading
    async fn wait_for_load(&self, timeout: Duration) -> DriverResult<()>;

    /// URL of the current document
    async fn current_url(&self) -> DriverResult<String>;

    /// Block until `selector` matches an element, or time out
    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> DriverResult<()>;

    async fn type_text(&self, selector: &str, text: &str) -> DriverResult<()>;

    /// Choose the option whose value or visible text equals `value`
    async fn select_option(&self, selector: &str, value: &str) -> DriverResult<()>;

    /// Make sure a checkbox is checked; already-checked boxes are left alone
    async fn check(&self, selector: &str) -> DriverResult<()>;

    async fn click(&self, selector: &str) -> DriverResult<()>;

    /// Close the session. Further calls fail with [`DriverError::Closed`].
    async fn shutdown(&self) -> DriverResult<()> {
        Ok(())
    }
}

/// Opens a fresh, independent browser session per scenario
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    async fn launch(&self) -> DriverResult<Box<dyn BrowserDriver>>;
}
