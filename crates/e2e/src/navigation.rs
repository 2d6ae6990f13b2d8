//! Navigation helpers
//!
//! Scenarios name pages by logical key (`register_student_page`) or, when a
//! page has no key yet, by literal path. [`Navigator::go_to_page`] resolves
//! either against the environment's registry and blocks until the browser
//! reports the document has loaded.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use formpilot_common::EnvConfig;

use crate::driver::{BrowserDriver, DriverError};
use crate::error::{E2eError, E2eResult};

pub const LOGIN_PAGE: &str = "login_page";
pub const LANDING_PAGE: &str = "landing_page";
pub const REGISTER_STUDENT_PAGE: &str = "register_student_page";
pub const REGISTER_TEACHER_PAGE: &str = "register_teacher_page";

/// Where to navigate: a registry key or a literal location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageTarget {
    Name(String),
    Location(String),
}

impl PageTarget {
    /// Classify a scenario string.
    ///
    /// Anything that looks like a path or URL (contains `/` or `:`) is a
    /// literal location; everything else is a registry key.
    pub fn parse(raw: &str) -> Self {
        if raw.contains('/') || raw.contains(':') {
            PageTarget::Location(raw.to_string())
        } else {
            PageTarget::Name(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageTarget::Name(s) | PageTarget::Location(s) => s,
        }
    }
}

impl From<String> for PageTarget {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for PageTarget {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<PageTarget> for String {
    fn from(target: PageTarget) -> Self {
        match target {
            PageTarget::Name(s) | PageTarget::Location(s) => s,
        }
    }
}

impl std::fmt::Display for PageTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The URL the browser ended up on after a navigation or submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationOutcome {
    pub url: String,
}

impl NavigationOutcome {
    /// Containment check: query strings and fragments after the expected
    /// location are tolerated.
    pub fn reached(&self, expected_url: &str) -> bool {
        self.url.contains(expected_url)
    }
}

/// Drives one browser session between pages of one environment
#[derive(Clone, Copy)]
pub struct Navigator<'a> {
    driver: &'a dyn BrowserDriver,
    config: &'a EnvConfig,
}

impl<'a> Navigator<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, config: &'a EnvConfig) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &'a dyn BrowserDriver {
        self.driver
    }

    pub fn config(&self) -> &'a EnvConfig {
        self.config
    }

    /// Full URL for a target, without touching the browser
    pub fn url_for(&self, target: &PageTarget) -> E2eResult<String> {
        let registry = &self.config.registry;
        match target {
            PageTarget::Name(name) => Ok(registry.url_for(name)?),
            PageTarget::Location(location) => Ok(registry.url_for_location(location)),
        }
    }

    /// Load `target` and wait for the document to finish loading.
    ///
    /// An unknown page name fails before the browser is asked to do anything.
    pub async fn go_to_page(&self, target: impl Into<PageTarget>) -> E2eResult<()> {
        let target = target.into();
        let url = self.url_for(&target)?;
        let timeout = self.config.timeouts.navigation();

        info!("Navigating to {} ({})", target, url);

        self.driver
            .navigate(&url)
            .await
            .map_err(|e| navigation_error(&url, timeout, e))?;

        self.driver
            .wait_for_load(timeout)
            .await
            .map_err(|e| navigation_error(&url, timeout, e))?;

        debug!("Loaded {}", url);
        Ok(())
    }

    pub async fn go_to_login(&self) -> E2eResult<()> {
        self.go_to_page(PageTarget::Name(self.config.login.page.clone()))
            .await
    }

    pub async fn go_to_register_student(&self) -> E2eResult<()> {
        self.go_to_page(PageTarget::Name(REGISTER_STUDENT_PAGE.to_string()))
            .await
    }

    pub async fn go_to_register_teacher(&self) -> E2eResult<()> {
        self.go_to_page(PageTarget::Name(REGISTER_TEACHER_PAGE.to_string()))
            .await
    }

    pub async fn go_to_landing(&self) -> E2eResult<()> {
        self.go_to_page(PageTarget::Name(LANDING_PAGE.to_string()))
            .await
    }

    /// Where the browser is right now
    pub async fn current_outcome(&self) -> E2eResult<NavigationOutcome> {
        let url = self.driver.current_url().await?;
        Ok(NavigationOutcome { url })
    }
}

fn navigation_error(url: &str, timeout: std::time::Duration, e: DriverError) -> E2eError {
    match e {
        DriverError::Timeout { .. } => E2eError::NavigationTimeout {
            target: url.to_string(),
            timeout,
        },
        DriverError::Navigation { reason, .. } => E2eError::NavigationFailed {
            target: url.to_string(),
            reason,
        },
        other => E2eError::Driver(other),
    }
}
