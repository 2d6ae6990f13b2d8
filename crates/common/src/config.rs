//! Environment-scoped configuration
//!
//! One TOML file describes every environment a scenario can target:
//!
//! ```toml
//! default_environment = "local"
//!
//! [environments.local]
//! base_url = "http://localhost:3000"
//!
//! [environments.local.pages]
//! register_student_page = "/register/student"
//! landing_page = "/landing"
//! login_page = "/login"
//!
//! [environments.local.users.student]
//! username = "student@example.org"
//! password_env = "FORMPILOT_STUDENT_PASSWORD"
//! ```
//!
//! `FORMPILOT_BASE_URL` and `FORMPILOT_PAGE_<NAME>` override the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::registry::{Location, PageRegistry};
use crate::types::Credentials;

const ENV_PREFIX: &str = "FORMPILOT_";
const PAGE_PREFIX: &str = "FORMPILOT_PAGE_";

/// Raw configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Environment used when none is requested
    pub default_environment: Option<String>,

    /// Environment sections keyed by name
    pub environments: BTreeMap<String, EnvironmentSection>,
}

/// One `[environments.<name>]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    pub base_url: Option<String>,
    pub pages: BTreeMap<String, String>,
    pub users: BTreeMap<String, UserFixture>,
    pub timeouts: Timeouts,
    pub login: LoginSelectors,
    pub settings: SettingsSelectors,
}

/// A named user whose credentials scenarios can log in with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFixture {
    pub username: String,

    /// Inline password (test environments only)
    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the password
    #[serde(default)]
    pub password_env: Option<String>,
}

/// Per-step timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Page load and post-submit navigation
    pub navigation_ms: u64,

    /// Element appearance before an interaction
    pub element_ms: u64,

    /// Window watched to prove a submission did not navigate
    pub settle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 30_000,
            element_ms: 4_000,
            settle_ms: 2_000,
        }
    }
}

impl Timeouts {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Login form selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    /// Logical page holding the login form
    pub page: String,
    pub username: String,
    pub password: String,
    pub submit: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            page: "login_page".to_string(),
            username: "#username".to_string(),
            password: "#password".to_string(),
            submit: "#login_button".to_string(),
        }
    }
}

/// Account settings selectors used by teardown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSelectors {
    pub personal_settings: String,
    pub delete_profile: String,
    pub confirm: String,

    /// After deleting, prove the account can no longer log in
    pub verify_deletion: bool,
}

impl Default for SettingsSelectors {
    fn default() -> Self {
        Self {
            personal_settings: "#personal_settings".to_string(),
            delete_profile: "#delete_profile_button".to_string(),
            confirm: "#modal-yes-button".to_string(),
            verify_deletion: true,
        }
    }
}

/// Configuration resolved for a single environment
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub environment: String,
    pub registry: PageRegistry,
    pub users: BTreeMap<String, UserFixture>,
    pub timeouts: Timeouts,
    pub login: LoginSelectors,
    pub settings: SettingsSelectors,
}

impl EnvConfig {
    /// Load configuration from file and the process environment.
    ///
    /// A missing file is treated as empty, so a run can be configured from
    /// `FORMPILOT_*` variables alone.
    pub fn load(path: &Path, environment: Option<&str>) -> Result<Self> {
        let file = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            debug!("No config file at {}, using environment only", path.display());
            ConfigFile::default()
        };

        Self::from_parts(file, environment, std::env::vars())
    }

    /// Parse configuration from a TOML string without touching the environment
    pub fn from_toml(content: &str, environment: Option<&str>) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::from_parts(file, environment, std::iter::empty())
    }

    /// Resolve one environment from a parsed file plus override variables
    pub fn from_parts<I>(mut file: ConfigFile, environment: Option<&str>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();

        let name = environment
            .map(str::to_string)
            .or_else(|| vars.get("FORMPILOT_ENV").cloned())
            .or_else(|| file.default_environment.clone())
            .unwrap_or_else(|| crate::DEFAULT_ENVIRONMENT.to_string());

        let mut section = match file.environments.remove(&name) {
            Some(section) => section,
            None if file.environments.is_empty() => EnvironmentSection::default(),
            None => return Err(ConfigError::UnknownEnvironment { name }),
        };

        if let Some(base_url) = vars.get("FORMPILOT_BASE_URL") {
            section.base_url = Some(base_url.clone());
        }
        for (key, value) in &vars {
            if let Some(page) = key.strip_prefix(PAGE_PREFIX) {
                section.pages.insert(page.to_lowercase(), value.clone());
            }
        }

        let base_url = section.base_url.ok_or_else(|| {
            ConfigError::InvalidConfig(format!(
                "environment '{}' has no base_url (set it in the file or FORMPILOT_BASE_URL)",
                name
            ))
        })?;

        let pages = section
            .pages
            .into_iter()
            .map(|(k, v)| (k, Location::new(v)))
            .collect();
        let registry = PageRegistry::new(base_url, pages)?;

        debug!(
            "Loaded environment '{}' with {} page(s)",
            name,
            registry.len()
        );

        Ok(Self {
            environment: name,
            registry,
            users: section.users,
            timeouts: section.timeouts,
            login: section.login,
            settings: section.settings,
        })
    }

    /// Credentials of the named user fixture
    pub fn credentials_for(&self, user: &str) -> Result<Credentials> {
        let fixture = self.users.get(user).ok_or_else(|| ConfigError::UnknownUser {
            name: user.to_string(),
        })?;

        let password = match (&fixture.password, &fixture.password_env) {
            (Some(password), _) => password.clone(),
            (None, Some(var)) => std::env::var(var).map_err(|_| {
                ConfigError::InvalidConfig(format!(
                    "user '{}' reads its password from ${}, which is not set",
                    user, var
                ))
            })?,
            (None, None) => {
                return Err(ConfigError::InvalidConfig(format!(
                    "user '{}' has neither password nor password_env",
                    user
                )))
            }
        };

        Ok(Credentials::new(fixture.username.clone(), password))
    }
}
