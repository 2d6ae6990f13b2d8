//! In-memory sign-up site behind the `BrowserDriver` trait.
//!
//! Models just enough of the application under test to drive the whole
//! core without a browser: a student registration form, a login form, a
//! landing page and a personal-settings page with a delete-profile modal.
//! Accounts live in state shared by every session the launcher opens.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use formpilot_common::EnvConfig;
use formpilot_e2e::driver::{BrowserDriver, DriverError, DriverLauncher, DriverResult};

pub const BASE_URL: &str = "http://app.test";

pub const PASSWORD: &str = r#"some_password"!#@'( )*$%'123""#;

pub fn env_config() -> EnvConfig {
    EnvConfig::from_toml(
        r#"
[environments.local]
base_url = "http://app.test"

[environments.local.pages]
register_student_page = "/register/student"
register_teacher_page = "/register/teacher"
landing_page = "/landing"
login_page = "/login"
slow_page = "/slow"

[environments.local.users.student]
username = "existing"
password = "existing-pw"

[environments.local.timeouts]
navigation_ms = 200
element_ms = 50
settle_ms = 60
"#,
        None,
    )
    .expect("test config parses")
}

#[derive(Debug, Default)]
struct SiteState {
    accounts: BTreeMap<String, String>,
    /// Every URL any session navigated to, in order
    navigations: Vec<String>,
    /// Selectors that no longer exist, to simulate a changed UI contract
    removed: BTreeSet<String>,
    /// Delete confirmation does nothing, to simulate a broken teardown
    delete_broken: bool,
    /// Clicking one of these kills the browser session
    crash_on_click: BTreeSet<String>,
}

/// The application under test; cheap to clone, all clones share accounts
#[derive(Clone, Default)]
pub struct MockSite {
    state: Arc<Mutex<SiteState>>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, username: &str, password: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(username.to_string(), password.to_string());
        self
    }

    pub fn remove_element(&self, selector: &str) {
        self.state.lock().unwrap().removed.insert(selector.to_string());
    }

    pub fn break_delete(&self) {
        self.state.lock().unwrap().delete_broken = true;
    }

    pub fn crash_on_click(&self, selector: &str) {
        self.state
            .lock()
            .unwrap()
            .crash_on_click
            .insert(selector.to_string());
    }

    pub fn account_exists(&self, username: &str) -> bool {
        self.state.lock().unwrap().accounts.contains_key(username)
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn open(&self) -> MockBrowser {
        MockBrowser {
            site: self.clone(),
            session: Mutex::new(Session::default()),
        }
    }
}

#[async_trait]
impl DriverLauncher for MockSite {
    async fn launch(&self) -> DriverResult<Box<dyn BrowserDriver>> {
        Ok(Box::new(self.open()))
    }
}

#[derive(Debug, Default)]
struct Session {
    url: String,
    loaded: bool,
    logged_in: Option<String>,
    values: BTreeMap<String, String>,
    checked: BTreeSet<String>,
    modal_open: bool,
    closed: bool,
}

impl Session {
    fn path(&self) -> &str {
        let rest = self.url.strip_prefix(BASE_URL).unwrap_or("");
        rest.split(['?', '#']).next().unwrap_or("")
    }

    fn goto(&mut self, url: String) {
        self.url = url;
        self.loaded = true;
        self.values.clear();
        self.checked.clear();
        self.modal_open = false;
    }
}

/// One browser session on the mock site
pub struct MockBrowser {
    site: MockSite,
    session: Mutex<Session>,
}

enum Kind {
    Input,
    Select(&'static [&'static str]),
    Checkbox,
    Button,
}

const REGISTRATION_INPUTS: &[&str] = &[
    "#username",
    "#email",
    "#password",
    "#password_repeat",
    "#birth_year",
];

impl MockBrowser {
    pub fn url(&self) -> String {
        self.session.lock().unwrap().url.clone()
    }

    pub fn logged_in_as(&self) -> Option<String> {
        self.session.lock().unwrap().logged_in.clone()
    }

    fn element(&self, selector: &str) -> Option<Kind> {
        if self.site.state.lock().unwrap().removed.contains(selector) {
            return None;
        }
        let session = self.session.lock().unwrap();
        if session.logged_in.is_some() && selector == "#personal_settings" {
            return Some(Kind::Button);
        }
        match session.path() {
            "/register/student" => match selector {
                s if REGISTRATION_INPUTS.iter().any(|i| *i == s) => Some(Kind::Input),
                "#language" => Some(Kind::Select(&["English", "Nederlands"])),
                "#gender" => Some(Kind::Select(&["Female", "Male", "Other"])),
                "#country" => Some(Kind::Select(&["Australia", "Netherlands"])),
                "#prog_experience_yes" | "#agree_terms" => Some(Kind::Checkbox),
                // Only rendered once the experience box is ticked
                "#experience_language_python"
                    if session.checked.contains("#prog_experience_yes") =>
                {
                    Some(Kind::Checkbox)
                }
                "#submit_button" => Some(Kind::Button),
                _ => None,
            },
            "/login" => match selector {
                "#username" | "#password" => Some(Kind::Input),
                "#login_button" => Some(Kind::Button),
                _ => None,
            },
            "/settings" => match selector {
                "#delete_profile_button" => Some(Kind::Button),
                "#modal-yes-button" if session.modal_open => Some(Kind::Button),
                _ => None,
            },
            _ => None,
        }
    }

    fn require(&self, selector: &str) -> DriverResult<Kind> {
        self.ensure_open()?;
        self.element(selector).ok_or_else(|| DriverError::ElementNotFound {
            selector: selector.to_string(),
        })
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.session.lock().unwrap().closed {
            return Err(DriverError::Closed);
        }
        Ok(())
    }

    fn wrong_kind(selector: &str, reason: &str) -> DriverError {
        DriverError::NotInteractable {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    fn submit_registration(&self) {
        let mut session = self.session.lock().unwrap();
        let mut site = self.site.state.lock().unwrap();

        let value = |k: &str| session.values.get(k).cloned().unwrap_or_default();
        let username = value("#username");
        let password = value("#password");
        let accepted = session.checked.contains("#agree_terms")
            && !username.is_empty()
            && password == value("#password_repeat")
            && !site.accounts.contains_key(&username);

        if accepted {
            site.accounts.insert(username.clone(), password);
            session.logged_in = Some(username);
            let url = format!("{}/landing?welcome=1", BASE_URL);
            site.navigations.push(url.clone());
            session.goto(url);
        }
    }

    fn submit_login(&self) {
        let mut session = self.session.lock().unwrap();
        let mut site = self.site.state.lock().unwrap();

        let username = session.values.get("#username").cloned().unwrap_or_default();
        let password = session.values.get("#password").cloned().unwrap_or_default();
        if site.accounts.get(&username) == Some(&password) {
            session.logged_in = Some(username);
            let url = format!("{}/landing", BASE_URL);
            site.navigations.push(url.clone());
            session.goto(url);
        }
    }

    fn confirm_delete(&self) {
        let mut session = self.session.lock().unwrap();
        let mut site = self.site.state.lock().unwrap();
        if site.delete_broken {
            return;
        }
        if let Some(user) = session.logged_in.take() {
            site.accounts.remove(&user);
        }
        session.goto(format!("{}/", BASE_URL));
    }
}

#[async_trait]
impl BrowserDriver for MockBrowser {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.ensure_open()?;
        if !url.starts_with(BASE_URL) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.site.state.lock().unwrap().navigations.push(url.to_string());
        let mut session = self.session.lock().unwrap();
        session.goto(url.to_string());
        // The slow page never finishes loading
        session.loaded = session.path() != "/slow";
        Ok(())
    }

    async fn wait_for_load(&self, timeout: Duration) -> DriverResult<()> {
        self.ensure_open()?;
        if self.session.lock().unwrap().loaded {
            Ok(())
        } else {
            tokio::time::sleep(timeout).await;
            Err(DriverError::Timeout {
                condition: "document ready".to_string(),
                timeout,
            })
        }
    }

    async fn current_url(&self) -> DriverResult<String> {
        self.ensure_open()?;
        Ok(self.url())
    }

    async fn wait_for_element(&self, selector: &str, _timeout: Duration) -> DriverResult<()> {
        self.require(selector).map(|_| ())
    }

    async fn type_text(&self, selector: &str, text: &str) -> DriverResult<()> {
        match self.require(selector)? {
            Kind::Input => {
                let mut session = self.session.lock().unwrap();
                session
                    .values
                    .entry(selector.to_string())
                    .or_default()
                    .push_str(text);
                Ok(())
            }
            _ => Err(Self::wrong_kind(selector, "not a text input")),
        }
    }

    async fn select_option(&self, selector: &str, value: &str) -> DriverResult<()> {
        match self.require(selector)? {
            Kind::Select(options) if options.iter().any(|o| *o == value) => {
                let mut session = self.session.lock().unwrap();
                session.values.insert(selector.to_string(), value.to_string());
                Ok(())
            }
            Kind::Select(_) => Err(Self::wrong_kind(selector, "no option with that value or label")),
            _ => Err(Self::wrong_kind(selector, "not a select")),
        }
    }

    async fn check(&self, selector: &str) -> DriverResult<()> {
        match self.require(selector)? {
            Kind::Checkbox => {
                self.session
                    .lock()
                    .unwrap()
                    .checked
                    .insert(selector.to_string());
                Ok(())
            }
            _ => Err(Self::wrong_kind(selector, "not a checkbox")),
        }
    }

    async fn click(&self, selector: &str) -> DriverResult<()> {
        self.require(selector)?;
        if self.site.state.lock().unwrap().crash_on_click.contains(selector) {
            self.session.lock().unwrap().closed = true;
            return Ok(());
        }
        match selector {
            "#submit_button" => self.submit_registration(),
            "#login_button" => self.submit_login(),
            "#personal_settings" => {
                let url = format!("{}/settings", BASE_URL);
                self.site.state.lock().unwrap().navigations.push(url.clone());
                self.session.lock().unwrap().goto(url);
            }
            "#delete_profile_button" => self.session.lock().unwrap().modal_open = true,
            "#modal-yes-button" => self.confirm_delete(),
            _ => {}
        }
        Ok(())
    }

    async fn shutdown(&self) -> DriverResult<()> {
        self.session.lock().unwrap().closed = true;
        Ok(())
    }
}
