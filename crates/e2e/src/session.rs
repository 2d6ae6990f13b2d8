//! Session helper: log the browser in

use tracing::{info, warn};

use formpilot_common::Credentials;

use crate::driver::DriverError;
use crate::error::{E2eError, E2eResult};
use crate::form::{self, FormFieldSpec};
use crate::navigation::{Navigator, PageTarget};
use crate::wait::{wait_for_result, WaitConfig};

pub struct SessionHelper<'a> {
    nav: Navigator<'a>,
}

impl<'a> SessionHelper<'a> {
    pub fn new(nav: Navigator<'a>) -> Self {
        Self { nav }
    }

    /// Log in with the named user fixture from the environment configuration
    pub async fn login_for_user(&self, user: &str) -> E2eResult<()> {
        let credentials = self.nav.config().credentials_for(user)?;
        self.login(&credentials).await
    }

    /// Fill the login form and wait for the browser to leave the login page.
    ///
    /// Staying on the login page for the whole navigation timeout means the
    /// credentials were rejected. That is reported once and never retried.
    pub async fn login(&self, credentials: &Credentials) -> E2eResult<()> {
        let config = self.nav.config();
        let selectors = &config.login;
        let driver = self.nav.driver();
        let element_timeout = config.timeouts.element();

        info!("Logging in as {}", credentials.username);

        let login_url = self
            .nav
            .url_for(&PageTarget::Name(selectors.page.clone()))?;
        self.nav.go_to_login().await?;

        FormFieldSpec::type_text(&selectors.username, &credentials.username)
            .apply(driver, element_timeout)
            .await?;
        FormFieldSpec::type_text(&selectors.password, &credentials.password)
            .apply(driver, element_timeout)
            .await?;
        form::click(driver, &selectors.submit, element_timeout).await?;

        let login_url = login_url.as_str();
        let left_login = wait_for_result(
            move || async move {
                let url = driver.current_url().await?;
                Ok(!url.contains(login_url))
            },
            WaitConfig::with_timeout(config.timeouts.navigation()),
            "leave login page",
        )
        .await;

        match left_login {
            Ok(()) => {
                info!("Logged in as {}", credentials.username);
                Ok(())
            }
            Err(DriverError::Timeout { .. }) => {
                // A browser that cannot report its URL is not a rejected login
                let current = driver.current_url().await?;
                warn!("Login as {} did not leave the login page", credentials.username);
                Err(E2eError::Authentication {
                    username: credentials.username.clone(),
                    reason: format!(
                        "still on {} after {:?}",
                        current,
                        config.timeouts.navigation()
                    ),
                })
            }
            Err(e) => Err(E2eError::Driver(e)),
        }
    }
}
