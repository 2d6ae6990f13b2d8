//! Account teardown
//!
//! Deletes the account a scenario registered: make sure the session is
//! logged in, open personal settings, delete the profile and confirm the
//! modal. Every failure here is a [`E2eError::Teardown`] because it leaves
//! an account behind for the next run.

use tracing::{info, warn};

use formpilot_common::Credentials;

use crate::error::{E2eError, E2eResult};
use crate::form;
use crate::navigation::Navigator;
use crate::session::SessionHelper;

pub struct TeardownRoutine<'a> {
    nav: Navigator<'a>,
}

impl<'a> TeardownRoutine<'a> {
    pub fn new(nav: Navigator<'a>) -> Self {
        Self { nav }
    }

    /// Full teardown chain
    pub async fn delete_current_account(&self, credentials: Option<&Credentials>) -> E2eResult<()> {
        self.ensure_session(credentials).await?;
        self.open_settings().await?;
        self.delete_profile().await
    }

    /// Go to the login page and log in only if the session is not already
    /// authenticated (the settings control is absent).
    pub async fn ensure_session(&self, credentials: Option<&Credentials>) -> E2eResult<()> {
        let config = self.nav.config();

        self.nav
            .go_to_login()
            .await
            .map_err(|e| e.into_teardown("go_to_login"))?;

        let authenticated = self
            .nav
            .driver()
            .wait_for_element(&config.settings.personal_settings, config.timeouts.element())
            .await
            .is_ok();
        if authenticated {
            return Ok(());
        }

        match credentials {
            Some(credentials) => SessionHelper::new(self.nav)
                .login(credentials)
                .await
                .map_err(|e| e.into_teardown("login")),
            None => Err(E2eError::Teardown {
                step: "login".to_string(),
                reason: "session is not authenticated and the scenario has no account credentials"
                    .to_string(),
            }),
        }
    }

    pub async fn open_settings(&self) -> E2eResult<()> {
        let config = self.nav.config();
        form::click(
            self.nav.driver(),
            &config.settings.personal_settings,
            config.timeouts.element(),
        )
        .await
        .map_err(|e| e.into_teardown("personal_settings"))
    }

    /// Click delete and confirm the modal
    pub async fn delete_profile(&self) -> E2eResult<()> {
        let config = self.nav.config();
        let driver = self.nav.driver();
        let timeout = config.timeouts.element();

        form::click(driver, &config.settings.delete_profile, timeout)
            .await
            .map_err(|e| e.into_teardown("delete_profile"))?;
        form::click(driver, &config.settings.confirm, timeout)
            .await
            .map_err(|e| e.into_teardown("confirm_delete"))?;

        info!("Account deleted");
        Ok(())
    }

    /// A deleted account must no longer be able to log in
    pub async fn verify_account_removed(&self, credentials: &Credentials) -> E2eResult<()> {
        match SessionHelper::new(self.nav).login(credentials).await {
            Err(E2eError::Authentication { .. }) => Ok(()),
            Ok(()) => {
                warn!("Deleted account {} can still log in", credentials.username);
                Err(E2eError::Teardown {
                    step: "verify_deletion".to_string(),
                    reason: format!("account '{}' still accepts its credentials", credentials.username),
                })
            }
            Err(e) => Err(e.into_teardown("verify_deletion")),
        }
    }
}
