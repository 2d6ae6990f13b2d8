//! Form-flow runner
//!
//! Runs one [`Scenario`] against one browser session:
//!
//! ```text
//! Idle -> Navigating -> FillingFields -> Submitting -> AssertingOutcome
//!      -> Cleanup -> LoggingIn -> NavigatingToSettings -> DeletingAccount -> Done
//!                                                          (any failure) -> Failed
//! ```
//!
//! Every step is awaited before the next starts and none is retried. Once
//! the form has been submitted an account may exist, so teardown runs even
//! when the outcome assertion failed (unless the scenario opts out).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use formpilot_common::Credentials;

use crate::error::{E2eError, E2eResult};
use crate::form::{self, FormFieldSpec};
use crate::navigation::{NavigationOutcome, Navigator, PageTarget};
use crate::scenario::{Expectation, Scenario, TeardownPolicy};
use crate::teardown::TeardownRoutine;
use crate::wait::{wait_for_result, watch_for, WaitConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    Idle,
    Navigating,
    FillingFields,
    Submitting,
    AssertingOutcome,
    Cleanup,
    LoggingIn,
    NavigatingToSettings,
    DeletingAccount,
    Done,
    Failed,
}

impl std::fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScenarioState::Idle => "idle",
            ScenarioState::Navigating => "navigating",
            ScenarioState::FillingFields => "filling_fields",
            ScenarioState::Submitting => "submitting",
            ScenarioState::AssertingOutcome => "asserting_outcome",
            ScenarioState::Cleanup => "cleanup",
            ScenarioState::LoggingIn => "logging_in",
            ScenarioState::NavigatingToSettings => "navigating_to_settings",
            ScenarioState::DeletingAccount => "deleting_account",
            ScenarioState::Done => "done",
            ScenarioState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of executing one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub state: ScenarioState,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub error_kind: Option<String>,
}

/// Everything a runner needs to know about one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub run_id: String,
    pub success: bool,
    pub final_state: ScenarioState,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: Option<NavigationOutcome>,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
    pub error_kind: Option<String>,
    pub teardown_error: Option<String>,

    /// The run may have left an account behind
    pub residual_account: bool,
}

pub struct FormFlow<'a> {
    nav: Navigator<'a>,
    state: ScenarioState,
    steps: Vec<StepResult>,
}

impl<'a> FormFlow<'a> {
    pub fn new(nav: Navigator<'a>) -> Self {
        Self {
            nav,
            state: ScenarioState::Idle,
            steps: Vec::new(),
        }
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    fn transition(&mut self, next: ScenarioState) {
        debug!("{} -> {}", self.state, next);
        self.state = next;
    }

    async fn record<T, F>(&mut self, step_name: String, fut: F) -> E2eResult<T>
    where
        F: Future<Output = E2eResult<T>>,
    {
        let start = Instant::now();
        let result = fut.await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (error, error_kind) = match &result {
            Ok(_) => (None, None),
            Err(e) => {
                warn!("Step {} failed: {}", step_name, e);
                (Some(e.to_string()), Some(e.kind().to_string()))
            }
        };
        self.steps.push(StepResult {
            success: result.is_ok(),
            step_name,
            state: self.state,
            duration_ms,
            error,
            error_kind,
        });
        result
    }

    pub async fn navigate(&mut self, page: &PageTarget) -> E2eResult<()> {
        self.transition(ScenarioState::Navigating);
        let nav = self.nav;
        self.record(format!("navigate:{}", page), nav.go_to_page(page.clone()))
            .await
    }

    pub async fn fill(&mut self, fields: &[FormFieldSpec]) -> E2eResult<()> {
        self.transition(ScenarioState::FillingFields);
        let driver = self.nav.driver();
        let timeout = self.nav.config().timeouts.element();
        for field in fields {
            self.record(field.step_name(), field.apply(driver, timeout))
                .await?;
        }
        Ok(())
    }

    pub async fn submit(&mut self, selector: &str) -> E2eResult<()> {
        self.transition(ScenarioState::Submitting);
        let driver = self.nav.driver();
        let timeout = self.nav.config().timeouts.element();
        self.record(format!("submit:{}", selector), form::click(driver, selector, timeout))
            .await
    }

    /// Check where the submission took the browser
    pub async fn assert_outcome(&mut self, expect: &Expectation) -> E2eResult<NavigationOutcome> {
        self.transition(ScenarioState::AssertingOutcome);
        let nav = self.nav;
        let step_name = match expect {
            Expectation::Reaches(page) => format!("assert:reaches:{}", page),
            Expectation::NotReaches(page) => format!("assert:not_reaches:{}", page),
        };
        self.record(step_name, check_outcome(nav, expect)).await
    }

    /// Teardown, recording each phase as its own state
    pub async fn cleanup(&mut self, credentials: Option<&Credentials>) -> E2eResult<()> {
        self.transition(ScenarioState::Cleanup);
        let teardown = TeardownRoutine::new(self.nav);

        self.transition(ScenarioState::LoggingIn);
        self.record("teardown:login".to_string(), teardown.ensure_session(credentials))
            .await?;

        self.transition(ScenarioState::NavigatingToSettings);
        self.record("teardown:personal_settings".to_string(), teardown.open_settings())
            .await?;

        self.transition(ScenarioState::DeletingAccount);
        self.record("teardown:delete_profile".to_string(), teardown.delete_profile())
            .await?;

        if self.nav.config().settings.verify_deletion {
            if let Some(credentials) = credentials {
                self.record(
                    "teardown:verify_deletion".to_string(),
                    teardown.verify_account_removed(credentials),
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Run a scenario end to end. Never returns early: failures land in the
    /// report.
    pub async fn run(mut self, scenario: &Scenario, run_id: &str) -> ScenarioReport {
        let started_at = Utc::now();
        let start = Instant::now();
        info!("Scenario {} ({}) starting", scenario.name, run_id);

        let mut submitted = false;
        let primary = self.form_phase(scenario, &mut submitted).await;

        let run_teardown = match scenario.teardown {
            TeardownPolicy::Always => submitted,
            TeardownPolicy::OnSuccess => primary.is_ok(),
            TeardownPolicy::Never => false,
        };

        let mut residual_account = false;
        let mut teardown_error = None;
        if run_teardown {
            if let Err(e) = self.cleanup(scenario.account.as_ref()).await {
                error!(
                    "Teardown of scenario {} failed, an account may be left behind: {}",
                    scenario.name, e
                );
                residual_account = true;
                teardown_error = Some(e.to_string());
            }
        } else if submitted && primary.is_err() {
            // The submission may have been accepted against expectations
            error!(
                "Scenario {} failed after submitting and teardown is {:?}; an account may be left behind",
                scenario.name, scenario.teardown
            );
            residual_account = true;
        }

        let success = primary.is_ok() && teardown_error.is_none();
        self.transition(if success {
            ScenarioState::Done
        } else {
            ScenarioState::Failed
        });

        let (outcome, error, error_kind) = match primary {
            Ok(outcome) => (Some(outcome), None, None),
            Err(e) => (None, Some(e.to_string()), Some(e.kind().to_string())),
        };
        // A failed teardown is the scenario's error only if nothing failed first
        let (error, error_kind) = match (error, &teardown_error) {
            (None, Some(t)) => (Some(t.clone()), Some("TeardownError".to_string())),
            (error, _) => (error, error_kind),
        };

        ScenarioReport {
            name: scenario.name.clone(),
            run_id: run_id.to_string(),
            success,
            final_state: self.state,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            outcome,
            steps: self.steps,
            error,
            error_kind,
            teardown_error,
            residual_account,
        }
    }

    async fn form_phase(
        &mut self,
        scenario: &Scenario,
        submitted: &mut bool,
    ) -> E2eResult<NavigationOutcome> {
        self.navigate(&scenario.page).await?;
        self.fill(&scenario.fields).await?;
        self.submit(&scenario.submit).await?;
        *submitted = true;
        self.assert_outcome(&scenario.expect).await
    }
}

async fn check_outcome(nav: Navigator<'_>, expect: &Expectation) -> E2eResult<NavigationOutcome> {
    let driver = nav.driver();
    let timeouts = nav.config().timeouts;

    match expect {
        Expectation::Reaches(page) => {
            let expected = nav.url_for(page)?;
            let wanted = expected.as_str();
            let reached = wait_for_result(
                move || async move { Ok(driver.current_url().await?.contains(wanted)) },
                WaitConfig::with_timeout(timeouts.navigation()),
                "expected location",
            )
            .await;

            let outcome = nav.current_outcome().await?;
            match reached {
                Ok(()) => Ok(outcome),
                Err(_) => Err(E2eError::Assertion {
                    expected,
                    actual: outcome.url,
                }),
            }
        }
        Expectation::NotReaches(page) => {
            let forbidden = nav.url_for(page)?;
            let unwanted = forbidden.as_str();
            let fired = watch_for(
                move || async move { Ok(driver.current_url().await?.contains(unwanted)) },
                WaitConfig::with_timeout(timeouts.settle()),
            )
            .await?;

            let outcome = nav.current_outcome().await?;
            if fired {
                Err(E2eError::Assertion {
                    expected: format!("anything but {}", forbidden),
                    actual: outcome.url,
                })
            } else {
                Ok(outcome)
            }
        }
    }
}
