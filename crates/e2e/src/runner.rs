//! Scenario runner: one fresh browser session per scenario, results to JSON

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use formpilot_common::EnvConfig;

use crate::driver::DriverLauncher;
use crate::error::{E2eError, E2eResult};
use crate::flow::{FormFlow, ScenarioReport, ScenarioState};
use crate::navigation::Navigator;
use crate::probe;
use crate::scenario::{new_run_id, Scenario};

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub environment: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Runs whose teardown did not complete
    pub residual: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioReport>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub env: EnvConfig,
    pub scenarios_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Probe the base URL before the first scenario (None = skip)
    pub probe_timeout: Option<Duration>,
}

impl RunnerConfig {
    pub fn new(env: EnvConfig) -> Self {
        Self {
            env,
            scenarios_dir: PathBuf::from("scenarios"),
            output_dir: PathBuf::from("test-results"),
            probe_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Main scenario runner
pub struct TestRunner {
    config: RunnerConfig,
    launcher: Box<dyn DriverLauncher>,
    probed: bool,
}

impl TestRunner {
    pub fn with_config(config: RunnerConfig, launcher: impl DriverLauncher + 'static) -> Self {
        Self {
            config,
            launcher: Box::new(launcher),
            probed: false,
        }
    }

    pub fn env(&self) -> &EnvConfig {
        &self.config.env
    }

    /// Make sure the application answers before driving a browser at it
    pub async fn probe(&mut self) -> E2eResult<()> {
        if self.probed {
            return Ok(());
        }
        if let Some(timeout) = self.config.probe_timeout {
            probe::wait_until_ready(self.config.env.registry.base_url(), timeout).await?;
        }
        self.probed = true;
        Ok(())
    }

    /// Run all scenarios in the scenarios directory
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let scenarios = Scenario::load_all(&self.config.scenarios_dir)?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios carrying a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = Scenario::load_all(&self.config.scenarios_dir)?;
        let filtered: Vec<Scenario> = Scenario::filter_by_tag(&scenarios, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run one scenario by name
    pub async fn run_test(&mut self, name: &str) -> E2eResult<TestSuiteResult> {
        let scenarios = Scenario::load_all(&self.config.scenarios_dir)?;
        let scenario = scenarios
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioParse(format!("Scenario not found: {}", name)))?;

        self.run_scenarios(std::slice::from_ref(&scenario)).await
    }

    /// Run scenarios one after another
    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        self.probe().await?;

        info!(
            "Running {} scenario(s) against {} ({})",
            scenarios.len(),
            self.config.env.registry.base_url(),
            self.config.env.environment
        );

        for scenario in scenarios {
            let report = match self.run_scenario(scenario).await {
                Ok(report) => report,
                Err(e) => {
                    error!("✗ {} - could not start: {}", scenario.name, e);
                    not_started(scenario, &e)
                }
            };

            if report.success {
                info!("✓ {} ({} ms)", report.name, report.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    report.name,
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
            if report.residual_account {
                error!("! {} may have left an account behind", report.name);
            }
            results.push(report);
        }

        let passed = results.iter().filter(|r| r.success).count();
        let residual = results.iter().filter(|r| r.residual_account).count();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed, {} residual ({} ms)",
            passed,
            results.len() - passed,
            residual,
            duration_ms
        );

        Ok(TestSuiteResult {
            environment: self.config.env.environment.clone(),
            total: results.len(),
            passed,
            failed: results.len() - passed,
            residual,
            duration_ms,
            results,
        })
    }

    /// Run one scenario in its own browser session
    pub async fn run_scenario(&self, scenario: &Scenario) -> E2eResult<ScenarioReport> {
        let run_id = new_run_id();
        let scenario = scenario.instantiate(&run_id);
        debug!("Launching browser for {} ({})", scenario.name, run_id);

        let driver = self.launcher.launch().await?;
        let nav = Navigator::new(driver.as_ref(), &self.config.env);
        let report = FormFlow::new(nav).run(&scenario, &run_id).await;

        if let Err(e) = driver.shutdown().await {
            warn!("Browser for {} did not shut down cleanly: {}", scenario.name, e);
        }
        Ok(report)
    }

    /// Write results to `<output_dir>/test-results.json`
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        write_results(&self.config.output_dir, results)
    }
}

pub fn write_results(output_dir: &Path, results: &TestSuiteResult) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("test-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

fn not_started(scenario: &Scenario, e: &E2eError) -> ScenarioReport {
    ScenarioReport {
        name: scenario.name.clone(),
        run_id: String::new(),
        success: false,
        final_state: ScenarioState::Failed,
        started_at: Utc::now(),
        duration_ms: 0,
        outcome: None,
        steps: vec![],
        error: Some(e.to_string()),
        error_kind: Some(e.kind().to_string()),
        teardown_error: None,
        residual_account: false,
    }
}
