//! Run Command
//!
//! Runs sign-up scenarios in a fresh Chrome session each and writes
//! `test-results.json`.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use formpilot_common::EnvConfig;
use formpilot_e2e::{
    ChromiumConfig, ChromiumLauncher, RunnerConfig, ScenarioReport, TestRunner, TestSuiteResult,
};

use crate::output::{print_document, print_list, print_warning, OutputFormat, TableDisplay};

const ERROR_DISPLAY_LENGTH: usize = 80;

#[derive(Args)]
pub struct RunArgs {
    /// Directory holding scenario YAML files
    #[arg(long, default_value = "scenarios", env = "FORMPILOT_SCENARIOS")]
    pub scenarios: PathBuf,

    /// Only run scenarios carrying this tag
    #[arg(long, conflicts_with = "name")]
    pub tag: Option<String>,

    /// Only run the scenario with this name
    #[arg(long)]
    pub name: Option<String>,

    /// Directory for test-results.json
    #[arg(long, default_value = "test-results")]
    pub output: PathBuf,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chrome executable (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Do not wait for the application before the first scenario
    #[arg(long)]
    pub skip_probe: bool,

    /// Seconds to wait for the application to answer
    #[arg(long, default_value_t = 30)]
    pub probe_timeout: u64,
}

/// One scenario result for display
#[derive(Serialize, Clone)]
pub struct ScenarioRow {
    pub name: String,
    pub run_id: String,
    pub result: String,
    pub state: String,
    pub duration_ms: u64,
    pub error: String,
}

impl From<&ScenarioReport> for ScenarioRow {
    fn from(report: &ScenarioReport) -> Self {
        let result = match (report.success, report.residual_account) {
            (true, _) => "passed",
            (false, true) => "failed (residual account)",
            (false, false) => "failed",
        };
        Self {
            name: report.name.clone(),
            run_id: report.run_id.clone(),
            result: result.to_string(),
            state: report.final_state.to_string(),
            duration_ms: report.duration_ms,
            error: report.error.clone().unwrap_or_default(),
        }
    }
}

impl TableDisplay for ScenarioRow {
    fn headers() -> Vec<&'static str> {
        vec!["Scenario", "Run", "Result", "State", "Duration", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.run_id.clone(),
            self.result.clone(),
            self.state.clone(),
            format!("{} ms", self.duration_ms),
            if self.error.chars().count() > ERROR_DISPLAY_LENGTH {
                let head: String = self.error.chars().take(ERROR_DISPLAY_LENGTH).collect();
                format!("{}…", head)
            } else {
                self.error.clone()
            },
        ]
    }
}

/// Returns false when any scenario failed
pub async fn execute(args: RunArgs, config: EnvConfig, format: OutputFormat) -> Result<bool> {
    let launcher = ChromiumLauncher::new(chromium_config(&args));

    let mut runner_config = RunnerConfig::new(config);
    runner_config.scenarios_dir = args.scenarios.clone();
    runner_config.output_dir = args.output.clone();
    runner_config.probe_timeout =
        (!args.skip_probe).then(|| Duration::from_secs(args.probe_timeout));

    let mut runner = TestRunner::with_config(runner_config, launcher);

    let suite = match (&args.name, &args.tag) {
        (Some(name), _) => runner.run_test(name).await,
        (None, Some(tag)) => runner.run_tagged(tag).await,
        (None, None) => runner.run_all().await,
    }
    .with_context(|| format!("Failed to run scenarios from {}", args.scenarios.display()))?;

    runner
        .write_results(&suite)
        .context("Failed to write test results")?;

    print_suite(&suite, format);
    Ok(suite.success())
}

fn chromium_config(args: &RunArgs) -> ChromiumConfig {
    ChromiumConfig {
        headless: !args.headed,
        chrome_path: args.chrome_path.clone(),
        ..ChromiumConfig::default()
    }
}

fn print_suite(suite: &TestSuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_document(suite, format),
        OutputFormat::Table | OutputFormat::Plain => {
            let rows: Vec<ScenarioRow> = suite.results.iter().map(ScenarioRow::from).collect();
            print_list(&rows, format);
            println!(
                "{} passed, {} failed of {} ({} ms)",
                suite.passed, suite.failed, suite.total, suite.duration_ms
            );
            if suite.residual > 0 {
                print_warning(&format!(
                    "{} run(s) may have left an account behind; check the application",
                    suite.residual
                ));
            }
        }
    }
}
