//! Declarative YAML scenarios

use serde::{Deserialize, Serialize};
use std::path::Path;

use formpilot_common::Credentials;

use crate::error::{E2eError, E2eResult};
use crate::form::FormFieldSpec;
use crate::navigation::PageTarget;

/// Placeholder replaced by a short per-run id, so concurrent runs register
/// distinct accounts
pub const RUN_ID_PLACEHOLDER: &str = "{{run_id}}";

/// A complete sign-up scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Form page: a registry key or a literal path
    pub page: PageTarget,

    /// Fields to fill, in order
    pub fields: Vec<FormFieldSpec>,

    /// Selector of the submit control
    pub submit: String,

    /// Expected outcome of submitting, written `reaches: <page>` or
    /// `not_reaches: <page>`
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub expect: Expectation,

    /// Credentials of the account the form creates, used by teardown
    #[serde(default)]
    pub account: Option<Credentials>,

    #[serde(default)]
    pub teardown: TeardownPolicy,
}

/// What submitting the form must do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The browser must end up on this page
    Reaches(PageTarget),

    /// The browser must stay off this page for the settle window
    NotReaches(PageTarget),
}

/// When to delete the account after submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownPolicy {
    /// Whenever the form was submitted, pass or fail
    #[default]
    Always,
    /// Only after the outcome assertion passed
    OnSuccess,
    /// The scenario never creates an account
    Never,
}

impl Scenario {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            E2eError::Yaml(e) => E2eError::ScenarioParse(format!("{}: {}", path.display(), e)),
            E2eError::ScenarioParse(msg) => {
                E2eError::ScenarioParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load all scenarios under a directory, sorted by path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::ScenarioParse("scenario name is empty".to_string()));
        }
        if self.submit.trim().is_empty() {
            return Err(E2eError::ScenarioParse(format!(
                "scenario '{}' has no submit selector",
                self.name
            )));
        }
        if let Some(field) = self.fields.iter().find(|f| f.selector().trim().is_empty()) {
            return Err(E2eError::ScenarioParse(format!(
                "scenario '{}' has a {} field without a selector",
                self.name,
                field.step_name()
            )));
        }
        Ok(())
    }

    /// Copy with every `{{run_id}}` in field values and account replaced
    pub fn instantiate(&self, run_id: &str) -> Self {
        Self {
            fields: self.fields.iter().map(|f| f.instantiate(run_id)).collect(),
            account: self.account.as_ref().map(|c| {
                Credentials::new(substitute(&c.username, run_id), substitute(&c.password, run_id))
            }),
            ..self.clone()
        }
    }
}

pub(crate) fn substitute(value: &str, run_id: &str) -> String {
    value.replace(RUN_ID_PLACEHOLDER, run_id)
}

/// Short id for one scenario run
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
