//! Declarative form fields

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::driver::{BrowserDriver, DriverError};
use crate::error::{E2eError, E2eResult};

/// One field interaction, in the order the scenario author wrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FormFieldSpec {
    /// Type text into an input
    Type { selector: String, value: String },

    /// Choose a dropdown option by value or label
    Select { selector: String, value: String },

    /// Tick a checkbox
    Check { selector: String },
}

impl FormFieldSpec {
    pub fn type_text(selector: impl Into<String>, value: impl Into<String>) -> Self {
        FormFieldSpec::Type {
            selector: selector.into(),
            value: value.into(),
        }
    }

    pub fn select(selector: impl Into<String>, value: impl Into<String>) -> Self {
        FormFieldSpec::Select {
            selector: selector.into(),
            value: value.into(),
        }
    }

    pub fn check(selector: impl Into<String>) -> Self {
        FormFieldSpec::Check {
            selector: selector.into(),
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            FormFieldSpec::Type { selector, .. }
            | FormFieldSpec::Select { selector, .. }
            | FormFieldSpec::Check { selector } => selector,
        }
    }

    /// Short label used in step logs and reports
    pub fn step_name(&self) -> String {
        match self {
            FormFieldSpec::Type { selector, .. } => format!("type:{}", selector),
            FormFieldSpec::Select { selector, .. } => format!("select:{}", selector),
            FormFieldSpec::Check { selector } => format!("check:{}", selector),
        }
    }

    /// Replace `{{run_id}}` in the value
    pub(crate) fn instantiate(&self, run_id: &str) -> Self {
        match self {
            FormFieldSpec::Type { selector, value } => FormFieldSpec::Type {
                selector: selector.clone(),
                value: crate::scenario::substitute(value, run_id),
            },
            FormFieldSpec::Select { selector, value } => FormFieldSpec::Select {
                selector: selector.clone(),
                value: crate::scenario::substitute(value, run_id),
            },
            FormFieldSpec::Check { .. } => self.clone(),
        }
    }

    /// Wait for the element, then perform the interaction.
    ///
    /// Any failure, including the element never appearing within
    /// `element_timeout`, surfaces as a field error naming the selector.
    pub async fn apply(
        &self,
        driver: &dyn BrowserDriver,
        element_timeout: Duration,
    ) -> E2eResult<()> {
        let selector = self.selector();
        debug!("{}", self.step_name());

        driver
            .wait_for_element(selector, element_timeout)
            .await
            .map_err(|e| field_error(selector, e))?;

        let result = match self {
            FormFieldSpec::Type { value, .. } => driver.type_text(selector, value).await,
            FormFieldSpec::Select { value, .. } => driver.select_option(selector, value).await,
            FormFieldSpec::Check { .. } => driver.check(selector).await,
        };

        result.map_err(|e| field_error(selector, e))
    }
}

/// Click a control, reporting failure against its selector
pub async fn click(
    driver: &dyn BrowserDriver,
    selector: &str,
    element_timeout: Duration,
) -> E2eResult<()> {
    debug!("click:{}", selector);
    driver
        .wait_for_element(selector, element_timeout)
        .await
        .map_err(|e| field_error(selector, e))?;
    driver
        .click(selector)
        .await
        .map_err(|e| field_error(selector, e))
}

pub(crate) fn field_error(selector: &str, e: DriverError) -> E2eError {
    match e {
        DriverError::Closed | DriverError::Launch(_) => E2eError::Driver(e),
        DriverError::ElementNotFound { .. } => E2eError::FieldInteraction {
            selector: selector.to_string(),
            reason: "element not found".to_string(),
        },
        DriverError::NotInteractable { reason, .. } => E2eError::FieldInteraction {
            selector: selector.to_string(),
            reason,
        },
        other => E2eError::FieldInteraction {
            selector: selector.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_fields() {
        let yaml = r##"
- action: type
  selector: "#username"
  value: user123
- action: select
  selector: "#language"
  value: English
- action: check
  selector: "#agree_terms"
"##;
        let fields: Vec<FormFieldSpec> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            fields,
            vec![
                FormFieldSpec::type_text("#username", "user123"),
                FormFieldSpec::select("#language", "English"),
                FormFieldSpec::check("#agree_terms"),
            ]
        );
        assert_eq!(fields[2].step_name(), "check:#agree_terms");
    }

    #[test]
    fn test_instantiate_only_touches_values() {
        let field = FormFieldSpec::type_text("#username", "user{{run_id}}");
        assert_eq!(
            field.instantiate("ab12"),
            FormFieldSpec::type_text("#username", "userab12")
        );
    }

    #[test]
    fn test_field_error_keeps_selector() {
        let err = field_error(
            "#gender",
            DriverError::NotInteractable {
                selector: "#gender".into(),
                reason: "element is disabled".into(),
            },
        );
        match err {
            E2eError::FieldInteraction { selector, reason } => {
                assert_eq!(selector, "#gender");
                assert_eq!(reason, "element is disabled");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
