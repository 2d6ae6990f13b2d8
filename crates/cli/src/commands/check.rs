//! Check Command
//!
//! Verifies the configuration resolves and the application answers.

use anyhow::Result;
use clap::Args;
use std::time::Duration;

use formpilot_common::EnvConfig;
use formpilot_e2e::probe;

use crate::output::{print_error, print_success, print_warning};

#[derive(Args)]
pub struct CheckArgs {
    /// Seconds to wait for the application
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Pages that must be present in the registry
    #[arg(long = "require-page", value_name = "NAME")]
    pub require_pages: Vec<String>,
}

/// Returns false when a check failed
pub async fn execute(args: CheckArgs, config: &EnvConfig) -> Result<bool> {
    let registry = &config.registry;
    print_success(&format!(
        "Environment '{}' resolves {} page(s) against {}",
        config.environment,
        registry.len(),
        registry.base_url()
    ));

    let missing = missing_pages(config, &args.require_pages);
    for name in &missing {
        print_error(&format!("Page '{}' is not configured", name));
    }
    if registry.is_empty() {
        print_warning("No pages configured; only literal locations can be used");
    }

    let reachable =
        match probe::wait_until_ready(registry.base_url(), Duration::from_secs(args.timeout)).await
        {
            Ok(()) => {
                print_success(&format!("Application is up at {}", registry.base_url()));
                true
            }
            Err(e) => {
                print_error(&e.to_string());
                false
            }
        };

    Ok(reachable && missing.is_empty())
}

fn missing_pages<'a>(config: &EnvConfig, required: &'a [String]) -> Vec<&'a str> {
    required
        .iter()
        .map(String::as_str)
        .filter(|name| !config.registry.contains(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pages() {
        let config = EnvConfig::from_toml(
            r#"
[environments.local]
base_url = "http://localhost:8080"

[environments.local.pages]
landing_page = "/landing"
"#,
            None,
        )
        .unwrap();

        let required = vec!["landing_page".to_string(), "register_student_page".to_string()];
        assert_eq!(missing_pages(&config, &required), vec!["register_student_page"]);
    }
}
