//! Pages Command
//!
//! Lists the page registry of the selected environment.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use formpilot_common::EnvConfig;

use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct PagesArgs {
    /// Only show pages whose name contains this text
    #[arg(long)]
    pub filter: Option<String>,
}

/// One registry entry for display
#[derive(Serialize, Clone)]
pub struct PageInfo {
    pub name: String,
    pub location: String,
    pub url: String,
}

impl TableDisplay for PageInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Page", "Location", "URL"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.location.clone(), self.url.clone()]
    }
}

pub fn execute(args: PagesArgs, config: &EnvConfig, format: OutputFormat) -> Result<()> {
    let pages = page_infos(config, args.filter.as_deref());
    print_list(&pages, format);
    Ok(())
}

fn page_infos(config: &EnvConfig, filter: Option<&str>) -> Vec<PageInfo> {
    let registry = &config.registry;
    registry
        .iter()
        .filter(|(name, _)| filter.map_or(true, |f| name.contains(f)))
        .map(|(name, location)| PageInfo {
            name: name.to_string(),
            location: location.as_str().to_string(),
            url: registry.url_for_location(location.as_str()),
        })
        .collect()
}
