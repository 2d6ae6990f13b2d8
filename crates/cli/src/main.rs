//! Formpilot CLI - Main Entry Point
//!
//! Runs declarative sign-up scenarios against a web application in Chrome
//! and cleans up the accounts they create.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{check, pages, run};
use formpilot_common::EnvConfig;

/// Formpilot - browser-driven sign-up form tests
#[derive(Parser)]
#[command(name = "formpilot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value_os_t = formpilot_common::default_config_path(), global = true)]
    config: PathBuf,

    /// Environment to run against (overrides FORMPILOT_ENV)
    #[arg(long, global = true)]
    env: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios
    Run(run::RunArgs),

    /// List the page registry of the environment
    Pages(pages::PagesArgs),

    /// Check configuration and that the application answers
    Check(check::CheckArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match execute(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}

/// Returns false when a scenario or check failed
async fn execute(cli: Cli) -> anyhow::Result<bool> {
    if let Commands::Version = cli.command {
        println!("Formpilot CLI v{}", formpilot_common::VERSION);
        return Ok(true);
    }

    let config = EnvConfig::load(&cli.config, cli.env.as_deref())
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    match cli.command {
        Commands::Run(args) => run::execute(args, config, cli.format).await,
        Commands::Pages(args) => pages::execute(args, &config, cli.format).map(|_| true),
        Commands::Check(args) => check::execute(args, &config).await,
        Commands::Version => Ok(true),
    }
}
