//! # EcoVerse Probe CLI
//!
//! Command-line interface for probing a running EcoVerse backend.
//! Runs the ordered API checks, single health checks, and configuration
//! management.

mod cli;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ecoverse_probe::{logging, OutputFormat, ProbeConfig, ProbeResult};
use std::path::PathBuf;
use tracing::info;

use cli::{
    handle_config_init, handle_config_show, handle_health_command, handle_run_command,
    handle_steps_command,
};

#[derive(Parser, Debug)]
#[command(name = "ecoverse-probe")]
#[command(about = "Sequential API probe for the EcoVerse backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (default: ./ecoverse-probe.toml or ~/.ecoverse/probe.toml)
    #[arg(short, long, env = "ECOVERSE_PROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,

    /// Output format (table, json); defaults to the configured format
    #[arg(long)]
    format: Option<String>,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Wait for the backend, then run the probe steps in order
    Run(RunArgs),

    /// Check the backend health endpoint
    Health {
        /// Poll with the configured readiness policy instead of probing once
        #[arg(short, long)]
        wait: bool,
    },

    /// List the probe steps in execution order
    Steps,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Backend base URL including the API prefix
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token for authenticated calls
    #[arg(long)]
    pub token: Option<String>,

    /// Also run the extended checks (leaderboard, carbon credits, API document)
    #[arg(long)]
    pub extended: bool,

    /// Run only these steps (repeatable)
    #[arg(long, value_name = "STEP")]
    pub only: Vec<String>,

    /// Skip these steps (repeatable)
    #[arg(long, value_name = "STEP")]
    pub skip: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Output file path (default: ~/.ecoverse/probe.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Writing a fresh file must work even when the existing one is broken
    if let Commands::Config(ConfigCommands::Init { output, force }) = &cli.command {
        logging::init_logging(cli.verbose, cli.log_json);
        handle_config_init(output.clone(), *force)?;
        return Ok(());
    }

    // Explicit config file takes priority over the standard locations
    let config = match &cli.config {
        Some(path) => ProbeConfig::load_with_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ProbeConfig::load().context("loading configuration")?,
    };

    // A -v flag on the command line wins over the configured level
    let verbosity = cli.verbose.max(config.cli.verbose_level);
    logging::init_logging(verbosity, cli.log_json);

    info!(base_url = %config.endpoint.base_url, "EcoVerse probe starting");

    let format = || -> ProbeResult<OutputFormat> {
        cli.format
            .as_deref()
            .unwrap_or(&config.cli.default_format)
            .parse()
    };

    match &cli.command {
        Commands::Run(args) => {
            let format = format()?;
            handle_run_command(args.clone(), config.clone(), format).await?
        }
        Commands::Health { wait } => handle_health_command(*wait, &config).await?,
        Commands::Steps => handle_steps_command(format()?)?,
        Commands::Config(ConfigCommands::Show) => handle_config_show(&config, format()?)?,
        Commands::Config(ConfigCommands::Init { .. }) => {}
    }
    Ok(())
}
