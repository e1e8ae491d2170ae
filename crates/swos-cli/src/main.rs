//! SwOS CLI - Command-line tool for MikroTik SwOS switches
//!
//! Polls the read-only status pages of a switch and prints decoded
//! telemetry.

mod commands;
mod config;
mod output;
mod runtime;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use swos_client::{DeviceConfig, SwosClient};
use swos_core::Section;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, DeviceArgs};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "swos-cli")]
#[command(author, version, about = "MikroTik SwOS Switch Telemetry CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Switch host name or IP address
    #[arg(short = 'H', long, env = "SWOS_HOST")]
    host: Option<String>,

    /// HTTP port of the web interface
    #[arg(short, long, env = "SWOS_PORT")]
    port: Option<u16>,

    /// Login user
    #[arg(short, long, env = "SWOS_USER")]
    user: Option<String>,

    /// Login password
    #[arg(long, env = "SWOS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SWOS_TIMEOUT")]
    timeout: Option<u64>,

    /// Device connection file (YAML or TOML)
    #[arg(short, long, env = "SWOS_DEVICE")]
    device: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "SWOS_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll every section once and print all fields
    Dump,

    /// Fetch and print one section
    Section {
        /// Section name: sys, link, stats
        section: Section,
    },

    /// Show device identity and headline readings
    Status,

    /// Poll periodically until Ctrl+C
    Watch {
        /// Seconds between polls
        #[arg(short, long, env = "SWOS_INTERVAL")]
        interval: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    runtime::block_on(run(cli))?
}

async fn run(cli: Cli) -> Result<()> {
    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    let device_file = cli
        .device
        .as_ref()
        .map(|path| {
            DeviceConfig::from_file(path)
                .with_context(|| format!("Failed to load device file: {}", path.display()))
        })
        .transpose()?;

    let args = DeviceArgs {
        host: cli.host.as_deref(),
        port: cli.port,
        username: cli.user.as_deref(),
        password: cli.password.as_deref(),
        timeout_secs: cli.timeout,
        poll_interval_secs: match &cli.command {
            Commands::Watch { interval } => *interval,
            _ => None,
        },
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(
        device_file,
        &args,
        cli.output.map(Into::into),
        cli.no_color,
    )?;
    let format = OutputFormat::from_str(&merged.output, true)
        .map_err(|e| anyhow!("Invalid output format '{}': {}", merged.output, e))?;

    // Create output context
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);

    let client = SwosClient::from_config(&merged.device).context("Failed to create SwOS client")?;

    // Execute command
    let result = match &cli.command {
        Commands::Dump => commands::dump(&client, &ctx).await,
        Commands::Section { section } => commands::section(&client, *section, &ctx).await,
        Commands::Status => commands::status(&client, &ctx).await,
        Commands::Watch { .. } => {
            commands::watch(&client, merged.device.poll_interval(), &ctx).await
        }
    };

    client.close();
    result
}

// Implement conversion for OutputFormat to string (for config merge)
impl From<OutputFormat> for &str {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}
