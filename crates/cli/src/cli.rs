//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Event Bridge - accept events over HTTP and publish them to a broker topic
#[derive(Parser, Debug)]
#[command(
    name = "event-bridge",
    author,
    version,
    about = "HTTP to message broker event bridge",
    long_about = "Accepts events on an HTTP endpoint and publishes them, in arrival order,\n\
                  to a single broker topic. Bodies are forwarded raw, or wrapped with their\n\
                  source address and headers and Avro-encoded through a schema registry."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENT_BRIDGE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVENT_BRIDGE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bridge until interrupted
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "bridge.toml", env = "EVENT_BRIDGE_CONFIG")]
    pub config: PathBuf,

    /// Override destination topic
    #[arg(long, env = "EVENT_BRIDGE_TOPIC")]
    pub topic: Option<String>,

    /// Override broker list (host:port,host:port)
    #[arg(long, env = "EVENT_BRIDGE_BROKERS")]
    pub brokers: Option<String>,

    /// Override HTTP listen port
    #[arg(long, env = "EVENT_BRIDGE_PORT")]
    pub port: Option<u16>,

    /// Override HTTP route pattern
    #[arg(long, env = "EVENT_BRIDGE_PATTERN")]
    pub pattern: Option<String>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "EVENT_BRIDGE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without starting the listener
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "bridge.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "bridge.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
