//! Command-line argument parsing with clap.

use std::path::PathBuf;

use alerta_config::{CONFIG_FILE_ENV, PROFILE_ENV};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Forward ElastAlert matches to an Alerta server.
#[derive(Parser, Debug, Clone)]
#[command(name = "elastalert-alerta")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Alerta client configuration file.
    #[arg(short, long, global = true, env = CONFIG_FILE_ENV)]
    pub config: Option<PathBuf>,

    /// Configuration profile to use.
    #[arg(short, long, global = true, env = PROFILE_ENV)]
    pub profile: Option<String>,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable `key: value` lines.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Send one batch of matches as an Alerta alert.
    Send(SendArgs),

    /// Print the alerter descriptor.
    Info,

    /// Print the resolved connection options.
    Config,
}

/// Arguments for `send`.
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Rule definition (JSON).
    #[arg(short, long)]
    pub rule: PathBuf,

    /// Matches to alert on: a JSON array or a single object. Reads stdin
    /// when omitted or `-`.
    #[arg(short, long)]
    pub matches: Option<PathBuf>,

    /// Build and print the payload without sending it.
    #[arg(long)]
    pub dry_run: bool,
}
