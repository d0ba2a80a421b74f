//! # alerta-cli
//!
//! Command-line driver for the ElastAlert Alerta alerter.
//!
//! Provides commands for:
//! - Sending a batch of matches for a rule (`send`)
//! - Printing the alerter descriptor (`info`)
//! - Inspecting the resolved connection options (`config`)
//!
//! Configuration is resolved exactly as it is for the embedded alerter;
//! `--config` and `--profile` stand in for `ALERTA_CONF_FILE` and
//! `ALERTA_DEFAULT_PROFILE`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, SendArgs};
pub use commands::CliEnv;
pub use error::CliError;
pub use output::OutputFormat;
