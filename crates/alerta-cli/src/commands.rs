//! Command implementations.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use alerta_alerter::{Alerter, AlertaAlerter, AlerterInfo, Match, RuleConfig};
use alerta_config::{CONFIG_FILE_ENV, ConfigResolver, Environment, PROFILE_ENV, ProcessEnv};
use serde_json::Value;
use tracing::debug;

use crate::cli::SendArgs;
use crate::error::CliError;
use crate::output::{ConfigView, OutputFormat, SendSummary};

/// Process environment with the config file and profile taken from
/// command-line flags when given.
#[derive(Debug, Clone, Default)]
pub struct CliEnv {
    config: Option<PathBuf>,
    profile: Option<String>,
}

impl CliEnv {
    /// Creates an environment overriding the given variables.
    #[must_use]
    pub const fn new(config: Option<PathBuf>, profile: Option<String>) -> Self {
        Self { config, profile }
    }
}

impl Environment for CliEnv {
    fn var(&self, name: &str) -> Option<String> {
        match name {
            CONFIG_FILE_ENV if self.config.is_some() => {
                self.config.as_ref().map(|p| p.display().to_string())
            }
            PROFILE_ENV if self.profile.is_some() => self.profile.clone(),
            _ => ProcessEnv.var(name),
        }
    }
}

/// Loads a rule definition from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a rule object.
pub fn load_rule(path: &Path) -> Result<RuleConfig, CliError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| CliError::input(path.display().to_string(), e))
}

/// Parses matches from JSON text: an array of objects or a single object.
///
/// # Errors
///
/// Returns an error if the text is not JSON or holds something other than
/// objects.
pub fn parse_matches(text: &str, source: &str) -> Result<Vec<Match>, CliError> {
    let value: Value = serde_json::from_str(text).map_err(|e| CliError::input(source, e))?;
    let items = match value {
        Value::Array(items) => items,
        single @ Value::Object(_) => vec![single],
        other => {
            return Err(CliError::input(
                source,
                format!("expected an array or object, got {other}"),
            ));
        }
    };
    items
        .into_iter()
        .map(|item| Match::try_from(item).map_err(|e| CliError::input(source, e)))
        .collect()
}

/// Reads matches from a file, or stdin when `path` is `None` or `-`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed.
pub fn read_matches(path: Option<&Path>) -> Result<Vec<Match>, CliError> {
    match path {
        Some(p) if p != Path::new("-") => {
            let text = fs::read_to_string(p)?;
            parse_matches(&text, &p.display().to_string())
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            parse_matches(&text, "<stdin>")
        }
    }
}

/// `send` command executor.
pub struct SendCommand<E = CliEnv> {
    resolver: ConfigResolver<E>,
}

impl<E: Environment> SendCommand<E> {
    /// Create a new send command.
    #[must_use]
    pub const fn new(resolver: ConfigResolver<E>) -> Self {
        Self { resolver }
    }

    /// Execute the send command.
    ///
    /// # Errors
    ///
    /// Returns an error if inputs are invalid or the alert cannot be sent.
    pub fn execute<W: Write>(
        self,
        writer: &mut W,
        format: &OutputFormat,
        args: &SendArgs,
    ) -> Result<(), CliError> {
        let rule = load_rule(&args.rule)?;
        let matches = read_matches(args.matches.as_deref())?;
        debug!(rule = %rule.name, matches = matches.len(), "loaded inputs");

        let alerter = AlertaAlerter::with_resolver(rule, self.resolver);
        if args.dry_run {
            let payload = alerter.build_payload(&matches)?;
            return format.write(writer, &payload);
        }

        alerter.alert(&matches)?;
        format.write(
            writer,
            &SendSummary {
                rule: alerter.rule().name.clone(),
                matches: matches.len(),
            },
        )
    }
}

/// `info` command executor.
pub struct InfoCommand;

impl InfoCommand {
    /// Execute the info command.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    pub fn execute<W: Write>(writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        format.write(writer, &AlerterInfo::elastalert())
    }
}

/// `config` command executor.
pub struct ConfigCommand<E = CliEnv> {
    resolver: ConfigResolver<E>,
}

impl<E: Environment> ConfigCommand<E> {
    /// Create a new config command.
    #[must_use]
    pub const fn new(resolver: ConfigResolver<E>) -> Self {
        Self { resolver }
    }

    /// Execute the config command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be resolved.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let resolved = self.resolver.resolve()?;
        format.write(writer, &ConfigView::from_resolved(&resolved)?)
    }
}
