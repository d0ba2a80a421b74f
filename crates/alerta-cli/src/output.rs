//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use alerta_alerter::{AlertPayload, AlerterInfo};
use alerta_config::{OptionSource, ResolvedOptions, TlsVerify};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Shown in place of a configured API key.
pub const REDACTED: &str = "<redacted>";

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as human-readable text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

impl TableDisplay for AlerterInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Type: {}", self.alerter_type)?;
        Ok(())
    }
}

impl TableDisplay for AlertPayload {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Resource:     {}", self.resource)?;
        writeln!(writer, "Event:        {}", self.event)?;
        writeln!(writer, "Environment:  {}", self.environment)?;
        writeln!(writer, "Severity:     {}", self.severity)?;
        writeln!(writer, "Service:      {}", self.service.join(", "))?;
        writeln!(writer, "Value:        {}", self.value)?;
        writeln!(writer, "Time:         {}", self.date_time)?;
        writeln!(writer, "IP:           {}", self.attributes.ip)?;
        writeln!(writer)?;
        writeln!(writer, "{}", self.text)?;
        Ok(())
    }
}

/// Resolved connection options, as shown by `config`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    /// File the options were read from.
    pub config_file: String,
    /// Whether that file existed.
    pub file_found: bool,
    /// Matching `[profile ...]` section, if any.
    pub profile_section: Option<String>,
    /// Alerta API base URL.
    pub endpoint: String,
    /// `<redacted>` when a key is set, empty otherwise.
    pub key: String,
    /// TLS verification mode.
    pub sslverify: TlsVerify,
    /// Client debug flag.
    pub debug: bool,
    /// Request timeout in seconds.
    pub timeout_secs: f64,
}

impl ConfigView {
    /// Builds the view from a resolution result.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved values do not form valid options.
    pub fn from_resolved(resolved: &ResolvedOptions) -> Result<Self, CliError> {
        let options = resolved.options()?;
        let profile_section = match resolved.source() {
            OptionSource::Profile(name) => Some(name.clone()),
            OptionSource::Default => None,
        };
        Ok(Self {
            config_file: resolved.path().display().to_string(),
            file_found: resolved.file_found(),
            profile_section,
            endpoint: options.endpoint,
            key: if options.key.is_empty() {
                String::new()
            } else {
                REDACTED.to_string()
            },
            sslverify: options.ssl_verify,
            debug: options.debug,
            timeout_secs: options.timeout.as_secs_f64(),
        })
    }
}

impl TableDisplay for ConfigView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let found = if self.file_found { "" } else { " (not found)" };
        let sslverify = match &self.sslverify {
            TlsVerify::Enabled => "enabled".to_string(),
            TlsVerify::Disabled => "disabled".to_string(),
            TlsVerify::CaBundle(path) => path.display().to_string(),
        };
        writeln!(writer, "Config file:  {}{found}", self.config_file)?;
        writeln!(
            writer,
            "Profile:      {}",
            self.profile_section.as_deref().unwrap_or("DEFAULT")
        )?;
        writeln!(writer, "Endpoint:     {}", self.endpoint)?;
        writeln!(writer, "Key:          {}", self.key)?;
        writeln!(writer, "SSL verify:   {sslverify}")?;
        writeln!(writer, "Debug:        {}", self.debug)?;
        writeln!(writer, "Timeout:      {}s", self.timeout_secs)?;
        Ok(())
    }
}

/// Outcome of a `send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendSummary {
    /// Rule the alert was raised for.
    pub rule: String,
    /// Number of matches in the batch.
    pub matches: usize,
}

impl TableDisplay for SendSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "sent alert for rule {} ({} matches)",
            self.rule, self.matches
        )?;
        Ok(())
    }
}
