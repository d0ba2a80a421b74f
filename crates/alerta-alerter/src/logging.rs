//! Log output for the alerter.
//!
//! Production hosts keep a dedicated log file under [`LOG_DIR`]. When that
//! directory is missing, or debug logging was requested, records go to
//! stderr instead at a more verbose level.

use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use alerta_config::{Environment, debug_requested};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, SubscriberBuilder};
use tracing_subscriber::registry::LookupSpan;

use crate::error::{AlertaError, Result};

/// Directory holding the alerter's log file.
pub const LOG_DIR: &str = "/var/log/elastalert/";

/// Name of the log file inside [`LOG_DIR`].
pub const LOG_FILE_NAME: &str = "elastalert_alerta.log";

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to a file.
    File(PathBuf),
    /// Write to stderr.
    Stderr,
}

impl LogTarget {
    /// Picks the target for the given log directory.
    ///
    /// Debug mode always logs to stderr.
    #[must_use]
    pub fn select(debug: bool, dir: &Path) -> Self {
        if !debug && dir.is_dir() {
            Self::File(dir.join(LOG_FILE_NAME))
        } else {
            Self::Stderr
        }
    }

    /// Picks the target from the environment and the standard [`LOG_DIR`].
    #[must_use]
    pub fn detect(env: &impl Environment) -> Self {
        Self::select(debug_requested(env), Path::new(LOG_DIR))
    }

    /// Default verbosity for this target.
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::File(_) => Level::INFO,
            Self::Stderr => Level::DEBUG,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.level()).into())
            .from_env_lossy()
    }
}

/// Formats events as
/// `2024-03-01 10:15:00.123 target[pid] thread LEVEL - message`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLineFormat;

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let thread = std::thread::current();
        write!(
            writer,
            "{} {}[{}] {} {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            meta.target(),
            std::process::id(),
            thread.name().unwrap_or("unnamed"),
            meta.level(),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber for `target`.
///
/// `RUST_LOG` overrides the target's default level.
///
/// # Errors
///
/// Returns `AlertaError::Logging` if the log file cannot be opened or a
/// global subscriber is already installed.
pub fn init(target: &LogTarget) -> Result<()> {
    let builder = subscriber_builder(target);

    let installed = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AlertaError::Logging {
                    reason: format!("cannot open {}: {e}", path.display()),
                })?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| AlertaError::Logging {
        reason: e.to_string(),
    })
}

/// Subscriber settings shared by every target; only the writer differs.
///
/// Lines are plain text on both targets.
fn subscriber_builder(
    target: &LogTarget,
) -> SubscriberBuilder<DefaultFields, LogLineFormat, EnvFilter> {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(target.filter())
        .event_format(LogLineFormat)
}
