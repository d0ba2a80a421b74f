//! Resolution of connection options from defaults, file, environment and profile.
//!
//! Precedence for each recognized option, highest first:
//!
//! 1. the selected `[profile <name>]` section, when it exists
//! 2. the `[DEFAULT]` section
//! 3. the built-in [`DEFAULTS`](crate::options::DEFAULTS)
//!
//! Nothing is cached: every call re-reads the file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::{ConfigError, Result};
use crate::ini::{DEFAULT_SECTION, IniDocument};
use crate::options::{self, OptionValue, Options, DEFAULTS};

/// Environment variable overriding the configuration file path.
pub const CONFIG_FILE_ENV: &str = "ALERTA_CONF_FILE";
/// Environment variable selecting the profile.
pub const PROFILE_ENV: &str = "ALERTA_DEFAULT_PROFILE";
/// Environment variable enabling debug logging.
pub const DEBUG_ENV: &str = "ElastAlertDebug";

/// Source of environment variables.
pub trait Environment {
    /// Returns the value of a variable, or `None` if unset.
    fn var(&self, name: &str) -> Option<String>;

    /// Returns the value of a variable, treating an empty value as unset.
    fn non_empty_var(&self, name: &str) -> Option<String> {
        self.var(name).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Returns true if debug logging was requested through the environment.
pub fn debug_requested(env: &impl Environment) -> bool {
    env.non_empty_var(DEBUG_ENV).is_some()
}

/// Where the resolved values came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    /// A `[profile <name>]` section matched.
    Profile(String),
    /// No profile section matched; `[DEFAULT]` was used.
    Default,
}

/// The outcome of one resolution pass.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    path: PathBuf,
    file_found: bool,
    source: OptionSource,
    raw: BTreeMap<String, String>,
}

impl ResolvedOptions {
    /// Path of the configuration file consulted.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file existed.
    #[must_use]
    pub const fn file_found(&self) -> bool {
        self.file_found
    }

    /// Which section supplied the values.
    #[must_use]
    pub const fn source(&self) -> &OptionSource {
        &self.source
    }

    /// Raw string value of every recognized option.
    #[must_use]
    pub const fn raw(&self) -> &BTreeMap<String, String> {
        &self.raw
    }

    /// Every recognized option coerced to a boolean where parseable.
    #[must_use]
    pub fn coerced(&self) -> BTreeMap<String, OptionValue> {
        self.raw
            .iter()
            .map(|(k, v)| (k.clone(), OptionValue::coerce(v)))
            .collect()
    }

    /// Coerced value of a single option.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<OptionValue> {
        self.raw.get(key).map(|v| OptionValue::coerce(v))
    }

    /// Typed options for the sender.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unusable values.
    pub fn options(&self) -> Result<Options> {
        Options::from_raw(&self.raw)
    }
}

/// Resolves connection options for each send.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver<E = ProcessEnv> {
    env: E,
}

impl ConfigResolver<ProcessEnv> {
    /// Creates a resolver reading the process environment.
    #[must_use]
    pub const fn from_process_env() -> Self {
        Self { env: ProcessEnv }
    }
}

impl<E: Environment> ConfigResolver<E> {
    /// Creates a resolver over the given environment.
    pub const fn new(env: E) -> Self {
        Self { env }
    }

    /// Returns the environment this resolver reads.
    pub const fn env(&self) -> &E {
        &self.env
    }

    /// Path of the configuration file, with a leading `~` expanded.
    pub fn config_path(&self) -> PathBuf {
        let configured = self
            .env
            .non_empty_var(CONFIG_FILE_ENV)
            .or_else(|| options::default_value(options::CONFIG_FILE).map(str::to_string))
            .unwrap_or_default();
        expand_home(&configured)
    }

    /// Reads the configuration file and resolves every recognized option.
    ///
    /// A missing file is not an error: the built-in defaults apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file exists but cannot be read and
    /// `ConfigError::Parse` if it is not a valid INI document.
    pub fn resolve(&self) -> Result<ResolvedOptions> {
        let path = self.config_path();
        let (document, file_found) = match fs::read_to_string(&path) {
            Ok(text) => {
                let document = IniDocument::parse(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
                (document, true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "configuration file not found, using defaults");
                (IniDocument::default(), false)
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let wanted = self
            .env
            .non_empty_var(PROFILE_ENV)
            .or_else(|| document.get(DEFAULT_SECTION, options::PROFILE).map(str::to_string))
            .or_else(|| options::default_value(options::PROFILE).map(str::to_string))
            .filter(|p| !p.is_empty());

        let profile_section = wanted
            .as_deref()
            .map(|p| format!("profile {p}"))
            .filter(|s| document.has_section(s));

        let (section, source) = match (profile_section, wanted) {
            (Some(section), Some(name)) => (section, OptionSource::Profile(name)),
            _ => (DEFAULT_SECTION.to_string(), OptionSource::Default),
        };

        let raw = DEFAULTS
            .iter()
            .map(|(key, builtin)| {
                let value = document.get(&section, key).unwrap_or(*builtin);
                ((*key).to_string(), value.to_string())
            })
            .collect();

        debug!(
            path = %path.display(),
            file_found,
            source = ?source,
            "resolved alerta options"
        );

        Ok(ResolvedOptions {
            path,
            file_found,
            source,
            raw,
        })
    }

    /// Like [`resolve`](Self::resolve), but a failure terminates the process.
    ///
    /// The configuration is required for every send; there is nothing useful
    /// to do without it.
    pub fn resolve_or_exit(&self) -> ResolvedOptions {
        match self.resolve() {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(error = %e, "cannot load alerta configuration");
                eprintln!("{}", fatal_message(&e, &self.config_path()));
                std::process::exit(1);
            }
        }
    }
}

/// Message printed when the configuration cannot be loaded.
#[must_use]
pub fn fatal_message(err: &ConfigError, fallback: &Path) -> String {
    let path = err.path().map_or(fallback, PathBuf::as_path);
    format!(
        "Problem reading configuration file {} - is this an ini file?",
        path.display()
    )
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
