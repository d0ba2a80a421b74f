//! Alerta client configuration.
//!
//! Connection options for the Alerta sender come from three places, merged on
//! every send:
//!
//! - built-in defaults
//! - an INI file (`/etc/alertclient.conf`, or `$ALERTA_CONF_FILE`)
//! - an optional `[profile <name>]` section, selected by
//!   `$ALERTA_DEFAULT_PROFILE` or the file's own `profile` option
//!
//! # Example
//!
//! ```rust
//! use alerta_config::{ConfigResolver, MapEnv, CONFIG_FILE_ENV};
//!
//! let resolver = ConfigResolver::new(
//!     MapEnv::new().with(CONFIG_FILE_ENV, "/nonexistent/alerta.conf"),
//! );
//! let options = resolver.resolve()?.options()?;
//! assert_eq!(options.endpoint, "http://localhost:8080");
//! # Ok::<(), alerta_config::ConfigError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ini;
pub mod options;
pub mod resolver;

pub use error::{ConfigError, Result, SyntaxError};
pub use ini::IniDocument;
pub use options::{OptionValue, Options, TlsVerify};
pub use resolver::{
    CONFIG_FILE_ENV, ConfigResolver, DEBUG_ENV, Environment, MapEnv, OptionSource, PROFILE_ENV,
    ProcessEnv, ResolvedOptions, debug_requested,
};
