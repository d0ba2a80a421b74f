//! ElastAlert alerter that forwards matches to an Alerta server.
//!
//! `alerta-alerter` turns a batch of ElastAlert match records into a single
//! Alerta alert and posts it to `{endpoint}/alert`.
//!
//! # Features
//!
//! - **Alert text**: titles and bodies rendered the way ElastAlert renders
//!   them, including `alert_subject`/`alert_text` templates
//! - **Fixed payload shape**: environment, severity, status and type are
//!   constant; hit count, timestamp and source IP come from the first match
//! - **Per-send configuration**: connection options are re-read from the
//!   INI file for every batch (see `alerta-config`)
//! - **Dedicated log file**: see [`logging`]
//!
//! # Example
//!
//! ```rust
//! use alerta_alerter::{AlertaAlerter, Alerter, Match, RuleConfig};
//!
//! let rule = RuleConfig::new("nginx-5xx").with_app("shop-frontend");
//! let alerter = AlertaAlerter::new(rule);
//!
//! let batch = vec![
//!     Match::new()
//!         .with("num_hits", 7)
//!         .with("@timestamp", "2024-03-01T10:15:00Z"),
//! ];
//!
//! let payload = alerter.build_payload(&batch)?;
//! assert_eq!(payload.event, "ElastAlert: nginx-5xx");
//! assert_eq!(alerter.info().alerter_type, "ElastAlert");
//! # Ok::<(), alerta_alerter::AlertaError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod alerter;
pub mod body;
pub mod client;
pub mod error;
pub mod logging;
pub mod payload;
pub mod types;

pub use alerter::{Alerter, AlertaAlerter};
pub use client::{AlertaClient, SendReceipt};
pub use error::{AlertaError, Result};
pub use logging::{LogLineFormat, LogTarget};
pub use payload::PayloadBuilder;
pub use types::{
    AlertPayload, AlertTextType, AlerterInfo, Match, PayloadAttributes, RuleConfig,
};
