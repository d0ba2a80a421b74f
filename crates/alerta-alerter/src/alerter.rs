//! The host-facing alerter.
//!
//! [`Alerter`] is the seam the alerting host calls through: it hands over a
//! batch of matches and asks for a descriptor. [`AlertaAlerter`] is the
//! implementation that forwards each batch to Alerta.

use alerta_config::{ConfigResolver, Environment, ProcessEnv};
use tracing::{debug, info};

use crate::body;
use crate::client::{AlertaClient, SendReceipt};
use crate::error::{AlertaError, Result};
use crate::payload::PayloadBuilder;
use crate::types::{AlertPayload, AlerterInfo, Match, RuleConfig};

/// An alert delivery mechanism driven by the alerting host.
///
/// The title and body hooks have default implementations; implementors may
/// override them to change how alerts read.
pub trait Alerter {
    /// The rule this alerter was configured with.
    fn rule(&self) -> &RuleConfig;

    /// Delivers one batch of matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be turned into an alert or the
    /// alert cannot be delivered.
    fn alert(&self, matches: &[Match]) -> Result<()>;

    /// Describes this alerter to the host.
    fn info(&self) -> AlerterInfo;

    /// Title used when the rule has no `alert_subject`.
    fn create_default_title(&self, _matches: &[Match]) -> String {
        body::default_title(self.rule())
    }

    /// Title for the alert: the rule's subject if it has one, else the
    /// default title.
    fn create_custom_title(&self, matches: &[Match]) -> String {
        body::custom_subject(self.rule(), matches)
            .unwrap_or_else(|| self.create_default_title(matches))
    }

    /// Body text for the alert.
    fn create_alert_body(&self, matches: &[Match]) -> String {
        body::create_alert_body(self.rule(), matches)
    }
}

/// Forwards matches to an Alerta server.
///
/// Connection options are resolved again for every batch, so edits to the
/// configuration file take effect on the next alert.
#[derive(Debug, Clone)]
pub struct AlertaAlerter<E = ProcessEnv> {
    rule: RuleConfig,
    resolver: ConfigResolver<E>,
}

impl AlertaAlerter<ProcessEnv> {
    /// Creates an alerter reading configuration through the process
    /// environment.
    #[must_use]
    pub const fn new(rule: RuleConfig) -> Self {
        Self {
            rule,
            resolver: ConfigResolver::from_process_env(),
        }
    }
}

impl<E: Environment> AlertaAlerter<E> {
    /// Creates an alerter with an explicit configuration resolver.
    pub const fn with_resolver(rule: RuleConfig, resolver: ConfigResolver<E>) -> Self {
        Self { rule, resolver }
    }

    /// The configuration resolver in use.
    pub const fn resolver(&self) -> &ConfigResolver<E> {
        &self.resolver
    }

    /// Builds the payload for a batch without sending it.
    ///
    /// # Errors
    ///
    /// Returns `AlertaError::NoMatches` or `AlertaError::MissingField`.
    pub fn build_payload(&self, matches: &[Match]) -> Result<AlertPayload> {
        if matches.is_empty() {
            return Err(AlertaError::NoMatches);
        }
        let body = self.create_alert_body(matches);
        let title = self.create_custom_title(matches);
        PayloadBuilder::new(&self.rule).build(title, &body, matches)
    }

    /// Resolves connection options and sends one payload.
    ///
    /// An unreadable or malformed configuration file terminates the process.
    ///
    /// # Errors
    ///
    /// Returns `AlertaError::Send` for transport failures, `AlertaError::Api`
    /// when the server rejects the alert, and `AlertaError::Config` or
    /// `AlertaError::InvalidConfig` for unusable option values.
    pub fn send(&self, payload: &AlertPayload) -> Result<SendReceipt> {
        let options = self.resolver.resolve_or_exit().options()?;
        debug!(endpoint = %options.endpoint, "[alerta] sendto");

        let client = AlertaClient::new(&options)?;
        let receipt = client.send_alert(payload)?;

        info!(
            rule = %self.rule.name,
            id = receipt.id.as_deref().unwrap_or_default(),
            "send msg success"
        );
        Ok(receipt)
    }
}

impl<E: Environment> Alerter for AlertaAlerter<E> {
    fn rule(&self) -> &RuleConfig {
        &self.rule
    }

    fn alert(&self, matches: &[Match]) -> Result<()> {
        let payload = self.build_payload(matches)?;
        debug!(payload = ?payload, "built alerta payload");
        info!(rule = %self.rule.name, matches = matches.len(), "send message to alerta");
        self.send(&payload)?;
        Ok(())
    }

    fn info(&self) -> AlerterInfo {
        AlerterInfo::elastalert()
    }
}
