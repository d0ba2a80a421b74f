//! Construction of the Alerta payload from a batch of matches.

use crate::body::truncate_chars;
use crate::error::{AlertaError, Result};
use crate::types::{
    ALERT_TYPE, AlertPayload, ENVIRONMENT, MAX_TEXT_CHARS, MODELS_TAG, Match, PayloadAttributes,
    RuleConfig, SEVERITY, STATUS,
};

/// Builds [`AlertPayload`]s for one rule.
#[derive(Debug, Clone, Copy)]
pub struct PayloadBuilder<'a> {
    rule: &'a RuleConfig,
}

impl<'a> PayloadBuilder<'a> {
    /// Creates a builder for the given rule.
    #[must_use]
    pub const fn new(rule: &'a RuleConfig) -> Self {
        Self { rule }
    }

    /// Builds the payload.
    ///
    /// `title` and `body` are rendered by the caller; the body is cut to
    /// [`MAX_TEXT_CHARS`] characters. Hit count, timestamp and IP come from
    /// the first match.
    ///
    /// # Errors
    ///
    /// Returns `AlertaError::NoMatches` for an empty batch and
    /// `AlertaError::MissingField` if the rule has no `app` or the first
    /// match lacks `num_hits` or `@timestamp`.
    pub fn build(&self, title: String, body: &str, matches: &[Match]) -> Result<AlertPayload> {
        let first = matches.first().ok_or(AlertaError::NoMatches)?;
        let app = self.rule.require_app()?.to_string();
        let value = first.require(Match::NUM_HITS)?.clone();
        let date_time = first.require(Match::TIMESTAMP)?.clone();

        Ok(AlertPayload {
            resource: self.rule.name.clone(),
            event: title,
            environment: ENVIRONMENT.to_string(),
            severity: SEVERITY.to_string(),
            status: STATUS.to_string(),
            service: vec![app.clone()],
            value,
            text: truncate_chars(body, MAX_TEXT_CHARS),
            alert_type: ALERT_TYPE.to_string(),
            tags: Vec::new(),
            date_time,
            attributes: PayloadAttributes {
                name: self.rule.name.clone(),
                ip: first.field_ip(),
                models: MODELS_TAG.to_string(),
                app,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn rule() -> RuleConfig {
        RuleConfig::new("nginx-5xx").with_app("shop-frontend")
    }

    fn first_match() -> Match {
        Match::new()
            .with("num_hits", 12)
            .with("@timestamp", "2024-03-01T10:15:00Z")
            .with("fields", json!({"ip": "10.1.2.3"}))
    }

    #[test]
    fn payload_fields() {
        let rule = rule();
        let payload = PayloadBuilder::new(&rule)
            .build("ElastAlert: nginx-5xx".to_string(), "body", &[first_match()])
            .unwrap();

        assert_eq!(payload.resource, "nginx-5xx");
        assert_eq!(payload.event, "ElastAlert: nginx-5xx");
        assert_eq!(payload.environment, "Production");
        assert_eq!(payload.severity, "warning");
        assert_eq!(payload.status, "open");
        assert_eq!(payload.service, vec!["shop-frontend".to_string()]);
        assert_eq!(payload.value, json!(12));
        assert_eq!(payload.text, "body");
        assert_eq!(payload.alert_type, "elastAlert");
        assert!(payload.tags.is_empty());
        assert_eq!(serde_json::to_value(&payload).unwrap()["tags"], json!([]));
        assert_eq!(payload.date_time, json!("2024-03-01T10:15:00Z"));
        assert_eq!(payload.attributes.name, "nginx-5xx");
        assert_eq!(payload.attributes.ip, json!("10.1.2.3"));
        assert_eq!(payload.attributes.models, "dingding");
        assert_eq!(payload.attributes.app, "shop-frontend");
    }

    #[test]
    fn only_first_match_feeds_scalar_fields() {
        let rule = rule();
        let second = Match::new()
            .with("num_hits", 99)
            .with("@timestamp", "2024-03-01T11:00:00Z")
            .with("fields", json!({"ip": "10.9.9.9"}));
        let payload = PayloadBuilder::new(&rule)
            .build(String::new(), "", &[first_match(), second])
            .unwrap();

        assert_eq!(payload.value, json!(12));
        assert_eq!(payload.attributes.ip, json!("10.1.2.3"));
    }

    #[test]
    fn missing_fields_object_gives_empty_ip() {
        let rule = rule();
        let m = Match::new().with("num_hits", 1).with("@timestamp", "t");
        let payload = PayloadBuilder::new(&rule).build(String::new(), "", &[m]).unwrap();
        assert_eq!(payload.attributes.ip, json!(""));
    }

    #[test]
    fn empty_batch_is_rejected() {
        let rule = rule();
        let err = PayloadBuilder::new(&rule).build(String::new(), "", &[]).unwrap_err();
        assert!(matches!(err, AlertaError::NoMatches));
    }

    #[test]
    fn missing_num_hits_is_rejected() {
        let rule = rule();
        let m = Match::new().with("@timestamp", "t");
        let err = PayloadBuilder::new(&rule).build(String::new(), "", &[m]).unwrap_err();
        assert!(matches!(err, AlertaError::MissingField { ref field } if field == "num_hits"));
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let rule = rule();
        let m = Match::new().with("num_hits", 1);
        let err = PayloadBuilder::new(&rule).build(String::new(), "", &[m]).unwrap_err();
        assert!(matches!(err, AlertaError::MissingField { ref field } if field == "@timestamp"));
    }

    #[test]
    fn missing_app_is_rejected() {
        let rule = RuleConfig::new("no-app");
        let err = PayloadBuilder::new(&rule)
            .build(String::new(), "", &[first_match()])
            .unwrap_err();
        assert!(matches!(err, AlertaError::MissingField { ref field } if field == "app"));
    }

    #[test]
    fn long_body_is_cut_to_limit() {
        let rule = rule();
        let body = "x".repeat(MAX_TEXT_CHARS + 250);
        let payload = PayloadBuilder::new(&rule)
            .build(String::new(), &body, &[first_match()])
            .unwrap();
        assert_eq!(payload.text.chars().count(), MAX_TEXT_CHARS);
        assert_eq!(payload.text, body[..MAX_TEXT_CHARS]);
    }

    proptest! {
        #[test]
        fn text_is_body_prefix_within_limit(body in "\\PC{0,1500}") {
            let rule = rule();
            let payload = PayloadBuilder::new(&rule)
                .build(String::new(), &body, &[first_match()])
                .unwrap();

            let body_chars = body.chars().count();
            if body_chars <= MAX_TEXT_CHARS {
                prop_assert_eq!(&payload.text, &body);
            } else {
                prop_assert_eq!(payload.text.chars().count(), MAX_TEXT_CHARS);
                prop_assert!(body.starts_with(&payload.text));
            }
        }

        #[test]
        fn resource_and_type_are_fixed(name in "[a-z][a-z0-9_-]{0,30}") {
            let rule = RuleConfig::new(name.clone()).with_app("app");
            let payload = PayloadBuilder::new(&rule)
                .build(String::new(), "", &[first_match()])
                .unwrap();
            prop_assert_eq!(payload.resource, name);
            prop_assert_eq!(payload.alert_type, "elastAlert");
        }
    }
}
