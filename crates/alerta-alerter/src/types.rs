//! Core types for the alerter.
//!
//! - [`Match`]: one triggering event handed over by the host
//! - [`RuleConfig`]: the rule settings the alerter reads
//! - [`AlertPayload`]: the alert sent to Alerta
//! - [`AlerterInfo`]: the descriptor reported to the host

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AlertaError, Result};

/// Value of the payload's `environment` field.
pub const ENVIRONMENT: &str = "Production";
/// Value of the payload's `severity` field.
pub const SEVERITY: &str = "warning";
/// Value of the payload's `status` field.
pub const STATUS: &str = "open";
/// Value of the payload's `type` field.
pub const ALERT_TYPE: &str = "elastAlert";
/// Downstream notification channel tagged in the attributes.
pub const MODELS_TAG: &str = "dingding";
/// Maximum length of the payload text, in characters.
pub const MAX_TEXT_CHARS: usize = 1000;

/// A match record produced by the host for one triggering event.
///
/// A thin wrapper over a JSON object; the alerter only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Match(Map<String, Value>);

impl Match {
    /// Field holding the hit count.
    pub const NUM_HITS: &'static str = "num_hits";
    /// Field holding the event timestamp.
    pub const TIMESTAMP: &'static str = "@timestamp";
    /// Nested object carrying extra event fields.
    pub const FIELDS: &'static str = "fields";

    /// Creates an empty match.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a top-level field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a top-level field that must be present.
    ///
    /// # Errors
    ///
    /// Returns `AlertaError::MissingField` if it is absent.
    pub fn require(&self, key: &str) -> Result<&Value> {
        self.0.get(key).ok_or_else(|| AlertaError::missing(key))
    }

    /// Looks up a possibly dotted key.
    ///
    /// A literal top-level key wins; otherwise each dot descends into a
    /// nested object.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(key) {
            return Some(value);
        }
        let mut parts = key.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// The `ip` inside the nested `fields` object, or `""` if either is absent.
    #[must_use]
    pub fn field_ip(&self) -> Value {
        self.0
            .get(Self::FIELDS)
            .and_then(Value::as_object)
            .and_then(|fields| fields.get("ip"))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    /// Iterates over top-level fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the match has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Match {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Match {
    type Error = AlertaError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AlertaError::SerializationError(format!(
                "match must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Which parts of the match body the formatter emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertTextType {
    /// Rule name or custom text, then all match fields.
    #[default]
    Default,
    /// Only the custom alert text.
    AlertTextOnly,
    /// Custom text without the match fields.
    ExcludeFields,
}

impl AlertTextType {
    /// Returns the type as its configuration string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::AlertTextOnly => "alert_text_only",
            Self::ExcludeFields => "exclude_fields",
        }
    }
}

impl From<String> for AlertTextType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "alert_text_only" => Self::AlertTextOnly,
            "exclude_fields" => Self::ExcludeFields,
            _ => Self::Default,
        }
    }
}

impl From<AlertTextType> for String {
    fn from(value: AlertTextType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AlertTextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_missing_value() -> String {
    RuleConfig::DEFAULT_MISSING_VALUE.to_string()
}

const fn default_subject_max_len() -> usize {
    RuleConfig::DEFAULT_SUBJECT_MAX_LEN
}

/// The rule settings the alerter reads.
///
/// Settings it does not know about are kept in `extra` so subject and text
/// arguments can refer to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule name.
    pub name: String,
    /// Owning application, reported as the Alerta service.
    #[serde(default)]
    pub app: Option<String>,
    /// Custom title template with positional `{n}` placeholders.
    #[serde(default)]
    pub alert_subject: Option<String>,
    /// Match fields filling the title placeholders.
    #[serde(default)]
    pub alert_subject_args: Vec<String>,
    /// Maximum title length, in characters.
    #[serde(default = "default_subject_max_len")]
    pub alert_subject_max_len: usize,
    /// Custom body text template.
    #[serde(default)]
    pub alert_text: Option<String>,
    /// Match fields filling the body placeholders.
    #[serde(default)]
    pub alert_text_args: Vec<String>,
    /// Which parts of the body to emit.
    #[serde(default)]
    pub alert_text_type: AlertTextType,
    /// Placeholder for arguments that resolve to nothing.
    #[serde(default = "default_missing_value")]
    pub alert_missing_value: String,
    /// Fields the host counted top values for; enables the
    /// `top_events_<key>` listing in the body.
    #[serde(default)]
    pub top_count_keys: Vec<String>,
    /// Any other rule settings.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RuleConfig {
    /// Text substituted for arguments that resolve to nothing.
    pub const DEFAULT_MISSING_VALUE: &'static str = "<MISSING VALUE>";
    /// Default title length cap.
    pub const DEFAULT_SUBJECT_MAX_LEN: usize = 2048;

    /// Creates a rule configuration with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app: None,
            alert_subject: None,
            alert_subject_args: Vec::new(),
            alert_subject_max_len: Self::DEFAULT_SUBJECT_MAX_LEN,
            alert_text: None,
            alert_text_args: Vec::new(),
            alert_text_type: AlertTextType::Default,
            alert_missing_value: Self::DEFAULT_MISSING_VALUE.to_string(),
            top_count_keys: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Sets the owning application.
    #[must_use]
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Sets a custom title template and its arguments.
    #[must_use]
    pub fn with_subject<I, S>(mut self, template: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alert_subject = Some(template.into());
        self.alert_subject_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a custom body text template and its arguments.
    #[must_use]
    pub fn with_text<I, S>(mut self, template: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alert_text = Some(template.into());
        self.alert_text_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the body text type.
    #[must_use]
    pub const fn with_text_type(mut self, text_type: AlertTextType) -> Self {
        self.alert_text_type = text_type;
        self
    }

    /// Sets the fields whose top values are listed in the body.
    #[must_use]
    pub fn with_top_count_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_count_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an arbitrary rule setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the owning application.
    ///
    /// # Errors
    ///
    /// Returns `AlertaError::MissingField` if the rule has no `app`.
    pub fn require_app(&self) -> Result<&str> {
        self.app.as_deref().ok_or_else(|| AlertaError::missing("app"))
    }

    /// Looks up a rule setting by name, for subject and text arguments.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::String(self.name.clone())),
            "app" => self.app.clone().map(Value::String),
            _ => self.extra.get(key).cloned(),
        }
    }
}

/// Attributes attached to an Alerta alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadAttributes {
    /// Rule name.
    pub name: String,
    /// IP of the first match, or `""`.
    pub ip: Value,
    /// Downstream notification channel.
    pub models: String,
    /// Owning application.
    pub app: String,
}

/// The alert sent to Alerta.
///
/// Field order and names are the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Rule name.
    pub resource: String,
    /// Alert title.
    pub event: String,
    /// Always [`ENVIRONMENT`].
    pub environment: String,
    /// Always [`SEVERITY`].
    pub severity: String,
    /// Always [`STATUS`].
    pub status: String,
    /// The owning application, as a one-element list.
    pub service: Vec<String>,
    /// Hit count of the first match.
    pub value: Value,
    /// Alert body, at most [`MAX_TEXT_CHARS`] characters.
    pub text: String,
    /// Always [`ALERT_TYPE`].
    #[serde(rename = "type")]
    pub alert_type: String,
    /// Always empty; Alerta only accepts a list here.
    pub tags: Vec<String>,
    /// Timestamp of the first match.
    #[serde(rename = "dateTime")]
    pub date_time: Value,
    /// Extra attributes.
    pub attributes: PayloadAttributes,
}

/// Descriptor returned to the host by `Alerter::info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlerterInfo {
    /// Alerter type name.
    #[serde(rename = "type")]
    pub alerter_type: String,
}

impl AlerterInfo {
    /// The descriptor this alerter reports.
    #[must_use]
    pub fn elastalert() -> Self {
        Self {
            alerter_type: "ElastAlert".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod match_tests {
        use super::*;

        #[test]
        fn require_reports_missing_field() {
            let m = Match::new().with("num_hits", 3);
            assert_eq!(m.require("num_hits").unwrap(), &json!(3));
            match m.require("@timestamp") {
                Err(AlertaError::MissingField { field }) => assert_eq!(field, "@timestamp"),
                other => panic!("expected MissingField, got {other:?}"),
            }
        }

        #[test]
        fn lookup_descends_dotted_keys() {
            let m = Match::new()
                .with("host", json!({"name": "web-1", "os": {"family": "linux"}}))
                .with("literal.key", "direct");

            assert_eq!(m.lookup("host.name"), Some(&json!("web-1")));
            assert_eq!(m.lookup("host.os.family"), Some(&json!("linux")));
            assert_eq!(m.lookup("literal.key"), Some(&json!("direct")));
            assert_eq!(m.lookup("host.missing"), None);
            assert_eq!(m.lookup("host.name.deeper"), None);
        }

        #[test]
        fn field_ip_present() {
            let m = Match::new().with("fields", json!({"ip": "10.0.0.7"}));
            assert_eq!(m.field_ip(), json!("10.0.0.7"));
        }

        #[test]
        fn field_ip_without_fields_is_empty() {
            assert_eq!(Match::new().field_ip(), json!(""));
        }

        #[test]
        fn field_ip_without_ip_is_empty() {
            let m = Match::new().with("fields", json!({"host": "web-1"}));
            assert_eq!(m.field_ip(), json!(""));
        }

        #[test]
        fn match_from_non_object_fails() {
            assert!(Match::try_from(json!([1, 2])).is_err());
            assert!(Match::try_from(json!({"a": 1})).is_ok());
        }

        #[test]
        fn match_deserializes_from_object() {
            let m: Match = serde_json::from_value(json!({"message": "boom"})).unwrap();
            assert_eq!(m.len(), 1);
            assert!(!m.is_empty());
        }
    }

    mod rule_tests {
        use super::*;

        #[test]
        fn rule_from_minimal_json() {
            let rule: RuleConfig = serde_json::from_value(json!({"name": "nginx-5xx"})).unwrap();
            assert_eq!(rule.name, "nginx-5xx");
            assert!(rule.app.is_none());
            assert_eq!(rule.alert_text_type, AlertTextType::Default);
            assert_eq!(rule.alert_missing_value, "<MISSING VALUE>");
            assert_eq!(rule.alert_subject_max_len, 2048);
        }

        #[test]
        fn rule_keeps_unknown_settings() {
            let rule: RuleConfig = serde_json::from_value(json!({
                "name": "r",
                "app": "shop",
                "index": "logstash-*",
                "alert_text_type": "exclude_fields"
            }))
            .unwrap();
            assert_eq!(rule.require_app().unwrap(), "shop");
            assert_eq!(rule.alert_text_type, AlertTextType::ExcludeFields);
            assert_eq!(rule.setting("index"), Some(json!("logstash-*")));
            assert_eq!(rule.setting("name"), Some(json!("r")));
        }

        #[test]
        fn unknown_text_type_is_default() {
            let rule: RuleConfig =
                serde_json::from_value(json!({"name": "r", "alert_text_type": "fancy"})).unwrap();
            assert_eq!(rule.alert_text_type, AlertTextType::Default);
        }

        #[test]
        fn require_app_missing() {
            let rule = RuleConfig::new("r");
            assert!(matches!(
                rule.require_app(),
                Err(AlertaError::MissingField { ref field }) if field == "app"
            ));
        }

        #[test]
        fn builder_sets_fields() {
            let rule = RuleConfig::new("r")
                .with_app("shop")
                .with_subject("{0} down", ["host"])
                .with_text("see {0}", ["url"])
                .with_text_type(AlertTextType::AlertTextOnly)
                .with_setting("owner", "ops");

            assert_eq!(rule.alert_subject.as_deref(), Some("{0} down"));
            assert_eq!(rule.alert_subject_args, vec!["host".to_string()]);
            assert_eq!(rule.alert_text_args, vec!["url".to_string()]);
            assert_eq!(rule.alert_text_type, AlertTextType::AlertTextOnly);
            assert_eq!(rule.setting("owner"), Some(json!("ops")));
        }
    }

    mod payload_tests {
        use super::*;

        #[test]
        fn payload_serializes_in_wire_order() {
            let payload = AlertPayload {
                resource: "r".to_string(),
                event: "ElastAlert: r".to_string(),
                environment: ENVIRONMENT.to_string(),
                severity: SEVERITY.to_string(),
                status: STATUS.to_string(),
                service: vec!["shop".to_string()],
                value: json!(4),
                text: "body".to_string(),
                alert_type: ALERT_TYPE.to_string(),
                tags: Vec::new(),
                date_time: json!("2024-01-01T00:00:00Z"),
                attributes: PayloadAttributes {
                    name: "r".to_string(),
                    ip: json!(""),
                    models: MODELS_TAG.to_string(),
                    app: "shop".to_string(),
                },
            };

            let json = serde_json::to_string(&payload).unwrap();
            let keys = [
                "\"resource\"",
                "\"event\"",
                "\"environment\"",
                "\"severity\"",
                "\"status\"",
                "\"service\"",
                "\"value\"",
                "\"text\"",
                "\"type\"",
                "\"tags\"",
                "\"dateTime\"",
                "\"attributes\"",
            ];
            let positions: Vec<usize> = keys
                .iter()
                .map(|k| json.find(k).unwrap_or_else(|| panic!("{k} missing")))
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
        }

        #[test]
        fn empty_tags_serialize_as_list() {
            let payload = AlertPayload {
                resource: "r".to_string(),
                event: "e".to_string(),
                environment: ENVIRONMENT.to_string(),
                severity: SEVERITY.to_string(),
                status: STATUS.to_string(),
                service: vec!["shop".to_string()],
                value: json!(1),
                text: String::new(),
                alert_type: ALERT_TYPE.to_string(),
                tags: Vec::new(),
                date_time: json!("t"),
                attributes: PayloadAttributes {
                    name: "r".to_string(),
                    ip: json!(""),
                    models: MODELS_TAG.to_string(),
                    app: "shop".to_string(),
                },
            };
            let value = serde_json::to_value(&payload).unwrap();
            assert_eq!(value["tags"], json!([]));
        }

        #[test]
        fn info_descriptor() {
            let info = serde_json::to_value(AlerterInfo::elastalert()).unwrap();
            assert_eq!(info, json!({"type": "ElastAlert"}));
        }
    }
}
