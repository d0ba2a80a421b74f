//! Rendering of alert titles and bodies from matches.
//!
//! The body layout is the one ElastAlert uses for its built-in alerters, so
//! alerts read the same whichever alerter delivered them. Per match:
//!
//! ```text
//! <rule name>            (only when the rule has no alert_text)
//!
//! <alert_text>
//!
//! key: value             (sorted, unless alert_text_type says otherwise)
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::types::{AlertTextType, Match, RuleConfig};

/// Separator appended after each match when a body holds several.
pub const MATCH_SEPARATOR: &str = "\n----------------------------------------\n";

const TOP_EVENTS_PREFIX: &str = "top_events_";

/// The default title: `ElastAlert: <rule name>`.
#[must_use]
pub fn default_title(rule: &RuleConfig) -> String {
    format!("ElastAlert: {}", rule.name)
}

/// The rule's custom subject, or `None` if it has none.
///
/// Arguments are looked up in the first match.
#[must_use]
pub fn custom_subject(rule: &RuleConfig, matches: &[Match]) -> Option<String> {
    let template = rule.alert_subject.as_deref()?;
    let subject = if rule.alert_subject_args.is_empty() {
        template.to_string()
    } else {
        let args = resolve_args(rule, matches.first(), &rule.alert_subject_args);
        format_positional(template, &args)
    };
    Some(truncate_chars(&subject, rule.alert_subject_max_len))
}

/// Renders the body for all matches.
#[must_use]
pub fn create_alert_body(rule: &RuleConfig, matches: &[Match]) -> String {
    let mut body = String::new();
    for m in matches {
        body.push_str(&format_match(rule, m));
        if matches.len() > 1 {
            body.push_str(MATCH_SEPARATOR);
        }
    }
    body
}

/// Renders the body section for a single match.
#[must_use]
pub fn format_match(rule: &RuleConfig, m: &Match) -> String {
    let mut text = String::new();

    if rule.alert_text.is_none() {
        text.push_str(&rule.name);
        text.push_str("\n\n");
    }
    text.push_str(&custom_text(rule, m));
    ensure_blank_line(&mut text);

    if rule.alert_text_type == AlertTextType::AlertTextOnly {
        return text;
    }
    if !rule.top_count_keys.is_empty() {
        add_top_counts(&mut text, m);
    }
    if rule.alert_text_type != AlertTextType::ExcludeFields {
        add_match_items(&mut text, m);
    }

    text
}

/// Returns at most `max` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn custom_text(rule: &RuleConfig, m: &Match) -> String {
    let template = rule.alert_text.as_deref().unwrap_or_default();
    if rule.alert_text_args.is_empty() {
        return template.to_string();
    }
    let args = resolve_args(rule, Some(m), &rule.alert_text_args);
    format_positional(template, &args)
}

fn ensure_blank_line(text: &mut String) {
    while !text.ends_with("\n\n") {
        text.push('\n');
    }
}

/// Lists each `top_events_<key>` entry as `<key>:` followed by its terms,
/// highest count first.
fn add_top_counts(text: &mut String, m: &Match) {
    for (key, counts) in m.iter() {
        let Some(field) = key.strip_prefix(TOP_EVENTS_PREFIX) else {
            continue;
        };
        text.push_str(field);
        text.push_str(":\n");

        let mut events: Vec<(&String, &Value)> = counts
            .as_object()
            .map(|terms| terms.iter().collect())
            .unwrap_or_default();
        if events.is_empty() {
            text.push_str("No events found.\n");
        }
        events.sort_by(|a, b| count_of(b.1).total_cmp(&count_of(a.1)));
        for (term, count) in events {
            text.push_str(term);
            text.push_str(": ");
            text.push_str(&render_value(count));
            text.push('\n');
        }
        text.push('\n');
    }
}

fn count_of(value: &Value) -> f64 {
    value.as_f64().unwrap_or_default()
}

fn add_match_items(text: &mut String, m: &Match) {
    let mut items: Vec<(&String, &Value)> = m
        .iter()
        .filter(|(key, _)| !key.starts_with(TOP_EVENTS_PREFIX))
        .collect();
    items.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in items {
        let rendered = match value {
            Value::Array(_) | Value::Object(_) => pretty_json(value),
            other => render_value(other),
        };
        text.push_str(key);
        text.push_str(": ");
        text.push_str(&rendered);
        text.push('\n');
    }
}

/// Resolves placeholder arguments: match field, then rule setting, then the
/// rule's missing-value text.
fn resolve_args(rule: &RuleConfig, m: Option<&Match>, names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            m.and_then(|m| m.lookup(name))
                .filter(|v| !v.is_null())
                .map(render_value)
                .or_else(|| {
                    rule.setting(name)
                        .filter(is_truthy)
                        .map(|v| render_value(&v))
                })
                .unwrap_or_else(|| rule.alert_missing_value.clone())
        })
        .collect()
}

/// Substitutes `{}`/`{n}` placeholders; `{{` and `}}` are literal braces.
///
/// Anything after `:` or `!` inside a placeholder is ignored. Placeholders
/// with no matching argument are left as written.
fn format_positional(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_auto = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    field.push(next);
                }
                if !closed {
                    out.push('{');
                    out.push_str(&field);
                    continue;
                }

                let name = field.split([':', '!']).next().unwrap_or_default();
                let index = if name.is_empty() {
                    let i = next_auto;
                    next_auto += 1;
                    Some(i)
                } else {
                    name.trim().parse::<usize>().ok()
                };

                match index.and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('{');
                        out.push_str(&field);
                        out.push('}');
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

fn pretty_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
