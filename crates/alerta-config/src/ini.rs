//! A small INI reader for the Alerta client configuration file.
//!
//! The file is shared with the `alerta` command-line client, so the rules
//! here are the ones that client applies:
//!
//! - `[DEFAULT]` holds values inherited by every other section
//! - option names are case-insensitive (stored lowercased), section names are not
//! - `=` or `:` separates a name from its value, whichever comes first
//! - full-line comments start with `#` or `;`
//! - a line indented deeper than its option continues the previous value,
//!   keeping any blank lines in between; trailing blank lines are dropped
//! - duplicate sections and duplicate options within a section are errors

use std::collections::BTreeMap;

use crate::error::SyntaxError;

/// Name of the section whose values are inherited by all other sections.
pub const DEFAULT_SECTION: &str = "DEFAULT";

type Entries = BTreeMap<String, String>;

/// A parsed INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    defaults: Entries,
    sections: BTreeMap<String, Entries>,
}

impl IniDocument {
    /// Parses an INI document.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] naming the first offending line.
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        let mut doc = Self::default();
        let mut current: Option<String> = None;
        // Option the next continuation line would extend, with its indent.
        let mut last_option: Option<(String, usize)> = None;
        // Blank lines seen since that option's last line; kept only if the
        // value continues after them.
        let mut pending_blanks = 0usize;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                if last_option.is_some() {
                    pending_blanks += 1;
                }
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = raw.len() - raw.trim_start().len();

            if let (Some(section), Some((key, key_indent))) = (&current, &last_option) {
                if indent > *key_indent {
                    if let Some(value) = doc.entries_mut(section).get_mut(key) {
                        for _ in 0..=pending_blanks {
                            value.push('\n');
                        }
                        value.push_str(trimmed);
                    }
                    pending_blanks = 0;
                    continue;
                }
            }

            if trimmed.starts_with('[') {
                let Some(end) = trimmed.rfind(']') else {
                    return Err(SyntaxError::new(line_no, "unterminated section header"));
                };
                let name = trimmed[1..end].trim();
                if name.is_empty() {
                    return Err(SyntaxError::new(line_no, "empty section name"));
                }
                if name != DEFAULT_SECTION {
                    if doc.sections.contains_key(name) {
                        return Err(SyntaxError::new(
                            line_no,
                            format!("section {name:?} already exists"),
                        ));
                    }
                    doc.sections.insert(name.to_string(), Entries::new());
                }
                current = Some(name.to_string());
                last_option = None;
                pending_blanks = 0;
                continue;
            }

            let Some(section) = &current else {
                return Err(SyntaxError::new(
                    line_no,
                    "option found before any section header",
                ));
            };

            let Some(pos) = trimmed.find(['=', ':']) else {
                return Err(SyntaxError::new(
                    line_no,
                    "expected `name = value` or `name: value`",
                ));
            };
            let key = trimmed[..pos].trim().to_lowercase();
            if key.is_empty() {
                return Err(SyntaxError::new(line_no, "empty option name"));
            }
            let value = trimmed[pos + 1..].trim().to_string();

            let entries = doc.entries_mut(section);
            if entries.contains_key(&key) {
                return Err(SyntaxError::new(
                    line_no,
                    format!("option {key:?} in section {section:?} already exists"),
                ));
            }
            entries.insert(key.clone(), value);
            last_option = Some((key, indent));
            pending_blanks = 0;
        }

        Ok(doc)
    }

    fn entries_mut(&mut self, section: &str) -> &mut Entries {
        if section == DEFAULT_SECTION {
            &mut self.defaults
        } else {
            self.sections.entry(section.to_string()).or_default()
        }
    }

    /// Returns the values of the `[DEFAULT]` section.
    #[must_use]
    pub const fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Returns true if a section with this exact name exists.
    ///
    /// `DEFAULT` is never reported as a section.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Iterates over section names in sorted order, excluding `DEFAULT`.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Looks up an option, falling back to `[DEFAULT]` for regular sections.
    ///
    /// Returns `None` if the section does not exist or neither it nor
    /// `[DEFAULT]` defines the option.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        if section == DEFAULT_SECTION {
            return self.defaults.get(&key).map(String::as_str);
        }
        let entries = self.sections.get(section)?;
        entries
            .get(&key)
            .or_else(|| self.defaults.get(&key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SAMPLE: &str = "\
# shared settings
[DEFAULT]
endpoint = http://alerta.internal:8080/api
sslverify = no
Profile = production

; production cluster
[profile production]
endpoint: https://alerta.example.com/api
key = s3cr3t

[profile staging]
key = staging-key
";

    #[test]
    fn parses_defaults_and_sections() {
        let doc = IniDocument::parse(SAMPLE).unwrap();

        assert_eq!(doc.defaults().len(), 3);
        assert_eq!(doc.get(DEFAULT_SECTION, "sslverify"), Some("no"));
        assert!(doc.has_section("profile production"));
        assert!(doc.has_section("profile staging"));
        assert!(!doc.has_section(DEFAULT_SECTION));
        assert_eq!(
            doc.sections().collect::<Vec<_>>(),
            vec!["profile production", "profile staging"]
        );
    }

    #[test]
    fn option_names_are_case_insensitive() {
        let doc = IniDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "profile"), Some("production"));
        assert_eq!(doc.get(DEFAULT_SECTION, "PROFILE"), Some("production"));
    }

    #[test]
    fn sections_inherit_from_default() {
        let doc = IniDocument::parse(SAMPLE).unwrap();

        assert_eq!(
            doc.get("profile production", "endpoint"),
            Some("https://alerta.example.com/api")
        );
        assert_eq!(doc.get("profile production", "sslverify"), Some("no"));
        assert_eq!(
            doc.get("profile staging", "endpoint"),
            Some("http://alerta.internal:8080/api")
        );
        assert_eq!(doc.get("profile staging", "key"), Some("staging-key"));
    }

    #[test]
    fn missing_section_or_option_is_none() {
        let doc = IniDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.get("profile dev", "endpoint"), None);
        assert_eq!(doc.get("profile staging", "debug"), None);
    }

    #[test]
    fn first_delimiter_wins() {
        let doc = IniDocument::parse("[DEFAULT]\nendpoint = http://host:8080\n").unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "endpoint"), Some("http://host:8080"));

        let doc = IniDocument::parse("[DEFAULT]\nendpoint: http://host:8080\n").unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "endpoint"), Some("http://host:8080"));
    }

    #[test]
    fn empty_values_are_kept() {
        let doc = IniDocument::parse("[DEFAULT]\nkey =\n").unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "key"), Some(""));
    }

    #[test]
    fn indented_lines_continue_the_value() {
        let text = "[DEFAULT]\nkey = first\n    second\n  third\nendpoint = x\n";
        let doc = IniDocument::parse(text).unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "key"), Some("first\nsecond\nthird"));
        assert_eq!(doc.get(DEFAULT_SECTION, "endpoint"), Some("x"));
    }

    #[test]
    fn blank_lines_inside_a_value_are_kept() {
        let text = "[DEFAULT]\nkey = a\n\n    b\n\n\n    c\nother = d\n";
        let doc = IniDocument::parse(text).unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "key"), Some("a\n\nb\n\n\nc"));
        assert_eq!(doc.get(DEFAULT_SECTION, "other"), Some("d"));
    }

    #[test]
    fn trailing_blank_lines_end_the_value() {
        let text = "[DEFAULT]\nkey = a\n    b\n\n# note\nother = c\n\n[x]\n";
        let doc = IniDocument::parse(text).unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "key"), Some("a\nb"));
        assert_eq!(doc.get(DEFAULT_SECTION, "other"), Some("c"));
        assert!(doc.has_section("x"));
    }

    #[test]
    fn default_section_may_repeat() {
        let text = "[DEFAULT]\nkey = a\n[profile x]\nkey = b\n[DEFAULT]\ndebug = yes\n";
        let doc = IniDocument::parse(text).unwrap();
        assert_eq!(doc.get(DEFAULT_SECTION, "debug"), Some("yes"));
        assert_eq!(doc.get("profile x", "debug"), Some("yes"));
    }

    #[test]
    fn empty_document_is_valid() {
        let doc = IniDocument::parse("").unwrap();
        assert!(doc.defaults().is_empty());
        assert_eq!(doc.sections().count(), 0);
    }

    #[test_case("key = value\n", 1 ; "option before header")]
    #[test_case("[DEFAULT]\njust some text\n", 2 ; "missing delimiter")]
    #[test_case("[DEFAULT\nkey = value\n", 1 ; "unterminated header")]
    #[test_case("[]\n", 1 ; "empty section name")]
    #[test_case("[DEFAULT]\n = value\n", 2 ; "empty option name")]
    #[test_case("[a]\nk = 1\n[a]\n", 3 ; "duplicate section")]
    #[test_case("[a]\nk = 1\nK = 2\n", 3 ; "duplicate option")]
    fn rejects_malformed_input(text: &str, line: usize) {
        let err = IniDocument::parse(text).unwrap_err();
        assert_eq!(err.line, line);
    }

    #[test]
    fn rejects_non_ini_content() {
        let json = "{\n  \"endpoint\": \"http://localhost\"\n}\n";
        assert!(IniDocument::parse(json).is_err());
    }
}
