//! Declarative field validation.
//!
//! A [`RuleSet`] lists the rules for each field; [`Validator::validate`]
//! evaluates all of them and collects every failure into a single
//! [`ValidationError`].

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use url::Url;

use crate::error::ValidationError;
use crate::fields::{FieldValue, Fields};
use crate::messages::{Locale, MessageKey};

/// A single validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Present and non-empty.
    Required,
    /// Required only when `field` holds `value`.
    RequiredIf { field: &'static str, value: &'static str },
    /// Parses as a decimal number.
    Numeric,
    /// One of the listed values.
    In(&'static [&'static str]),
    /// Parses with the given chrono format.
    DateFormat(&'static str),
    /// Absolute http(s) URL.
    Url,
    /// `true`, `false`, `1` or `0`.
    Boolean,
    /// A list value.
    Array,
    /// At least this many characters.
    MinLength(usize),
    /// Same number of elements as the named list field.
    SameSize(&'static str),
    /// Rules applied to every element of a list.
    Each(Vec<Rule>),
}

impl Rule {
    /// Short rule name used to key custom messages.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::RequiredIf { .. } => "required_if",
            Rule::Numeric => "numeric",
            Rule::In(_) => "in",
            Rule::DateFormat(_) => "date_format",
            Rule::Url => "url",
            Rule::Boolean => "boolean",
            Rule::Array => "array",
            Rule::MinLength(_) => "min",
            Rule::SameSize(_) => "same_size",
            Rule::Each(_) => "each",
        }
    }

    fn is_presence(&self) -> bool {
        matches!(self, Rule::Required | Rule::RequiredIf { .. })
    }

    fn default_message(&self) -> MessageKey {
        match self {
            Rule::Required | Rule::RequiredIf { .. } => MessageKey::FieldRequired,
            Rule::Numeric => MessageKey::FieldNumeric,
            Rule::In(_) => MessageKey::FieldNotInList,
            Rule::DateFormat(_) => MessageKey::FieldInvalidDate,
            Rule::Url => MessageKey::FieldInvalidUrl,
            Rule::Boolean => MessageKey::FieldNotBoolean,
            Rule::Array => MessageKey::FieldNotArray,
            Rule::MinLength(_) => MessageKey::FieldTooShort,
            Rule::SameSize(_) => MessageKey::FieldSizeMismatch,
            Rule::Each(_) => MessageKey::ValidationFailed,
        }
    }

    /// Check a single text value (used directly and for list elements).
    fn check_text(&self, text: &str) -> bool {
        match self {
            Rule::Numeric => is_numeric(text),
            Rule::In(values) => values.contains(&text),
            Rule::DateFormat(fmt) => NaiveDateTime::parse_from_str(text, fmt).is_ok(),
            Rule::Url => Url::parse(text)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
                .unwrap_or(false),
            Rule::Boolean => matches!(text, "1" | "0" | "true" | "false"),
            Rule::MinLength(n) => text.chars().count() >= *n,
            Rule::Required => !text.trim().is_empty(),
            _ => true,
        }
    }
}

fn is_numeric(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && (text.parse::<Decimal>().is_ok() || Decimal::from_scientific(text).is_ok())
}

/// Ordered rules per field, plus optional custom messages.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(&'static str, Vec<Rule>)>,
    messages: HashMap<(&'static str, &'static str), MessageKey>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.push((name, rules.into_iter().collect()));
        self
    }

    /// Override the detail message for `rule` failing on `field`.
    pub fn message(mut self, field: &'static str, rule: &'static str, key: MessageKey) -> Self {
        self.messages.insert((field, rule), key);
        self
    }
}

/// Evaluates a [`RuleSet`] against [`Fields`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    locale: Locale,
}

impl Validator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Validate `data` against `schema`. Every rule is evaluated so the
    /// error lists all failing fields, not only the first.
    pub fn validate(&self, data: &Fields, schema: &RuleSet) -> Result<(), ValidationError> {
        let mut errors: indexmap::IndexMap<String, Vec<String>> = indexmap::IndexMap::new();
        let mut only_presence = true;

        for (name, rules) in &schema.rules {
            for rule in rules {
                if self.passes(data, name, rule) {
                    continue;
                }
                only_presence &= rule.is_presence();
                let key = schema
                    .messages
                    .get(&(*name, rule.name()))
                    .copied()
                    .unwrap_or_else(|| rule.default_message());
                errors
                    .entry(name.to_string())
                    .or_default()
                    .push(key.text(self.locale).to_string());
                // Later rules on a missing field only repeat the same problem.
                if rule.is_presence() {
                    break;
                }
            }
        }

        if errors.is_empty() {
            return Ok(());
        }

        let general = if only_presence {
            MessageKey::RequiredFieldsNotProvided
        } else {
            MessageKey::ValidationFailed
        };
        tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "validation failed");
        Err(ValidationError::new(general.text(self.locale), errors))
    }

    fn passes(&self, data: &Fields, name: &str, rule: &Rule) -> bool {
        let value = data.get(name);
        let present = value.is_some_and(|v| !v.is_empty());

        match rule {
            Rule::Required => present,
            Rule::RequiredIf { field, value: expected } => {
                present || data.text(field) != *expected
            }
            // Optional fields that are absent satisfy every other rule.
            _ if !present => true,
            Rule::Array => matches!(value, Some(FieldValue::List(_))),
            Rule::SameSize(other) => {
                let len = value.and_then(FieldValue::as_list).map(<[String]>::len);
                let other_len = data
                    .get(other)
                    .and_then(FieldValue::as_list)
                    .map(<[String]>::len);
                len.is_some() && len == other_len
            }
            Rule::Each(inner) => match value {
                Some(FieldValue::List(items)) => items
                    .iter()
                    .all(|item| inner.iter().all(|r| r.check_text(item))),
                _ => false,
            },
            other => match value {
                Some(FieldValue::Text(text)) => other.check_text(text),
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> RuleSet {
        RuleSet::new()
            .field("amount", [Rule::Required, Rule::Numeric])
            .field("currency", [Rule::Required, Rule::In(&["USD", "UAH"])])
            .field("type", [Rule::In(&["buy", "subscribe"])])
            .field(
                "start",
                [
                    Rule::RequiredIf { field: "type", value: "subscribe" },
                    Rule::DateFormat("%Y-%m-%d %H:%M:%S"),
                ],
            )
            .field("server_url", [Rule::Url])
            .field("sandbox", [Rule::Boolean])
            .message("currency", "required", MessageKey::CurrencyIsNull)
    }

    #[test]
    fn valid_input_passes() {
        let data = Fields::new()
            .with("amount", "10.50")
            .with("currency", "UAH")
            .with("server_url", "https://shop.example.com/callback")
            .with("sandbox", "1");
        assert!(Validator::default().validate(&data, &schema()).is_ok());
    }

    #[test]
    fn missing_field_is_reported_with_custom_message() {
        let data = Fields::new().with("amount", 10);
        let err = Validator::default().validate(&data, &schema()).unwrap_err();

        assert_eq!(err.message, "Required fields not provided");
        assert_eq!(err.field("currency"), ["Currency is null".to_string()]);
        assert!(!err.has_field("amount"));
    }

    #[test]
    fn every_failing_field_is_collected() {
        let data = Fields::new()
            .with("amount", "ten")
            .with("currency", "GBP")
            .with("server_url", "not a url")
            .with("sandbox", "maybe");
        let err = Validator::default().validate(&data, &schema()).unwrap_err();

        assert_eq!(err.message, "Validation failed");
        for field in ["amount", "currency", "server_url", "sandbox"] {
            assert!(err.has_field(field), "{field} should fail");
        }
    }

    #[test]
    fn required_if_only_applies_when_condition_matches() {
        let base = Fields::new().with("amount", 1).with("currency", "USD");

        let buy = base.clone().with("type", "buy");
        assert!(Validator::default().validate(&buy, &schema()).is_ok());

        let subscribe = base.clone().with("type", "subscribe");
        let err = Validator::default().validate(&subscribe, &schema()).unwrap_err();
        assert!(err.has_field("start"));

        let dated = subscribe.with("start", "2024-01-31 12:00:00");
        assert!(Validator::default().validate(&dated, &schema()).is_ok());
    }

    #[test]
    fn date_format_is_strict() {
        let data = Fields::new()
            .with("amount", 1)
            .with("currency", "USD")
            .with("start", "31.01.2024");
        let err = Validator::default().validate(&data, &schema()).unwrap_err();
        assert_eq!(err.field("start"), ["Field is not a valid date".to_string()]);
    }

    #[test]
    fn list_rules_check_each_element_and_size() {
        let schema = RuleSet::new()
            .field("names", [Rule::Required, Rule::Array])
            .field(
                "counts",
                [
                    Rule::Required,
                    Rule::Array,
                    Rule::SameSize("names"),
                    Rule::Each(vec![Rule::Numeric]),
                ],
            );

        let ok = Fields::new()
            .with("names", vec!["A", "B"])
            .with("counts", vec!["1", "2"]);
        assert!(Validator::default().validate(&ok, &schema).is_ok());

        let bad_element = Fields::new()
            .with("names", vec!["A", "B"])
            .with("counts", vec!["1", "x"]);
        assert!(Validator::default().validate(&bad_element, &schema).is_err());

        let short = Fields::new()
            .with("names", vec!["A", "B"])
            .with("counts", vec!["1"]);
        let err = Validator::default().validate(&short, &schema).unwrap_err();
        assert_eq!(err.field("counts"), ["Field size does not match".to_string()]);

        let scalar = Fields::new().with("names", "A").with("counts", vec!["1"]);
        let err = Validator::default().validate(&scalar, &schema).unwrap_err();
        assert!(err.has_field("names"));
    }

    #[test]
    fn messages_follow_locale() {
        let err = Validator::new(Locale::Ru)
            .validate(&Fields::new(), &schema())
            .unwrap_err();
        assert_eq!(err.message, "Не заданы обязательные поля");
        assert_eq!(err.field("currency"), ["Валюта не может быть пустой".to_string()]);
    }
}
