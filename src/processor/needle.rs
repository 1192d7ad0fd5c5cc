//! Needles tested against attribute values by [`MapGroups`](super::MapGroups).

use crate::config::{PredicateFn, RuleOptions, json_type_name};
use crate::error::{ConfigurationError, MatchEvaluationError};
use crate::normalize::normalize_value;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A value or test matched against the normalized values of one attribute.
#[derive(Clone)]
pub enum Needle {
    /// Matches when the normalized literal is among the values.
    Literal(String),
    /// Matches when any value matches the pattern.
    Pattern(Regex),
    /// Arbitrary test over the full list of values.
    Predicate(Arc<PredicateFn>),
}

impl Needle {
    pub fn literal(value: impl Into<String>) -> Self {
        Needle::Literal(value.into())
    }

    /// Compile a regular expression needle.
    ///
    /// Values are lower-cased before matching, so the pattern is compiled
    /// case-insensitively.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Needle::Pattern)
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&[String]) -> Result<bool, MatchEvaluationError> + Send + Sync + 'static,
    {
        Needle::Predicate(Arc::new(predicate))
    }

    /// Test the needle against already-normalized values.
    pub fn matches(&self, values: &[String]) -> Result<bool, MatchEvaluationError> {
        match self {
            Needle::Literal(literal) => {
                let needle = normalize_value(literal);
                Ok(values.iter().any(|value| *value == needle))
            }
            Needle::Pattern(regex) => Ok(values.iter().any(|value| regex.is_match(value))),
            Needle::Predicate(predicate) => predicate(values),
        }
    }

    /// Parse one needle, or a list of them, from an option value.
    ///
    /// Accepted forms: a string or number (literal), `{"regex": "..."}`, and
    /// `{"predicate": "<name>"}` naming a predicate registered on `options`.
    pub fn list_from_value(
        option: &str,
        value: &Value,
        options: &RuleOptions,
    ) -> Result<Vec<Needle>, ConfigurationError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| Self::from_value(option, item, options))
                .collect(),
            single => Ok(vec![Self::from_value(option, single, options)?]),
        }
    }

    fn from_value(
        option: &str,
        value: &Value,
        options: &RuleOptions,
    ) -> Result<Needle, ConfigurationError> {
        match value {
            Value::String(literal) => Ok(Needle::literal(literal.clone())),
            Value::Number(number) => Ok(Needle::literal(number.to_string())),
            Value::Object(fields) => {
                if let Some(pattern) = fields.get("regex") {
                    let pattern = pattern.as_str().ok_or_else(|| {
                        ConfigurationError::invalid(option, "regex needle must be a string")
                    })?;
                    Needle::pattern(pattern).map_err(|e| {
                        ConfigurationError::invalid(option, format!("invalid regex {}: {}", pattern, e))
                    })
                } else if let Some(name) = fields.get("predicate") {
                    let name = name.as_str().ok_or_else(|| {
                        ConfigurationError::invalid(option, "predicate needle must name a predicate")
                    })?;
                    options
                        .predicate(name)
                        .map(Needle::Predicate)
                        .ok_or_else(|| ConfigurationError::UnknownPredicate {
                            option: option.to_string(),
                            name: name.to_string(),
                        })
                } else {
                    Err(ConfigurationError::invalid(
                        option,
                        "needle objects need a 'regex' or 'predicate' key",
                    ))
                }
            }
            other => Err(ConfigurationError::invalid(
                option,
                format!("unsupported needle: {}", json_type_name(other)),
            )),
        }
    }
}

impl fmt::Debug for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Needle::Literal(literal) => f.debug_tuple("Literal").field(literal).finish(),
            Needle::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Needle::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Needle {
    fn from(literal: &str) -> Self {
        Needle::literal(literal)
    }
}

impl From<String> for Needle {
    fn from(literal: String) -> Self {
        Needle::Literal(literal)
    }
}

impl From<Regex> for Needle {
    fn from(regex: Regex) -> Self {
        Needle::Pattern(regex)
    }
}
