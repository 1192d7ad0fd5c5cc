//! Group sync rule configuration.
//!
//! Each identity plugin declares zero or more named group sync rules. A rule
//! is an option bag: a JSON object carrying a `type` tag plus options specific
//! to the processor that tag selects. Option keys are matched exactly first
//! and then case-insensitively, so `filterPrefix` and `filterprefix` name the
//! same option.
//!
//! Closures cannot travel inside JSON, so the bag also carries named
//! predicates and name callbacks. Options refer to them by name, e.g. a needle
//! written as `{"predicate": "numbered"}`.
//!
//! # Example Usage
//!
//! ```rust
//! use group_sync::{GroupSyncRule, RuleOptions};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = RuleOptions::from_value(json!({
//!     "type": "syncall",
//!     "groupAttributeName": "memberOf",
//!     "filterPrefix": "ldap-"
//! }))?;
//! let rule = GroupSyncRule::from_options("ldap", options);
//! assert_eq!(rule.type_tag()?, "syncall");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::error::{ConfigurationError, MatchEvaluationError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Predicate needle over the normalized values of one attribute.
pub type PredicateFn = dyn Fn(&[String]) -> Result<bool, MatchEvaluationError> + Send + Sync;

/// Callback rewriting an external group name into a local one.
pub type NameCallbackFn = dyn Fn(&str) -> String + Send + Sync;

/// Option key holding the processor type tag.
pub const TYPE_OPTION: &str = "type";

/// Options of a single group sync rule.
#[derive(Clone, Default)]
pub struct RuleOptions {
    values: Map<String, Value>,
    predicates: HashMap<String, Arc<PredicateFn>>,
    name_callbacks: HashMap<String, Arc<NameCallbackFn>>,
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from an already-parsed JSON object.
    ///
    /// `null` yields an empty bag; any other non-object is rejected.
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        match value {
            Value::Object(values) => Ok(Self {
                values,
                ..Self::default()
            }),
            Value::Null => Ok(Self::default()),
            other => Err(ConfigurationError::invalid(
                "<rule>",
                format!("expected an object, got {}", json_type_name(&other)),
            )),
        }
    }

    /// Set an option value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Register a predicate that needles can reference by name.
    pub fn with_predicate<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&[String]) -> Result<bool, MatchEvaluationError> + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Register a group name callback that options can reference by name.
    pub fn with_name_callback<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.name_callbacks.insert(name.into(), Arc::new(callback));
        self
    }

    /// Look up an option, exact key first, then ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).or_else(|| {
            self.values
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
    }

    /// Look up an option, treating an explicit `null` as unset.
    pub fn get_set(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|value| !value.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn predicate(&self, name: &str) -> Option<Arc<PredicateFn>> {
        self.predicates.get(name).cloned()
    }

    pub fn name_callback(&self, name: &str) -> Option<Arc<NameCallbackFn>> {
        self.name_callbacks.get(name).cloned()
    }

    /// String option, or `default` when unset.
    pub fn string_or(&self, key: &str, default: &str) -> Result<String, ConfigurationError> {
        Ok(self
            .optional_string(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// String option that may be unset.
    pub fn optional_string(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        match self.get_set(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(ConfigurationError::invalid(
                key,
                format!("expected a string, got {}", json_type_name(other)),
            )),
        }
    }

    /// Boolean option, or `default` when unset.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigurationError> {
        match self.get_set(key) {
            None => Ok(default),
            Some(Value::Bool(value)) => Ok(*value),
            Some(other) => Err(ConfigurationError::invalid(
                key,
                format!("expected a boolean, got {}", json_type_name(other)),
            )),
        }
    }

    /// List-of-strings option, or `default` when unset.
    pub fn string_list_or(
        &self,
        key: &str,
        default: &[&str],
    ) -> Result<Vec<String>, ConfigurationError> {
        match self.get_set(key) {
            None => Ok(default.iter().map(|item| item.to_string()).collect()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(value) => Ok(value.clone()),
                    other => Err(ConfigurationError::invalid(
                        key,
                        format!("expected a list of strings, found {}", json_type_name(other)),
                    )),
                })
                .collect(),
            Some(other) => Err(ConfigurationError::invalid(
                key,
                format!("expected a list of strings, got {}", json_type_name(other)),
            )),
        }
    }

    /// Delimiter option: unset means "values are already lists".
    pub fn delimiter(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        match self.optional_string(key)? {
            Some(delimiter) if delimiter.is_empty() => Err(ConfigurationError::invalid(
                key,
                "delimiter must not be empty",
            )),
            delimiter => Ok(delimiter),
        }
    }
}

impl fmt::Debug for RuleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleOptions")
            .field("values", &self.values)
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .field("name_callbacks", &self.name_callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A named group sync rule as declared by an identity plugin.
#[derive(Debug, Clone)]
pub struct GroupSyncRule {
    name: String,
    options: RuleOptions,
}

impl GroupSyncRule {
    /// Create a rule with an explicit type tag.
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>, options: RuleOptions) -> Self {
        let type_tag: String = type_tag.into();
        Self {
            name: name.into(),
            options: options.with(TYPE_OPTION, type_tag),
        }
    }

    /// Create a rule whose type tag, if any, is already in `options`.
    pub fn from_options(name: impl Into<String>, options: RuleOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Parse an ordered `{ name: { type, ...options } }` object into rules.
    pub fn list_from_value(value: Value) -> Result<Vec<Self>, ConfigurationError> {
        match value {
            Value::Object(rules) => rules
                .into_iter()
                .map(|(name, options)| -> Result<Self, ConfigurationError> {
                    Ok(Self::from_options(name, RuleOptions::from_value(options)?))
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(ConfigurationError::invalid(
                "groupsyncs",
                format!("expected an object, got {}", json_type_name(&other)),
            )),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &RuleOptions {
        &self.options
    }

    /// The processor type tag declared by this rule.
    pub fn type_tag(&self) -> Result<&str, ConfigurationError> {
        match self.options.get_set(TYPE_OPTION) {
            Some(Value::String(tag)) => Ok(tag),
            Some(other) => Err(ConfigurationError::invalid(
                TYPE_OPTION,
                format!("expected a string, got {}", json_type_name(other)),
            )),
            None => Err(ConfigurationError::MissingType {
                rule: self.name.clone(),
            }),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
