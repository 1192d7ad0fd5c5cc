//! Error types for group synchronization.
//!
//! Errors are split by concern: configuration problems found while building a
//! processor, predicate failures while matching needles, and failures reported
//! by the membership store. [`GroupSyncError`] wraps the ones that can escape
//! a single rule.

use crate::store::StoreError;

/// Main error type for a single group sync rule.
///
/// The runner catches these per rule, so a failing rule never stops the
/// remaining rules from running.
#[derive(Debug, thiserror::Error)]
pub enum GroupSyncError {
    /// The rule or its options could not be turned into a processor
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The membership store failed while reading or writing groups
    #[error("Membership store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for group sync operations.
pub type GroupSyncResult<T> = Result<T, GroupSyncError>;

/// Errors raised while reading a rule's option bag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The rule does not declare a `type`
    #[error("No type set for '{rule}' groupsync")]
    MissingType { rule: String },

    /// No processor is registered under the requested type tag
    #[error("No processor registered for type '{type_tag}'")]
    UnknownType { type_tag: String },

    /// A required option is absent
    #[error("Required option '{option}' is missing")]
    MissingOption { option: String },

    /// An option is present but has the wrong shape or value
    #[error("Option '{option}' is invalid: {message}")]
    InvalidOption { option: String, message: String },

    /// A needle references a predicate that was never registered
    #[error("Unknown predicate '{name}' referenced by option '{option}'")]
    UnknownPredicate { option: String, name: String },

    /// A name callback was referenced but never registered
    #[error("Unknown callback '{name}' referenced by option '{option}'")]
    UnknownCallback { option: String, name: String },
}

impl ConfigurationError {
    /// Create an invalid option error.
    pub fn invalid(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            message: message.into(),
        }
    }
}

/// A predicate needle failed while evaluating attribute values.
///
/// Processors log this and treat the needle as not matching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Needle evaluation failed: {message}")]
pub struct MatchEvaluationError {
    message: String,
}

impl MatchEvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
