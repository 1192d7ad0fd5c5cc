//! Membership store error types.
//!
//! These errors describe failures of the backend holding group membership.
//! They carry no knowledge of sync rules; the runner attaches the rule name
//! when it logs them.

/// Errors that can occur while reading or changing group membership.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend is temporarily unavailable.
    #[error("Membership store unavailable: {message}")]
    Unavailable { message: String },

    /// The user is not known to the backend.
    #[error("Unknown user: {user}")]
    UnknownUser { user: String },

    /// The backend refused a membership change.
    #[error("Cannot {operation} '{group}' for '{user}': {reason}")]
    Rejected {
        operation: String,
        user: String,
        group: String,
        reason: String,
    },

    /// Generic internal backend error.
    #[error("Internal membership store error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a rejected-change error.
    pub fn rejected(
        operation: impl Into<String>,
        user: impl Into<String>,
        group: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            operation: operation.into(),
            user: user.into(),
            group: group.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error wrapping a backend error.
    pub fn internal<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}
