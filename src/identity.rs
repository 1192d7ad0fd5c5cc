//! Users and the identity plugins that describe them.
//!
//! An identity plugin is whatever authenticated the user (SAML, OpenID
//! Connect, LDAP, CAS). After login it hands the engine two things: the group
//! sync rules configured for it, and a loosely structured attribute bag for
//! the user.

use crate::config::GroupSyncRule;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Attribute data supplied by an identity plugin for one user.
///
/// Usually a JSON object mapping attribute names to scalars, lists, or nested
/// objects. The engine only reads it.
pub type AttributeBag = Value;

/// The local user whose groups are being synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    id: u64,
    name: String,
}

impl UserIdentity {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An external identity source as seen by the group sync runner.
///
/// # Example Implementation
///
/// ```rust
/// use group_sync::{AttributeBag, GroupSyncRule, IdentityPlugin, RuleOptions, UserIdentity};
/// use serde_json::json;
///
/// struct HeaderPlugin;
///
/// impl IdentityPlugin for HeaderPlugin {
///     fn group_syncs(&self) -> Vec<GroupSyncRule> {
///         vec![GroupSyncRule::new("all", "syncall", RuleOptions::new())]
///     }
///
///     fn attributes(&self, _user: &UserIdentity) -> AttributeBag {
///         json!({ "groups": ["editor"] })
///     }
/// }
/// ```
pub trait IdentityPlugin {
    /// Group sync rules configured for this plugin, in processing order.
    fn group_syncs(&self) -> Vec<GroupSyncRule>;

    /// Attribute bag for the given user.
    fn attributes(&self, user: &UserIdentity) -> AttributeBag;
}

/// Identity plugin backed by fixed rules and per-user attributes.
///
/// Useful for tests and for hosts that receive attributes out of band and
/// only need the engine to apply them.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityPlugin {
    rules: Vec<GroupSyncRule>,
    attributes: HashMap<String, AttributeBag>,
}

impl StaticIdentityPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group sync rule.
    pub fn with_group_sync(mut self, rule: GroupSyncRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the attribute bag returned for a user name.
    pub fn with_attributes(mut self, user_name: impl Into<String>, attributes: AttributeBag) -> Self {
        self.attributes.insert(user_name.into(), attributes);
        self
    }
}

impl IdentityPlugin for StaticIdentityPlugin {
    fn group_syncs(&self) -> Vec<GroupSyncRule> {
        self.rules.clone()
    }

    fn attributes(&self, user: &UserIdentity) -> AttributeBag {
        self.attributes
            .get(user.name())
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }
}
