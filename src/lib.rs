//! Group synchronization engine for delegated authentication.
//!
//! After an external identity provider authenticates a user, the engine
//! reconciles the user's local group membership with the attributes the
//! provider returned. Each identity plugin declares a list of group sync
//! rules; each rule selects a processor by type tag and configures it.
//!
//! # Core Components
//!
//! - [`GroupProcessorRunner`] - Runs every rule of a plugin for one user
//! - [`MapGroups`] - Grants local groups when attribute values match
//! - [`SyncAllGroups`] - Mirrors an external group list into local groups
//! - [`MembershipStore`] - Trait for the host's group membership backend
//!
//! # Quick Start
//!
//! ```rust
//! use group_sync::store::InMemoryMembershipStore;
//! use group_sync::{GroupProcessorRunner, GroupSyncRule, MembershipStore, StaticIdentityPlugin, UserIdentity};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = GroupSyncRule::list_from_value(json!({
//!     "scientists": {
//!         "type": "mapgroups",
//!         "map": { "scientist": { "ou": "ou=scientists,dc=example,dc=com" } }
//!     }
//! }))?;
//!
//! let mut plugin = StaticIdentityPlugin::new()
//!     .with_attributes("alice", json!({ "ou": ["OU=Scientists,DC=Example,DC=Com"] }));
//! for rule in rules {
//!     plugin = plugin.with_group_sync(rule);
//! }
//!
//! let user = UserIdentity::new(1, "alice");
//! let store = InMemoryMembershipStore::new();
//! GroupProcessorRunner::default().run(&user, &plugin, &store);
//!
//! assert!(store.current_groups(&user)?.contains("scientist"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod attributes;
pub mod config;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod processor;
pub mod runner;
pub mod store;

// Re-export commonly used types for convenience
pub use config::{GroupSyncRule, RuleOptions};
pub use error::{ConfigurationError, GroupSyncError, GroupSyncResult, MatchEvaluationError};
pub use identity::{AttributeBag, IdentityPlugin, StaticIdentityPlugin, UserIdentity};
pub use processor::{
    GroupChanges, GroupProcessor, GroupProcessorFactory, MapGroups, Needle, SyncAllGroups,
};
pub use runner::{GroupProcessorRunner, RuleOutcome, SyncReport};
pub use store::{InMemoryMembershipStore, MembershipStore, StoreError};
