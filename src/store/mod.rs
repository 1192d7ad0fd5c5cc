//! Membership store abstraction.
//!
//! The engine never persists groups itself. It reads a user's current groups,
//! computes the changes a rule wants, and hands each change to a
//! [`MembershipStore`] one group at a time.
//!
//! # Example Usage
//!
//! ```rust
//! use group_sync::store::{InMemoryMembershipStore, MembershipStore};
//! use group_sync::UserIdentity;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryMembershipStore::new();
//! let user = UserIdentity::new(1, "alice");
//!
//! store.add_to_group(&user, "editor")?;
//! assert!(store.current_groups(&user)?.contains("editor"));
//!
//! store.remove_from_group(&user, "editor")?;
//! assert!(store.current_groups(&user)?.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StoreError;
pub use in_memory::{InMemoryMembershipStore, InMemoryStoreStats, MembershipChange};

use crate::identity::UserIdentity;
use std::collections::BTreeSet;

/// A set of group names. Case-sensitive.
pub type GroupSet = BTreeSet<String>;

/// Backend holding local group membership.
///
/// Both write operations must be idempotent: adding a user to a group they
/// already hold, or removing them from a group they do not hold, is not an
/// error. The engine still avoids issuing such calls so that a repeated sync
/// with unchanged input makes no calls at all.
pub trait MembershipStore: Send + Sync {
    /// Groups the user currently belongs to.
    fn current_groups(&self, user: &UserIdentity) -> Result<GroupSet, StoreError>;

    /// Add the user to a group.
    fn add_to_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError>;

    /// Remove the user from a group.
    fn remove_from_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError>;

    /// Every group defined on the host, whether or not anyone belongs to it.
    fn all_known_groups(&self) -> Result<GroupSet, StoreError>;
}
