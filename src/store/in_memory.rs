//! In-memory membership store.
//!
//! This module provides a thread-safe in-memory implementation of the
//! [`MembershipStore`] trait using a `HashMap` behind an `RwLock`. It is meant
//! for testing, development, and hosts that rebuild membership on every start.
//!
//! # Features
//!
//! * Thread-safe access through `std::sync::RwLock`
//! * Separate registry of defined groups for `all_known_groups`
//! * Journal of every add/remove call, useful for asserting idempotence
//!
//! # Example Usage
//!
//! ```rust
//! use group_sync::store::{InMemoryMembershipStore, MembershipChange, MembershipStore};
//! use group_sync::UserIdentity;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user = UserIdentity::new(7, "alice");
//! let store = InMemoryMembershipStore::new()
//!     .with_known_groups(["sysop", "editor"])
//!     .with_user_groups(&user, ["sysop"]);
//!
//! store.add_to_group(&user, "editor")?;
//! assert_eq!(
//!     store.changes(),
//!     vec![MembershipChange::Added {
//!         user: "alice".to_string(),
//!         group: "editor".to_string()
//!     }]
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::identity::UserIdentity;
use crate::store::{GroupSet, MembershipStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A single add or remove call received by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    Added { user: String, group: String },
    Removed { user: String, group: String },
}

#[derive(Debug, Default)]
struct StoreState {
    // user name -> groups
    memberships: HashMap<String, GroupSet>,
    known_groups: GroupSet,
    changes: Vec<MembershipChange>,
}

/// Thread-safe in-memory membership store.
///
/// Cloning shares the underlying state, so a clone handed to the engine and
/// one kept by a test observe the same membership.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryMembershipStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define groups that exist on the host.
    pub fn with_known_groups<I, G>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        if let Ok(mut state) = self.state.write() {
            state.known_groups.extend(groups.into_iter().map(Into::into));
        }
        self
    }

    /// Seed a user's membership without recording changes.
    pub fn with_user_groups<I, G>(self, user: &UserIdentity, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        if let Ok(mut state) = self.state.write() {
            state
                .memberships
                .entry(user.name().to_string())
                .or_default()
                .extend(groups.into_iter().map(Into::into));
        }
        self
    }

    /// All add/remove calls received so far, in order.
    pub fn changes(&self) -> Vec<MembershipChange> {
        self.state
            .read()
            .map(|state| state.changes.clone())
            .unwrap_or_default()
    }

    /// Forget recorded calls, keeping membership intact.
    pub fn clear_changes(&self) {
        if let Ok(mut state) = self.state.write() {
            state.changes.clear();
        }
    }

    /// Get store statistics for debugging and monitoring.
    pub fn stats(&self) -> InMemoryStoreStats {
        match self.state.read() {
            Ok(state) => InMemoryStoreStats {
                user_count: state.memberships.len(),
                membership_count: state.memberships.values().map(|groups| groups.len()).sum(),
                known_group_count: state.known_groups.len(),
                recorded_changes: state.changes.len(),
            },
            Err(_) => InMemoryStoreStats::default(),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::unavailable("membership lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::unavailable("membership lock poisoned"))
    }
}

impl MembershipStore for InMemoryMembershipStore {
    fn current_groups(&self, user: &UserIdentity) -> Result<GroupSet, StoreError> {
        let state = self.read()?;
        Ok(state
            .memberships
            .get(user.name())
            .cloned()
            .unwrap_or_default())
    }

    fn add_to_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state
            .memberships
            .entry(user.name().to_string())
            .or_default()
            .insert(group.to_string());
        state.changes.push(MembershipChange::Added {
            user: user.name().to_string(),
            group: group.to_string(),
        });
        Ok(())
    }

    fn remove_from_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if let Some(groups) = state.memberships.get_mut(user.name()) {
            groups.remove(group);
        }
        state.changes.push(MembershipChange::Removed {
            user: user.name().to_string(),
            group: group.to_string(),
        });
        Ok(())
    }

    fn all_known_groups(&self) -> Result<GroupSet, StoreError> {
        Ok(self.read()?.known_groups.clone())
    }
}

/// Statistics about the current state of the in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStoreStats {
    /// Number of users with a membership entry
    pub user_count: usize,
    /// Total number of (user, group) pairs
    pub membership_count: usize,
    /// Number of defined groups
    pub known_group_count: usize,
    /// Number of add/remove calls recorded
    pub recorded_changes: usize,
}
