//! Group processors.
//!
//! A processor turns a user's attribute bag into membership changes. Two
//! processors ship with the crate:
//!
//! * [`MapGroups`] (`mapgroups`) grants or revokes each configured local group
//!   depending on whether attribute values match that group's needles.
//! * [`SyncAllGroups`] (`syncall`) mirrors an external group list into local
//!   membership, within the set of groups the rule owns.
//!
//! Processors work in two phases. [`GroupProcessor::plan`] reads from the
//! store and computes [`GroupChanges`] without side effects;
//! [`GroupChanges::apply`] then issues the add and remove calls. Changes are
//! computed against current membership, so running a processor twice with
//! unchanged input makes no calls the second time.

pub mod factory;
pub mod map_groups;
pub mod needle;
pub mod sync_all_groups;

pub use factory::{GroupProcessorFactory, ProcessorConstructor};
pub use map_groups::{GroupMapping, MapGroups, MapGroupsConfig};
pub use needle::Needle;
pub use sync_all_groups::{GroupAttributeSource, SyncAllGroups, SyncAllGroupsConfig};

use crate::error::GroupSyncResult;
use crate::identity::{AttributeBag, UserIdentity};
use crate::store::{GroupSet, MembershipStore, StoreError};
use log::debug;

/// Common interface of all group processors.
pub trait GroupProcessor: Send + Sync {
    /// Compute the membership changes for `user` without applying them.
    fn plan(
        &self,
        user: &UserIdentity,
        attributes: &AttributeBag,
        store: &dyn MembershipStore,
    ) -> GroupSyncResult<GroupChanges>;

    /// Plan and apply, returning what was applied.
    fn run(
        &self,
        user: &UserIdentity,
        attributes: &AttributeBag,
        store: &dyn MembershipStore,
    ) -> GroupSyncResult<GroupChanges> {
        let changes = self.plan(user, attributes, store)?;
        changes.apply(user, store)?;
        Ok(changes)
    }
}

/// Groups to add and remove for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupChanges {
    to_add: GroupSet,
    to_remove: GroupSet,
}

impl GroupChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an addition. Cancels a pending removal of the same group.
    pub fn add(&mut self, group: impl Into<String>) {
        let group = group.into();
        self.to_remove.remove(&group);
        self.to_add.insert(group);
    }

    /// Schedule a removal. Cancels a pending addition of the same group.
    pub fn remove(&mut self, group: impl Into<String>) {
        let group = group.into();
        self.to_add.remove(&group);
        self.to_remove.insert(group);
    }

    pub fn to_add(&self) -> &GroupSet {
        &self.to_add
    }

    pub fn to_remove(&self) -> &GroupSet {
        &self.to_remove
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Total number of store calls applying these changes will make.
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    /// Keep only the changes whose group satisfies `keep`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.to_add.retain(|group| keep(group));
        self.to_remove.retain(|group| keep(group));
    }

    /// Issue the add calls, then the remove calls.
    ///
    /// Stops at the first store error; calls already made stay applied.
    pub fn apply(&self, user: &UserIdentity, store: &dyn MembershipStore) -> Result<(), StoreError> {
        for group in &self.to_add {
            debug!("Adding '{}' to group '{}'", user, group);
            store.add_to_group(user, group)?;
        }
        for group in &self.to_remove {
            debug!("Removing '{}' from group '{}'", user, group);
            store.remove_from_group(user, group)?;
        }
        Ok(())
    }
}
