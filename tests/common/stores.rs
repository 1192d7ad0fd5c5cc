//! Membership stores that fail on demand or count their reads.

use group_sync::store::{GroupSet, InMemoryMembershipStore, MembershipStore, StoreError};
use group_sync::UserIdentity;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps an in-memory store and fails selected operations.
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    inner: InMemoryMembershipStore,
    unavailable: bool,
    rejected_group: Option<String>,
}

impl FailingStore {
    pub fn new(inner: InMemoryMembershipStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Fail every read.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Reject adds and removes of `group`.
    pub fn rejecting(mut self, group: impl Into<String>) -> Self {
        self.rejected_group = Some(group.into());
        self
    }

    pub fn inner(&self) -> &InMemoryMembershipStore {
        &self.inner
    }

    fn check(&self, operation: &str, user: &UserIdentity, group: &str) -> Result<(), StoreError> {
        match &self.rejected_group {
            Some(rejected) if rejected == group => Err(StoreError::rejected(
                operation,
                user.name(),
                group,
                "group is protected",
            )),
            _ => Ok(()),
        }
    }
}

impl MembershipStore for FailingStore {
    fn current_groups(&self, user: &UserIdentity) -> Result<GroupSet, StoreError> {
        if self.unavailable {
            return Err(StoreError::unavailable("directory offline"));
        }
        self.inner.current_groups(user)
    }

    fn add_to_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError> {
        self.check("add", user, group)?;
        self.inner.add_to_group(user, group)
    }

    fn remove_from_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError> {
        self.check("remove", user, group)?;
        self.inner.remove_from_group(user, group)
    }

    fn all_known_groups(&self) -> Result<GroupSet, StoreError> {
        if self.unavailable {
            return Err(StoreError::unavailable("directory offline"));
        }
        self.inner.all_known_groups()
    }
}

/// Wraps an in-memory store and counts `all_known_groups` calls.
#[derive(Debug, Clone, Default)]
pub struct CountingStore {
    inner: InMemoryMembershipStore,
    known_group_fetches: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: InMemoryMembershipStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn known_group_fetches(&self) -> usize {
        self.known_group_fetches.load(Ordering::SeqCst)
    }
}

impl MembershipStore for CountingStore {
    fn current_groups(&self, user: &UserIdentity) -> Result<GroupSet, StoreError> {
        self.inner.current_groups(user)
    }

    fn add_to_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError> {
        self.inner.add_to_group(user, group)
    }

    fn remove_from_group(&self, user: &UserIdentity, group: &str) -> Result<(), StoreError> {
        self.inner.remove_from_group(user, group)
    }

    fn all_known_groups(&self) -> Result<GroupSet, StoreError> {
        self.known_group_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.all_known_groups()
    }
}
