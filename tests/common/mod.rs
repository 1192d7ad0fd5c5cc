//! Common test utilities for group sync testing.

use group_sync::store::{InMemoryMembershipStore, MembershipStore};
use group_sync::UserIdentity;
use std::sync::Once;

pub mod fixtures;
pub mod stores;

static LOGGING: Once = Once::new();

/// Route `log` output through the test harness.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

/// Store holding `groups` for `user`.
pub fn store_with(user: &UserIdentity, groups: &[&str]) -> InMemoryMembershipStore {
    InMemoryMembershipStore::new().with_user_groups(user, groups.iter().copied())
}

/// Current groups of `user`, sorted.
pub fn groups_of(store: &dyn MembershipStore, user: &UserIdentity) -> Vec<String> {
    store
        .current_groups(user)
        .expect("in-memory store should be readable")
        .into_iter()
        .collect()
}

/// Assert that a result is an error whose message contains the given text.
#[macro_export]
macro_rules! assert_error_message_contains {
    ($result:expr, $text:expr) => {
        match $result {
            Ok(_) => panic!("Expected an error containing '{}'", $text),
            Err(e) => {
                let message = e.to_string();
                assert!(
                    message.contains($text),
                    "Error '{}' does not contain '{}'",
                    message,
                    $text
                );
            }
        }
    };
}
