//! Property-based tests for the sync guarantees.
//!
//! Uses proptest to generate external group lists and starting memberships
//! from a small alphabet so that overlaps, prefixes and locally managed
//! groups occur often.

use crate::common::{fixtures, groups_of, store_with};
use group_sync::processor::{GroupProcessor, MapGroups, MapGroupsConfig, SyncAllGroups, SyncAllGroupsConfig};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

const FILTER_PREFIX: &str = "p-";

/// Strategy for group names, with and without the filter prefix.
fn group_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "a", "b", "c", "sysop", "p-a", "p-b", "p-sysop", "Editor",
    ])
    .prop_map(str::to_string)
}

fn group_list_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(group_name_strategy(), 0..6)
}

fn as_strs(groups: &[String]) -> Vec<&str> {
    groups.iter().map(String::as_str).collect()
}

proptest! {
    #[test]
    fn test_sync_all_groups_is_idempotent(
        external in group_list_strategy(),
        initial in group_list_strategy(),
        prefixed in any::<bool>(),
    ) {
        let user = fixtures::user();
        let store = store_with(&user, &as_strs(&initial));
        let config = if prefixed {
            SyncAllGroupsConfig::new().with_filter_prefix(FILTER_PREFIX)
        } else {
            SyncAllGroupsConfig::new()
        };
        let processor = SyncAllGroups::new(config);
        let attributes = json!({ "groups": external });

        processor.run(&user, &attributes, &store).unwrap();
        store.clear_changes();
        let second = processor.run(&user, &attributes, &store).unwrap();

        prop_assert!(second.is_empty());
        prop_assert!(store.changes().is_empty());
    }

    #[test]
    fn test_map_groups_is_idempotent(
        external in group_list_strategy(),
        initial in group_list_strategy(),
    ) {
        let user = fixtures::user();
        let store = store_with(&user, &as_strs(&initial));
        let processor = MapGroups::new(
            MapGroupsConfig::new()
                .map_group("a", "groups", "b")
                .map_group("sysop", "groups", "editor")
                .with_add_only("sysop"),
        );
        let attributes = json!({ "groups": external });

        processor.run(&user, &attributes, &store).unwrap();
        store.clear_changes();
        processor.run(&user, &attributes, &store).unwrap();

        prop_assert!(store.changes().is_empty());
    }

    #[test]
    fn test_filter_prefix_leaves_foreign_groups_alone(
        external in group_list_strategy(),
        initial in group_list_strategy(),
    ) {
        let user = fixtures::user();
        let store = store_with(&user, &as_strs(&initial));
        let processor = SyncAllGroups::new(
            SyncAllGroupsConfig::new().with_filter_prefix(FILTER_PREFIX),
        );

        processor
            .run(&user, &json!({ "groups": external }), &store)
            .unwrap();

        let foreign = |groups: Vec<String>| -> BTreeSet<String> {
            groups
                .into_iter()
                .filter(|group| !group.starts_with(FILTER_PREFIX))
                .collect()
        };
        prop_assert_eq!(foreign(groups_of(&store, &user)), foreign(initial));
    }

    #[test]
    fn test_add_only_group_is_never_removed(
        external in group_list_strategy(),
    ) {
        let user = fixtures::user();
        let store = store_with(&user, &["a"]);
        let processor = MapGroups::new(
            MapGroupsConfig::new()
                .map_group("a", "groups", "b")
                .with_add_only("a"),
        );

        processor
            .run(&user, &json!({ "groups": external }), &store)
            .unwrap();

        prop_assert!(groups_of(&store, &user).contains(&"a".to_string()));
    }

    #[test]
    fn test_locally_managed_membership_is_preserved(
        external in group_list_strategy(),
        initial in group_list_strategy(),
    ) {
        let user = fixtures::user();
        let store = store_with(&user, &as_strs(&initial));
        let processor = SyncAllGroups::default();

        processor
            .run(&user, &json!({ "groups": external }), &store)
            .unwrap();

        let had_sysop = initial.iter().any(|group| group == "sysop");
        let has_sysop = groups_of(&store, &user).iter().any(|group| group == "sysop");
        prop_assert_eq!(had_sysop, has_sysop);
    }

    #[test]
    fn test_delimited_value_matches_list(
        external in prop::collection::vec(group_name_strategy(), 1..6),
    ) {
        let listed = SyncAllGroups::default();
        let delimited = SyncAllGroups::new(SyncAllGroupsConfig::new().with_delimiter(","));

        prop_assert_eq!(
            listed.target_groups(&json!({ "groups": external })),
            delimited.target_groups(&json!({ "groups": [external.join(", ")] }))
        );
    }
}
