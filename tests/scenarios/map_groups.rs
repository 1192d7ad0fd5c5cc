//! MapGroups scenarios.

use crate::common::{fixtures, groups_of, init_logging, store_with};
use group_sync::processor::{GroupProcessor, MapGroups, MapGroupsConfig};
use group_sync::store::MembershipChange;
use group_sync::{Needle, RuleOptions};
use serde_json::json;

fn default_processor() -> MapGroups {
    MapGroups::new(
        MapGroupsConfig::new()
            .map_group("sysop", "groups", "administrator")
            .map_group("bureaucrat", "groups", "bureaucrat"),
    )
}

#[test]
fn test_grants_matching_and_ignores_unmapped() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &["abc", "bureaucrat"]);

    default_processor()
        .run(&user, &json!({ "groups": ["administrator", "dontsync"] }), &store)
        .unwrap();

    assert_eq!(groups_of(&store, &user), vec!["abc", "sysop"]);
}

#[test]
fn test_repeated_run_makes_no_calls() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &["abc"]);
    let attributes = json!({ "groups": ["administrator"] });
    let processor = default_processor();

    processor.run(&user, &attributes, &store).unwrap();
    assert_eq!(
        store.changes(),
        vec![MembershipChange::Added {
            user: user.name().to_string(),
            group: "sysop".to_string()
        }]
    );

    store.clear_changes();
    let changes = processor.run(&user, &attributes, &store).unwrap();
    assert!(changes.is_empty());
    assert!(store.changes().is_empty());
}

#[test]
fn test_ldap_distinguished_names_match_case_insensitively() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &["mathematician"]);
    let processor = MapGroups::new(
        MapGroupsConfig::new()
            .map_group("scientist", "ou", "ou=scientists,dc=example,dc=com")
            .map_group("mathematician", "ou", "ou=mathematicians,dc=example,dc=com"),
    );

    processor
        .run(&user, &fixtures::ldap_attributes(), &store)
        .unwrap();

    assert_eq!(groups_of(&store, &user), vec!["scientist"]);
}

#[test]
fn test_any_attribute_may_grant() {
    init_logging();
    let user = fixtures::user();
    let processor = MapGroups::new(
        MapGroupsConfig::new()
            .map_group("editor", "groups", "editors")
            .map_group("editor", "uid", "synctestuser"),
    );

    let store = store_with(&user, &[]);
    processor
        .run(&user, &json!({ "uid": "SyncTestUser" }), &store)
        .unwrap();
    assert_eq!(groups_of(&store, &user), vec!["editor"]);
}

#[test]
fn test_delimited_single_value() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &[]);
    let processor = MapGroups::new(
        MapGroupsConfig::new()
            .with_delimiter(",")
            .map_group("sysop", "groups", "administrator")
            .map_group("interface-admin", "groups", "interface"),
    );

    processor
        .run(&user, &json!({ "groups": "dontsync,Administrator" }), &store)
        .unwrap();

    assert_eq!(groups_of(&store, &user), vec!["sysop"]);
}

#[test]
fn test_add_only_group_survives_lost_attribute() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &["sysop", "bureaucrat"]);
    let processor = MapGroups::new(
        MapGroupsConfig::new()
            .map_group("sysop", "groups", "administrator")
            .map_group("bureaucrat", "groups", "bureaucrat")
            .with_add_only("sysop"),
    );

    processor.run(&user, &json!({}), &store).unwrap();

    assert_eq!(groups_of(&store, &user), vec!["sysop"]);
}

#[test]
fn test_regex_and_predicate_needles() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &[]);
    let processor = MapGroups::new(
        MapGroupsConfig::new()
            .map_needles("staff", "email", [Needle::pattern(r"@example\.com$").unwrap()])
            .map_needles(
                "multi-role",
                "roles",
                [Needle::predicate(|values| Ok(values.len() > 1))],
            ),
    );

    processor
        .run(
            &user,
            &json!({ "email": "Sync@Example.com", "roles": ["a", "b"] }),
            &store,
        )
        .unwrap();

    assert_eq!(groups_of(&store, &user), vec!["multi-role", "staff"]);
}

#[test]
fn test_upper_case_regex_matches_distinguished_names() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &[]);
    let processor = MapGroups::new(
        MapGroupsConfig::new().map_needles("staff", "ou", [Needle::pattern("^OU=Staff").unwrap()]),
    );

    processor
        .run(&user, &json!({ "ou": ["OU=Staff,DC=x"] }), &store)
        .unwrap();

    assert_eq!(groups_of(&store, &user), vec!["staff"]);
}

#[test]
fn test_from_options_with_registered_predicate() {
    init_logging();
    let user = fixtures::user();
    let store = store_with(&user, &["wiki-admin"]);
    let options = RuleOptions::from_value(json!({
        "map": {
            "wiki-admin": { "roles": { "predicate": "has_admin" } },
            "wiki-reader": { "roles": [{ "regex": "^read" }, "viewer"] }
        },
        "AddOnlyGroups": ["wiki-reader"]
    }))
    .unwrap()
    .with_predicate("has_admin", |values| {
        Ok(values.iter().any(|value| value == "admin"))
    });

    let processor = MapGroups::from_options(&options).unwrap();
    assert!(processor.config().add_only_groups().contains("wiki-reader"));

    processor
        .run(&user, &json!({ "roles": ["viewer"] }), &store)
        .unwrap();

    assert_eq!(groups_of(&store, &user), vec!["wiki-reader"]);
}
