//! Users, attribute bags and rule configurations shared by the scenarios.

use group_sync::UserIdentity;
use serde_json::{Value, json};

pub fn user() -> UserIdentity {
    UserIdentity::new(42, "SyncTestUser")
}

/// Decoded OIDC access token as sent by a Keycloak-style provider.
pub fn oidc_token() -> Value {
    json!({
        "sub": "0b8c1b6a",
        "preferred_username": "synctestuser",
        "realm_access": {
            "roles": ["admin", "jedi_master"]
        },
        "resource_access": {
            "wiki": { "roles": ["editor"] },
            "account": { "roles": ["manage-account"] }
        }
    })
}

/// LDAP-style attributes with distinguished names.
pub fn ldap_attributes() -> Value {
    json!({
        "uid": ["synctestuser"],
        "ou": ["OU=Scientists,DC=Example,DC=Com"],
        "memberOf": [
            "CN=Group_1,OU=ABC,DC=dc",
            "CN=Group_2,OU=ABC,DC=dc"
        ]
    })
}

/// Rule list as a host would store it in its configuration.
pub fn plugin_rules() -> Value {
    json!({
        "scientists": {
            "type": "mapgroups",
            "map": {
                "scientist": { "ou": "ou=scientists,dc=example,dc=com" },
                "mathematician": { "ou": "ou=mathematicians,dc=example,dc=com" }
            }
        },
        "ldap-groups": {
            "type": "syncall",
            "groupAttributeName": "memberOf",
            "filterPrefix": "ldap-",
            "groupNameModificationCallback": { "regex": "^ldap-CN=([^,]+),.*$", "replace": "ldap-$1" }
        }
    })
}
