//! Attribute path resolution.
//!
//! Identity providers nest group data at different depths. An OpenID Connect
//! token from Keycloak keeps realm roles at `realm_access.roles`, while a SAML
//! assertion usually has a flat `groups` list. [`resolve_path`] walks a bag
//! along a path of keys and indices and always returns a flat list of leaves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One step of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key. On a list it is used as an index when it parses as one.
    Key(String),
    /// List index. On an object it is used as a key.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Walk `bag` along `path` and return the leaves found there.
///
/// A missing key, an out-of-range index, or a scalar where a container was
/// expected all resolve to an empty list. A final list is returned element by
/// element; any other final value is wrapped in a one-element list.
///
/// ```rust
/// use group_sync::attributes::{resolve_path, PathSegment};
/// use serde_json::json;
///
/// let bag = json!({ "realm_access": { "roles": ["admin", "jedi_master"] } });
/// let path = [PathSegment::from("realm_access"), PathSegment::from("roles")];
/// assert_eq!(resolve_path(&bag, &path), vec![json!("admin"), json!("jedi_master")]);
/// ```
pub fn resolve_path(bag: &Value, path: &[PathSegment]) -> Vec<Value> {
    let mut current = bag;

    for segment in path {
        let next = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get(key),
            (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
            (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
            (Value::Array(items), PathSegment::Key(key)) => key
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };

        match next {
            Some(value) => current = value,
            None => return Vec::new(),
        }
    }

    match current {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Resolve a single top-level attribute by name.
pub fn resolve_attribute(bag: &Value, name: &str) -> Option<Vec<Value>> {
    bag.as_object()?
        .contains_key(name)
        .then(|| resolve_path(bag, &[PathSegment::from(name)]))
}

/// Render a scalar leaf as a string.
///
/// Strings are returned as-is, numbers and booleans in their JSON spelling.
/// `null`, lists and objects have no string form.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Convert leaves to strings, dropping those without a string form.
pub fn leaves_to_strings(leaves: &[Value]) -> Vec<String> {
    leaves
        .iter()
        .filter_map(|leaf| {
            let rendered = scalar_to_string(leaf);
            if rendered.is_none() {
                log::debug!("Ignoring non-scalar attribute value: {}", leaf);
            }
            rendered
        })
        .collect()
}
