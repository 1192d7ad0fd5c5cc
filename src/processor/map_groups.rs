//! Explicit attribute-to-group mapping.
//!
//! `MapGroups` decides for each configured local group on its own whether the
//! user should hold it. A group is granted when any of its attribute needles
//! matches and revoked otherwise, unless it is listed as add-only. Groups that
//! do not appear in the map are never touched.
//!
//! # Options
//!
//! * `map` - `{ localGroup: { attributeName: needle | [needle, ...] } }`
//! * `groupAttributeDelimiter` - split the first attribute value on this
//!   string when the provider sends a single delimited value (default unset)
//! * `addOnlyGroups` - groups that are granted but never revoked
//!
//! # Example Usage
//!
//! ```rust
//! use group_sync::processor::{GroupProcessor, MapGroups, MapGroupsConfig};
//! use group_sync::store::{InMemoryMembershipStore, MembershipStore};
//! use group_sync::UserIdentity;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user = UserIdentity::new(1, "alice");
//! let store = InMemoryMembershipStore::new().with_user_groups(&user, ["abc"]);
//! let processor = MapGroups::new(MapGroupsConfig::new().map_group("sysop", "groups", "administrator"));
//!
//! processor.run(&user, &json!({ "groups": ["administrator", "dontsync"] }), &store)?;
//! assert!(store.current_groups(&user)?.contains("sysop"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::attributes::{leaves_to_strings, resolve_attribute};
use crate::config::{RuleOptions, json_type_name};
use crate::error::{ConfigurationError, GroupSyncResult};
use crate::identity::{AttributeBag, UserIdentity};
use crate::normalize::{normalize_values, split_delimited};
use crate::processor::{GroupChanges, GroupProcessor, Needle};
use crate::store::MembershipStore;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeSet;

/// Type tag under which the factory registers [`MapGroups`].
pub const MAP_GROUPS_TYPE: &str = "mapgroups";

const MAP_OPTION: &str = "map";
const DELIMITER_OPTION: &str = "groupAttributeDelimiter";
const ADD_ONLY_OPTION: &str = "addOnlyGroups";

/// Needles deciding membership of one local group.
#[derive(Debug, Clone)]
pub struct GroupMapping {
    group: String,
    rules: Vec<(String, Vec<Needle>)>,
}

impl GroupMapping {
    pub fn group(&self) -> &str {
        &self.group
    }

    /// `(attribute, needles)` pairs in evaluation order.
    pub fn rules(&self) -> &[(String, Vec<Needle>)] {
        &self.rules
    }
}

/// Configuration of a [`MapGroups`] processor.
#[derive(Debug, Clone, Default)]
pub struct MapGroupsConfig {
    map: Vec<GroupMapping>,
    group_attribute_delimiter: Option<String>,
    add_only_groups: BTreeSet<String>,
}

impl MapGroupsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `group` when `attribute` matches `needle`.
    ///
    /// Repeated calls append needles; groups and attributes keep the order in
    /// which they were first mentioned.
    pub fn map_group(
        self,
        group: impl Into<String>,
        attribute: impl Into<String>,
        needle: impl Into<Needle>,
    ) -> Self {
        self.map_needles(group, attribute, [needle.into()])
    }

    /// Grant `group` when `attribute` matches any of `needles`.
    pub fn map_needles<I>(
        mut self,
        group: impl Into<String>,
        attribute: impl Into<String>,
        needles: I,
    ) -> Self
    where
        I: IntoIterator<Item = Needle>,
    {
        let attribute = attribute.into();
        let rules = &mut self.mapping_mut(group.into()).rules;
        match rules.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, existing)) => existing.extend(needles),
            None => rules.push((attribute, needles.into_iter().collect())),
        }
        self
    }

    fn mapping_mut(&mut self, group: String) -> &mut GroupMapping {
        let group = group.trim().to_string();
        let index = match self.map.iter().position(|mapping| mapping.group == group) {
            Some(index) => index,
            None => {
                self.map.push(GroupMapping {
                    group,
                    rules: Vec::new(),
                });
                self.map.len() - 1
            }
        };
        &mut self.map[index]
    }

    /// Split the first attribute value on `delimiter`.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.group_attribute_delimiter = Some(delimiter.into());
        self
    }

    /// Never revoke `group` once granted.
    pub fn with_add_only(mut self, group: impl Into<String>) -> Self {
        self.add_only_groups.insert(group.into().trim().to_string());
        self
    }

    pub fn mappings(&self) -> &[GroupMapping] {
        &self.map
    }

    pub fn group_attribute_delimiter(&self) -> Option<&str> {
        self.group_attribute_delimiter.as_deref()
    }

    pub fn add_only_groups(&self) -> &BTreeSet<String> {
        &self.add_only_groups
    }

    /// Read the configuration from a rule's option bag.
    pub fn from_options(options: &RuleOptions) -> Result<Self, ConfigurationError> {
        let mut config = Self::new();

        match options.get_set(MAP_OPTION) {
            None => {}
            Some(Value::Array(items)) if items.is_empty() => {}
            Some(Value::Object(groups)) => {
                for (group, rules) in groups {
                    let Value::Object(rules) = rules else {
                        return Err(ConfigurationError::invalid(
                            MAP_OPTION,
                            format!(
                                "rules for group '{}' must be an object, got {}",
                                group,
                                json_type_name(rules)
                            ),
                        ));
                    };
                    // A group without rules never matches
                    config.mapping_mut(group.clone());
                    for (attribute, needles) in rules {
                        let needles = Needle::list_from_value(MAP_OPTION, needles, options)?;
                        config = config.map_needles(group.as_str(), attribute.as_str(), needles);
                    }
                }
            }
            Some(other) => {
                return Err(ConfigurationError::invalid(
                    MAP_OPTION,
                    format!("expected an object, got {}", json_type_name(other)),
                ));
            }
        }

        config.group_attribute_delimiter = options.delimiter(DELIMITER_OPTION)?;
        config.add_only_groups = options
            .string_list_or(ADD_ONLY_OPTION, &[])?
            .iter()
            .map(|group| group.trim().to_string())
            .collect();

        Ok(config)
    }
}

/// Processor granting local groups from attribute matches.
#[derive(Debug, Clone, Default)]
pub struct MapGroups {
    config: MapGroupsConfig,
}

impl MapGroups {
    pub fn new(config: MapGroupsConfig) -> Self {
        Self { config }
    }

    pub fn from_options(options: &RuleOptions) -> Result<Self, ConfigurationError> {
        Ok(Self::new(MapGroupsConfig::from_options(options)?))
    }

    pub fn config(&self) -> &MapGroupsConfig {
        &self.config
    }

    /// Normalized values of one attribute, split when a delimiter is set.
    fn attribute_values(&self, leaves: &[Value]) -> Vec<String> {
        let values = leaves_to_strings(leaves);
        let values = match self.config.group_attribute_delimiter.as_deref() {
            Some(delimiter) => values
                .first()
                .map(|first| split_delimited(first, Some(delimiter)))
                .unwrap_or_default(),
            None => values,
        };
        normalize_values(&values)
    }

    fn mapping_matches(&self, mapping: &GroupMapping, attributes: &AttributeBag) -> bool {
        for (attribute, needles) in &mapping.rules {
            let Some(leaves) = resolve_attribute(attributes, attribute) else {
                debug!(
                    "Attribute '{}' not provided; no match for group '{}' from it",
                    attribute, mapping.group
                );
                continue;
            };
            let values = self.attribute_values(&leaves);

            for needle in needles {
                match needle.matches(&values) {
                    Ok(true) => return true,
                    Ok(false) => {}
                    Err(e) => warn!(
                        "Needle on attribute '{}' for group '{}' failed, treating as no match: {}",
                        attribute, mapping.group, e
                    ),
                }
            }
        }
        false
    }
}

impl GroupProcessor for MapGroups {
    fn plan(
        &self,
        user: &UserIdentity,
        attributes: &AttributeBag,
        store: &dyn MembershipStore,
    ) -> GroupSyncResult<GroupChanges> {
        let current = store.current_groups(user)?;
        let mut changes = GroupChanges::new();

        for mapping in &self.config.map {
            let group = mapping.group.as_str();
            if self.mapping_matches(mapping, attributes) {
                if !current.contains(group) {
                    changes.add(group);
                }
            } else if self.config.add_only_groups.contains(group) {
                debug!("Keeping add-only group '{}' for '{}'", group, user);
            } else if current.contains(group) {
                changes.remove(group);
            }
        }

        Ok(changes)
    }
}
