//! Wholesale mirroring of an external group list.
//!
//! `SyncAllGroups` reads group names from one or more attribute paths and
//! makes the user's local membership match them: missing groups are added,
//! extra groups are removed. Two rules keep it from touching groups it does
//! not own:
//!
//! * locally managed groups (default `sysop`) are never added or removed;
//! * with a `filterPrefix`, every synced name gets that prefix and only
//!   groups already carrying it are candidates for removal.
//!
//! # Options
//!
//! * `groupAttributeName` - attribute name, or a list of
//!   `{ "path": [...], "prefix": "..." }` sources (default `"groups"`)
//! * `locallyManaged` - groups excluded from syncing (default `["sysop"]`)
//! * `groupAttributeDelimiter` - split every name on this string
//! * `groupNameModificationCallback` - name of a registered callback, or
//!   `{ "regex": "...", "replace": "..." }`
//! * `filterPrefix` - prefix owned by this rule (default empty)
//! * `onlySyncExisting` - skip groups the host does not define (default false)
//!
//! # Example Usage
//!
//! ```rust
//! use group_sync::processor::{GroupProcessor, SyncAllGroups, SyncAllGroupsConfig};
//! use group_sync::store::{InMemoryMembershipStore, MembershipStore};
//! use group_sync::UserIdentity;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user = UserIdentity::new(1, "alice");
//! let store = InMemoryMembershipStore::new().with_user_groups(&user, ["abc", "def"]);
//! let processor = SyncAllGroups::new(SyncAllGroupsConfig::new().with_locally_managed(["abc"]));
//!
//! processor.run(&user, &json!({ "groups": ["administrator", "alsosync"] }), &store)?;
//! let groups: Vec<String> = store.current_groups(&user)?.into_iter().collect();
//! assert_eq!(groups, vec!["abc", "administrator", "alsosync"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::attributes::{PathSegment, leaves_to_strings, resolve_path};
use crate::config::{NameCallbackFn, RuleOptions, json_type_name};
use crate::error::{ConfigurationError, GroupSyncResult};
use crate::identity::{AttributeBag, UserIdentity};
use crate::normalize::{dedupe_preserving_order, split_delimited, trim_names};
use crate::processor::{GroupChanges, GroupProcessor};
use crate::store::{GroupSet, MembershipStore};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Type tag under which the factory registers [`SyncAllGroups`].
pub const SYNC_ALL_GROUPS_TYPE: &str = "syncall";

const ATTRIBUTE_OPTION: &str = "groupAttributeName";
const LOCALLY_MANAGED_OPTION: &str = "locallyManaged";
const DELIMITER_OPTION: &str = "groupAttributeDelimiter";
const CALLBACK_OPTION: &str = "groupNameModificationCallback";
const FILTER_PREFIX_OPTION: &str = "filterPrefix";
const ONLY_EXISTING_OPTION: &str = "onlySyncExisting";

const DEFAULT_GROUP_ATTRIBUTE: &str = "groups";
const DEFAULT_LOCALLY_MANAGED: &[&str] = &["sysop"];

/// Where to find external group names inside the attribute bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAttributeSource {
    /// Keys and indices leading to the names. A single string is accepted as
    /// a one-step path.
    #[serde(deserialize_with = "deserialize_path")]
    pub path: Vec<PathSegment>,
    /// Prepended to every name found at `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl GroupAttributeSource {
    /// Top-level attribute holding the names.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::path([PathSegment::Key(name.into())])
    }

    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            path: segments.into_iter().map(Into::into).collect(),
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Names found at this source, each with the source prefix applied.
    fn names(&self, attributes: &AttributeBag) -> Vec<String> {
        let prefix = self.prefix.as_deref().unwrap_or("");
        leaves_to_strings(&resolve_path(attributes, &self.path))
            .into_iter()
            .map(|name| format!("{}{}", prefix, name))
            .collect()
    }
}

fn deserialize_path<'de, D>(deserializer: D) -> Result<Vec<PathSegment>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PathSpec {
        Single(PathSegment),
        Many(Vec<PathSegment>),
    }

    Ok(match PathSpec::deserialize(deserializer)? {
        PathSpec::Single(segment) => vec![segment],
        PathSpec::Many(segments) => segments,
    })
}

/// Configuration of a [`SyncAllGroups`] processor.
#[derive(Clone)]
pub struct SyncAllGroupsConfig {
    sources: Vec<GroupAttributeSource>,
    locally_managed: GroupSet,
    group_attribute_delimiter: Option<String>,
    name_callback: Option<Arc<NameCallbackFn>>,
    filter_prefix: String,
    only_sync_existing: bool,
}

impl Default for SyncAllGroupsConfig {
    fn default() -> Self {
        Self {
            sources: vec![GroupAttributeSource::attribute(DEFAULT_GROUP_ATTRIBUTE)],
            locally_managed: DEFAULT_LOCALLY_MANAGED
                .iter()
                .map(|group| group.to_string())
                .collect(),
            group_attribute_delimiter: None,
            name_callback: None,
            filter_prefix: String::new(),
            only_sync_existing: false,
        }
    }
}

impl SyncAllGroupsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read names from a single top-level attribute.
    pub fn with_group_attribute(mut self, name: impl Into<String>) -> Self {
        self.sources = vec![GroupAttributeSource::attribute(name)];
        self
    }

    /// Read names from the given sources, in order.
    pub fn with_sources(mut self, sources: Vec<GroupAttributeSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Replace the set of locally managed groups.
    pub fn with_locally_managed<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: AsRef<str>,
    {
        self.locally_managed = groups
            .into_iter()
            .map(|group| group.as_ref().trim().to_string())
            .collect();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.group_attribute_delimiter = Some(delimiter.into());
        self
    }

    /// Rewrite every synced name after the filter prefix is applied.
    pub fn with_name_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.name_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_filter_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.filter_prefix = prefix.as_ref().trim().to_string();
        self
    }

    pub fn only_sync_existing(mut self, enabled: bool) -> Self {
        self.only_sync_existing = enabled;
        self
    }

    pub fn sources(&self) -> &[GroupAttributeSource] {
        &self.sources
    }

    pub fn locally_managed(&self) -> &GroupSet {
        &self.locally_managed
    }

    pub fn filter_prefix(&self) -> &str {
        &self.filter_prefix
    }

    /// Read the configuration from a rule's option bag.
    pub fn from_options(options: &RuleOptions) -> Result<Self, ConfigurationError> {
        let mut config = Self::new()
            .with_locally_managed(options.string_list_or(LOCALLY_MANAGED_OPTION, DEFAULT_LOCALLY_MANAGED)?)
            .with_filter_prefix(options.string_or(FILTER_PREFIX_OPTION, "")?)
            .only_sync_existing(options.bool_or(ONLY_EXISTING_OPTION, false)?);

        config.sources = parse_sources(options)?;
        config.group_attribute_delimiter = options.delimiter(DELIMITER_OPTION)?;
        config.name_callback = parse_name_callback(options)?;

        Ok(config)
    }
}

impl fmt::Debug for SyncAllGroupsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncAllGroupsConfig")
            .field("sources", &self.sources)
            .field("locally_managed", &self.locally_managed)
            .field("group_attribute_delimiter", &self.group_attribute_delimiter)
            .field("name_callback", &self.name_callback.as_ref().map(|_| ".."))
            .field("filter_prefix", &self.filter_prefix)
            .field("only_sync_existing", &self.only_sync_existing)
            .finish()
    }
}

fn parse_sources(options: &RuleOptions) -> Result<Vec<GroupAttributeSource>, ConfigurationError> {
    match options.get_set(ATTRIBUTE_OPTION) {
        None => Ok(vec![GroupAttributeSource::attribute(DEFAULT_GROUP_ATTRIBUTE)]),
        Some(Value::String(name)) => Ok(vec![GroupAttributeSource::attribute(name.clone())]),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry {
                Value::String(name) => Ok(GroupAttributeSource::attribute(name.clone())),
                Value::Object(_) => serde_json::from_value(entry.clone()).map_err(|e| {
                    ConfigurationError::invalid(ATTRIBUTE_OPTION, format!("invalid source: {}", e))
                }),
                other => Err(ConfigurationError::invalid(
                    ATTRIBUTE_OPTION,
                    format!("unsupported source: {}", json_type_name(other)),
                )),
            })
            .collect(),
        Some(other) => Err(ConfigurationError::invalid(
            ATTRIBUTE_OPTION,
            format!("expected a string or a list, got {}", json_type_name(other)),
        )),
    }
}

fn parse_name_callback(
    options: &RuleOptions,
) -> Result<Option<Arc<NameCallbackFn>>, ConfigurationError> {
    match options.get_set(CALLBACK_OPTION) {
        None => Ok(None),
        Some(Value::String(name)) => options
            .name_callback(name)
            .map(Some)
            .ok_or_else(|| ConfigurationError::UnknownCallback {
                option: CALLBACK_OPTION.to_string(),
                name: name.clone(),
            }),
        Some(Value::Object(fields)) => {
            let pattern = match fields.get("regex") {
                Some(Value::String(pattern)) => pattern,
                Some(other) => {
                    return Err(ConfigurationError::invalid(
                        CALLBACK_OPTION,
                        format!("regex must be a string, got {}", json_type_name(other)),
                    ));
                }
                None => {
                    return Err(ConfigurationError::MissingOption {
                        option: format!("{}.regex", CALLBACK_OPTION),
                    });
                }
            };
            let replacement = fields
                .get("replace")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let regex = Regex::new(pattern).map_err(|e| {
                ConfigurationError::invalid(CALLBACK_OPTION, format!("invalid regex {}: {}", pattern, e))
            })?;
            let callback: Arc<NameCallbackFn> = Arc::new(move |name: &str| {
                regex.replace_all(name, replacement.as_str()).into_owned()
            });
            Ok(Some(callback))
        }
        Some(other) => Err(ConfigurationError::invalid(
            CALLBACK_OPTION,
            format!("expected a callback name or object, got {}", json_type_name(other)),
        )),
    }
}

fn non_empty(name: String) -> Option<String> {
    if name.is_empty() {
        debug!("Ignoring empty group name");
        return None;
    }
    Some(name)
}

/// Processor mirroring external groups into local membership.
#[derive(Debug, Clone, Default)]
pub struct SyncAllGroups {
    config: SyncAllGroupsConfig,
}

impl SyncAllGroups {
    pub fn new(config: SyncAllGroupsConfig) -> Self {
        Self { config }
    }

    pub fn from_options(options: &RuleOptions) -> Result<Self, ConfigurationError> {
        Ok(Self::new(SyncAllGroupsConfig::from_options(options)?))
    }

    pub fn config(&self) -> &SyncAllGroupsConfig {
        &self.config
    }

    /// External group names before trimming and prefixing.
    fn raw_group_names(&self, attributes: &AttributeBag) -> Vec<String> {
        let names = self
            .config
            .sources
            .iter()
            .flat_map(|source| source.names(attributes))
            .collect();
        let delimiter = self.config.group_attribute_delimiter.as_deref();

        dedupe_preserving_order(names)
            .iter()
            .flat_map(|name| split_delimited(name, delimiter))
            .collect()
    }

    /// Local group names the user should hold according to `attributes`.
    ///
    /// Names that are empty after trimming are dropped, both before the
    /// filter prefix is applied and after the name callback runs.
    pub fn target_groups(&self, attributes: &AttributeBag) -> GroupSet {
        trim_names(&self.raw_group_names(attributes))
            .into_iter()
            .filter_map(non_empty)
            .map(|name| format!("{}{}", self.config.filter_prefix, name))
            .filter_map(|name| match &self.config.name_callback {
                Some(callback) => non_empty(callback(&name).trim().to_string()),
                None => Some(name),
            })
            .collect()
    }

    fn owns_for_removal(&self, group: &str) -> bool {
        !self.config.locally_managed.contains(group)
            && (self.config.filter_prefix.is_empty() || group.starts_with(&self.config.filter_prefix))
    }
}

impl GroupProcessor for SyncAllGroups {
    fn plan(
        &self,
        user: &UserIdentity,
        attributes: &AttributeBag,
        store: &dyn MembershipStore,
    ) -> GroupSyncResult<GroupChanges> {
        let current = store.current_groups(user)?;
        let target = self.target_groups(attributes);
        let mut changes = GroupChanges::new();

        for group in target.difference(&current) {
            if !self.config.locally_managed.contains(group) {
                changes.add(group.as_str());
            }
        }
        for group in current.difference(&target) {
            if self.owns_for_removal(group) {
                changes.remove(group.as_str());
            }
        }

        if self.config.only_sync_existing && !changes.is_empty() {
            let known = store.all_known_groups()?;
            changes.retain(|group| {
                let exists = known.contains(group);
                if !exists {
                    debug!("Skipping group '{}' for '{}'", group, user);
                }
                exists
            });
        }

        Ok(changes)
    }
}
