//! Registry mapping type tags to processor constructors.
//!
//! # Example Usage
//!
//! ```rust
//! use group_sync::processor::GroupProcessorFactory;
//! use group_sync::RuleOptions;
//! use serde_json::json;
//!
//! let factory = GroupProcessorFactory::default();
//! let options = RuleOptions::from_value(json!({ "map": { "editor": { "groups": "wiki-editors" } } })).unwrap();
//!
//! assert!(factory.get_instance("mapgroups", &options).is_ok());
//! assert!(factory.get_instance("ldap", &options).is_err());
//! ```

use crate::config::RuleOptions;
use crate::error::ConfigurationError;
use crate::processor::map_groups::{MAP_GROUPS_TYPE, MapGroups};
use crate::processor::sync_all_groups::{SYNC_ALL_GROUPS_TYPE, SyncAllGroups};
use crate::processor::GroupProcessor;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a processor from a rule's options.
pub type ProcessorConstructor =
    Arc<dyn Fn(&RuleOptions) -> Result<Box<dyn GroupProcessor>, ConfigurationError> + Send + Sync>;

/// Creates processors by type tag.
///
/// [`GroupProcessorFactory::default`] knows the built-in `mapgroups` and
/// `syncall` processors; [`GroupProcessorFactory::new`] starts empty.
#[derive(Clone)]
pub struct GroupProcessorFactory {
    registry: HashMap<String, ProcessorConstructor>,
}

impl GroupProcessorFactory {
    /// Create a factory with no registered processors.
    pub fn new() -> Self {
        Self {
            registry: HashMap::new(),
        }
    }

    /// Register a constructor under `type_tag`, replacing any previous one.
    pub fn register<F>(&mut self, type_tag: impl Into<String>, constructor: F)
    where
        F: Fn(&RuleOptions) -> Result<Box<dyn GroupProcessor>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.registry.insert(type_tag.into(), Arc::new(constructor));
    }

    pub fn with_processor<F>(mut self, type_tag: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&RuleOptions) -> Result<Box<dyn GroupProcessor>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.register(type_tag, constructor);
        self
    }

    /// Construct the processor registered under `type_tag`.
    pub fn get_instance(
        &self,
        type_tag: &str,
        options: &RuleOptions,
    ) -> Result<Box<dyn GroupProcessor>, ConfigurationError> {
        let constructor =
            self.registry
                .get(type_tag)
                .ok_or_else(|| ConfigurationError::UnknownType {
                    type_tag: type_tag.to_string(),
                })?;
        constructor(options)
    }

    pub fn is_registered(&self, type_tag: &str) -> bool {
        self.registry.contains_key(type_tag)
    }

    /// Registered type tags, sorted.
    pub fn registered_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for GroupProcessorFactory {
    fn default() -> Self {
        Self::new()
            .with_processor(MAP_GROUPS_TYPE, |options| {
                Ok(Box::new(MapGroups::from_options(options)?) as Box<dyn GroupProcessor>)
            })
            .with_processor(SYNC_ALL_GROUPS_TYPE, |options| {
                Ok(Box::new(SyncAllGroups::from_options(options)?) as Box<dyn GroupProcessor>)
            })
    }
}

impl fmt::Debug for GroupProcessorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupProcessorFactory")
            .field("registered_types", &self.registered_types())
            .finish()
    }
}
