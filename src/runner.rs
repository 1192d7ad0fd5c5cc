//! Per-user orchestration of all configured group sync rules.
//!
//! The runner is called once per login. It reads the plugin's rules and the
//! user's attributes, then builds and runs one processor per rule in order.
//! A failing rule is logged and recorded in the [`SyncReport`]; the
//! remaining rules still run and no error reaches the caller.
//!
//! # Example Usage
//!
//! ```rust
//! use group_sync::runner::GroupProcessorRunner;
//! use group_sync::store::InMemoryMembershipStore;
//! use group_sync::{GroupSyncRule, RuleOptions, StaticIdentityPlugin, UserIdentity};
//! use serde_json::json;
//!
//! let user = UserIdentity::new(1, "alice");
//! let plugin = StaticIdentityPlugin::new()
//!     .with_group_sync(GroupSyncRule::new("all", "syncall", RuleOptions::new()))
//!     .with_attributes("alice", json!({ "groups": ["editor"] }));
//! let store = InMemoryMembershipStore::new();
//!
//! let report = GroupProcessorRunner::default().run(&user, &plugin, &store);
//! assert!(report.is_success());
//! assert_eq!(report.total_changes(), 1);
//! ```

use crate::config::GroupSyncRule;
use crate::error::{GroupSyncError, GroupSyncResult};
use crate::identity::{AttributeBag, IdentityPlugin, UserIdentity};
use crate::processor::{GroupChanges, GroupProcessorFactory};
use crate::store::MembershipStore;
use log::{debug, error};

/// Outcome of one rule.
#[derive(Debug)]
pub struct RuleOutcome {
    /// Name of the rule.
    pub rule: String,
    /// Changes applied (or planned, for a dry run), or the failure.
    pub result: GroupSyncResult<GroupChanges>,
}

impl RuleOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn changes(&self) -> Option<&GroupChanges> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&GroupSyncError> {
        self.result.as_ref().err()
    }
}

/// Per-rule outcomes of one runner invocation, in rule order.
#[derive(Debug, Default)]
pub struct SyncReport {
    outcomes: Vec<RuleOutcome>,
}

impl SyncReport {
    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.outcomes
    }

    /// Outcome of the rule with the given name.
    pub fn outcome(&self, rule: &str) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|outcome| outcome.rule == rule)
    }

    /// Outcomes of the rules that failed.
    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Whether every rule succeeded. Trivially true when no rules ran.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Number of add and remove calls across all successful rules.
    pub fn total_changes(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(RuleOutcome::changes)
            .map(GroupChanges::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs every group sync rule of an identity plugin for one user.
#[derive(Debug, Clone, Default)]
pub struct GroupProcessorRunner {
    factory: GroupProcessorFactory,
}

impl GroupProcessorRunner {
    pub fn new(factory: GroupProcessorFactory) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &GroupProcessorFactory {
        &self.factory
    }

    /// Run and apply all rules for `user`.
    pub fn run(
        &self,
        user: &UserIdentity,
        plugin: &dyn IdentityPlugin,
        store: &dyn MembershipStore,
    ) -> SyncReport {
        self.run_rules(user, plugin, store, true)
    }

    /// Plan all rules for `user` without changing membership.
    ///
    /// Every rule is planned against the same current membership, so the
    /// report shows what each rule would do on its own.
    pub fn dry_run(
        &self,
        user: &UserIdentity,
        plugin: &dyn IdentityPlugin,
        store: &dyn MembershipStore,
    ) -> SyncReport {
        self.run_rules(user, plugin, store, false)
    }

    fn run_rules(
        &self,
        user: &UserIdentity,
        plugin: &dyn IdentityPlugin,
        store: &dyn MembershipStore,
        apply: bool,
    ) -> SyncReport {
        let rules = plugin.group_syncs();
        if rules.is_empty() {
            debug!("No groupsync set.");
            return SyncReport::default();
        }

        let attributes = plugin.attributes(user);
        let outcomes = rules
            .iter()
            .map(|rule| {
                let result = self.run_rule(rule, user, &attributes, store, apply);
                if let Err(e) = &result {
                    error!("Error running '{}' groupsync: {}", rule.name(), e);
                }
                RuleOutcome {
                    rule: rule.name().to_string(),
                    result,
                }
            })
            .collect();

        SyncReport { outcomes }
    }

    fn run_rule(
        &self,
        rule: &GroupSyncRule,
        user: &UserIdentity,
        attributes: &AttributeBag,
        store: &dyn MembershipStore,
        apply: bool,
    ) -> GroupSyncResult<GroupChanges> {
        let type_tag = rule.type_tag()?;
        debug!(
            "Running '{}' groupsync of type '{}' for '{}' with attributes {}",
            rule.name(),
            type_tag,
            user,
            attributes
        );

        let processor = self.factory.get_instance(type_tag, rule.options())?;
        if apply {
            processor.run(user, attributes, store)
        } else {
            processor.plan(user, attributes, store)
        }
    }
}
