//! Disabled-option bookkeeping for the UI.
//!
//! Three reasons an option can be disabled are kept apart so the UI can say
//! *why*:
//!
//! - `excluded`: a rule excluded this id (`_neq` / `_nin`);
//! - `rule_set`: a rule forced the collection to specific ids (`_eq` / `_in`),
//!   so every sibling is disabled;
//! - `unavailable`: no matching combination row contains the id.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::evaluator::RuleOutcome;
use crate::collections::Collection;
use crate::types::DbId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisabledOptions {
    /// Plain rule exclusions, serialized at the top level keyed by collection.
    #[serde(flatten)]
    pub excluded: BTreeMap<Collection, BTreeSet<DbId>>,
    /// Ids forced by rules; siblings are disabled.
    pub rule_set: BTreeMap<Collection, BTreeSet<DbId>>,
    /// Ids ruled out by combination filtering.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unavailable: BTreeMap<Collection, BTreeSet<DbId>>,
}

impl DisabledOptions {
    pub fn from_outcome(outcome: &RuleOutcome) -> Self {
        Self {
            excluded: outcome.excluded_values.clone(),
            rule_set: outcome.rule_set.clone(),
            unavailable: BTreeMap::new(),
        }
    }

    /// Plain exclusions for a collection (empty if none).
    pub fn excluded_for(&self, collection: Collection) -> BTreeSet<DbId> {
        self.excluded.get(&collection).cloned().unwrap_or_default()
    }

    pub fn is_disabled_by_rules(&self, collection: Collection, id: DbId) -> bool {
        match self.rule_set.get(&collection) {
            Some(forced) => !forced.contains(&id),
            None => self
                .excluded
                .get(&collection)
                .is_some_and(|ids| ids.contains(&id)),
        }
    }

    pub fn is_unavailable(&self, collection: Collection, id: DbId) -> bool {
        self.unavailable
            .get(&collection)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Disabled for any reason.
    pub fn is_disabled(&self, collection: Collection, id: DbId) -> bool {
        self.is_disabled_by_rules(collection, id) || self.is_unavailable(collection, id)
    }

    /// Record filtering results. Empty sets are not stored.
    pub fn merge_unavailable(&mut self, unavailable: BTreeMap<Collection, BTreeSet<DbId>>) {
        for (collection, ids) in unavailable {
            if !ids.is_empty() {
                self.unavailable.entry(collection).or_default().extend(ids);
            }
        }
    }
}

/// Whether rules disable `id` in `collection`.
///
/// With a `rule_set` entry only the forced ids are enabled and plain
/// exclusions are ignored; otherwise an id is disabled iff it is excluded.
pub fn is_option_disabled_by_rules(
    collection: Collection,
    id: DbId,
    disabled: &DisabledOptions,
) -> bool {
    disabled.is_disabled_by_rules(collection, id)
}
