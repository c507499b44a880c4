//! Rule evaluator: pure logic, no data loading.
//!
//! Rules are visited by priority (highest first), ties by load position. A
//! forced value is claimed by the first rule that forces the collection, so
//! higher priority wins. Exclusions from every firing rule in a pass
//! accumulate.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::disabled::DisabledOptions;
use super::model::{Action, Comparison, ForcedValue, Rule};
use crate::collections::Collection;
use crate::selection::Configuration;
use crate::types::DbId;

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub forced_values: BTreeMap<Collection, ForcedValue>,
    pub excluded_values: BTreeMap<Collection, BTreeSet<DbId>>,
    /// Ids of the winning forced values, per collection.
    pub rule_set: BTreeMap<Collection, BTreeSet<DbId>>,
    /// Ids of rules whose condition held, in visiting order.
    pub fired_rules: Vec<String>,
}

/// Evaluate every rule once against `config`.
pub fn evaluate_rules(rules: &[Rule], config: &Configuration) -> RuleOutcome {
    let mut ordered: Vec<&Rule> = rules.iter().collect();
    ordered.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.position.cmp(&b.position))
    });

    let mut outcome = RuleOutcome::default();
    for rule in ordered {
        if !rule.condition.holds(config) {
            continue;
        }
        outcome.fired_rules.push(rule.id.clone());
        for action in &rule.actions {
            apply_action(&mut outcome, rule, action);
        }
    }

    outcome.rule_set = rule_set(&outcome.forced_values);
    outcome
}

/// Forced ids per collection. A single forced accessory is added to the
/// selection rather than replacing it, so it leaves its siblings enabled.
fn rule_set(
    forced_values: &BTreeMap<Collection, ForcedValue>,
) -> BTreeMap<Collection, BTreeSet<DbId>> {
    forced_values
        .iter()
        .filter(|(collection, forced)| {
            !(collection.is_multi_valued() && matches!(forced, ForcedValue::Single(_)))
        })
        .map(|(collection, forced)| (*collection, forced.ids().into_iter().collect()))
        .collect()
}

fn apply_action(outcome: &mut RuleOutcome, rule: &Rule, action: &Action) {
    let collection = action.collection;
    match &action.comparison {
        Comparison::Eq(id) => force(outcome, rule, collection, ForcedValue::Single(*id)),
        Comparison::In(ids) => force(outcome, rule, collection, ForcedValue::Set(ids.clone())),
        Comparison::Neq(id) => {
            outcome
                .excluded_values
                .entry(collection)
                .or_default()
                .insert(*id);
        }
        Comparison::Nin(ids) => {
            outcome
                .excluded_values
                .entry(collection)
                .or_default()
                .extend(ids.iter().copied());
        }
    }
}

fn force(outcome: &mut RuleOutcome, rule: &Rule, collection: Collection, value: ForcedValue) {
    match outcome.forced_values.entry(collection) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(existing) => {
            if *existing.get() != value {
                tracing::debug!(
                    rule_id = %rule.id,
                    collection = %collection,
                    "Forced value ignored, collection already forced by a higher-priority rule",
                );
            }
        }
    }
}

/// Copy `config` with the outcome's forced values written in.
///
/// - `Single(id)` sets the field (accessories: adds the id).
/// - `Set(ids)` keeps the current value if it is a member, otherwise takes
///   the first listed id (accessories: drops non-members).
///
/// Forcing a size preset clears custom dimensions.
pub fn apply_forced_values(config: &Configuration, outcome: &RuleOutcome) -> Configuration {
    let mut adjusted = config.clone();
    for (collection, forced) in &outcome.forced_values {
        if collection.is_multi_valued() {
            match forced {
                ForcedValue::Single(id) => adjusted.add_accessory(*id),
                ForcedValue::Set(ids) => adjusted.accessories.retain(|a| ids.contains(a)),
            }
            continue;
        }

        let current = adjusted.value(*collection);
        let next = match forced {
            ForcedValue::Single(id) => *id,
            ForcedValue::Set(ids) => match current {
                Some(value) if ids.contains(&value) => value,
                _ => match ids.first() {
                    Some(first) => *first,
                    None => continue,
                },
            },
        };
        if current != Some(next) {
            adjusted.set(*collection, Some(next));
            if *collection == Collection::Sizes {
                adjusted.width = None;
                adjusted.height = None;
            }
        }
    }
    adjusted
}

/// Complete rule application for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RulesApplication {
    pub set_values: BTreeMap<Collection, ForcedValue>,
    pub disabled_options: DisabledOptions,
    /// The input configuration with forced values applied.
    pub adjusted: Configuration,
    pub fired_rules: Vec<String>,
    /// A further rule pass would still have changed the configuration.
    pub cascade_truncated: bool,
}

/// Evaluate rules against the raw configuration, apply forced values, and
/// evaluate once more against the adjusted configuration so rules that
/// depend on another rule's forced value are honored.
///
/// Cascades deeper than that are not chased; they are logged and reported
/// through [`RulesApplication::cascade_truncated`].
pub fn apply_rules_complete(rules: &[Rule], config: &Configuration) -> RulesApplication {
    let first = evaluate_rules(rules, config);
    let adjusted = apply_forced_values(config, &first);

    let (merged, adjusted) = if adjusted == *config {
        (first, adjusted)
    } else {
        let second = evaluate_rules(rules, &adjusted);
        let readjusted = apply_forced_values(&adjusted, &second);
        (merge_outcomes(first, second), readjusted)
    };

    let next_pass = evaluate_rules(rules, &adjusted);
    let cascade_truncated = apply_forced_values(&adjusted, &next_pass) != adjusted;
    if cascade_truncated {
        tracing::warn!(
            fired = ?next_pass.fired_rules,
            "Rule cascade deeper than two passes, remaining forced values not applied",
        );
    }

    tracing::debug!(
        fired = merged.fired_rules.len(),
        forced = merged.forced_values.len(),
        excluded = merged.excluded_values.len(),
        "Rules applied",
    );

    RulesApplication {
        disabled_options: DisabledOptions::from_outcome(&merged),
        set_values: merged.forced_values,
        adjusted,
        fired_rules: merged.fired_rules,
        cascade_truncated,
    }
}

/// Second-pass forced values win; first-pass forced values for collections
/// the second pass left alone stay (they are already in the configuration).
/// Exclusions come from the second pass only, since a first-pass rule may no
/// longer hold on the adjusted configuration.
fn merge_outcomes(first: RuleOutcome, second: RuleOutcome) -> RuleOutcome {
    let mut merged = second;
    for (collection, forced) in first.forced_values {
        merged.forced_values.entry(collection).or_insert(forced);
    }
    let mut fired = first.fired_rules;
    for id in merged.fired_rules {
        if !fired.contains(&id) {
            fired.push(id);
        }
    }
    merged.fired_rules = fired;
    merged.rule_set = rule_set(&merged.forced_values);
    merged
}
