//! Rule types: the raw stored shape and the parsed, typed shape.

use serde::{Deserialize, Serialize};

use crate::collections::Collection;
use crate::selection::Configuration;
use crate::types::DbId;

/// A rule as loaded from storage.
///
/// `if_this` and `then_that` may be JSON objects or JSON-encoded strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    pub if_this: serde_json::Value,
    pub then_that: serde_json::Value,
}

/// Field-level comparison shared by predicates and actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq(DbId),
    In(Vec<DbId>),
    Neq(DbId),
    Nin(Vec<DbId>),
}

impl Comparison {
    /// Test a single-valued field. A missing value never matches.
    fn matches_single(&self, value: Option<DbId>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Comparison::Eq(id) => value == *id,
            Comparison::In(ids) => ids.contains(&value),
            Comparison::Neq(id) => value != *id,
            Comparison::Nin(ids) => !ids.contains(&value),
        }
    }

    /// Test a multi-valued field by membership. An empty set never matches.
    fn matches_set(&self, values: &[DbId]) -> bool {
        if values.is_empty() {
            return false;
        }
        match self {
            Comparison::Eq(id) => values.contains(id),
            Comparison::In(ids) => values.iter().any(|v| ids.contains(v)),
            Comparison::Neq(id) => !values.contains(id),
            Comparison::Nin(ids) => !values.iter().any(|v| ids.contains(v)),
        }
    }
}

/// Parsed `if_this` condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Conjunction. An empty conjunction holds.
    All(Vec<Predicate>),
    Field {
        collection: Collection,
        comparison: Comparison,
    },
}

impl Predicate {
    pub fn holds(&self, config: &Configuration) -> bool {
        match self {
            Predicate::All(parts) => parts.iter().all(|p| p.holds(config)),
            Predicate::Field {
                collection,
                comparison,
            } => {
                if collection.is_multi_valued() {
                    comparison.matches_set(&config.values(*collection))
                } else {
                    comparison.matches_single(config.value(*collection))
                }
            }
        }
    }
}

/// Parsed `then_that` assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub collection: Collection,
    pub comparison: Comparison,
}

/// A parsed rule ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub id: String,
    pub name: Option<String>,
    /// Higher wins when forced values conflict.
    pub priority: i64,
    /// Load order; secondary sort key.
    pub position: usize,
    pub condition: Predicate,
    pub actions: Vec<Action>,
}

/// A value forced onto a collection by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ForcedValue {
    Single(DbId),
    /// Forced membership; order is the rule's listed order.
    Set(Vec<DbId>),
}

impl ForcedValue {
    pub fn ids(&self) -> Vec<DbId> {
        match self {
            ForcedValue::Single(id) => vec![*id],
            ForcedValue::Set(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, id: DbId) -> bool {
        match self {
            ForcedValue::Single(forced) => *forced == id,
            ForcedValue::Set(ids) => ids.contains(&id),
        }
    }
}
