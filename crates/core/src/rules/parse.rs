//! Parse raw `if_this` / `then_that` JSON into typed rules.
//!
//! Grammar (both sides):
//!
//! ```text
//! { "<field>": { "_eq" | "_neq": id, "_in" | "_nin": [id, ...] }, "_and": [ {...}, ... ] }
//! ```
//!
//! `<field>` is a configuration field name (`driver`) or a collection key
//! (`drivers`). Ids may be numbers or numeric strings; list operands may also
//! be a comma-separated string.

use std::borrow::Cow;

use serde_json::Value;

use super::model::{Action, Comparison, Predicate, RawRule, Rule};
use crate::collections::Collection;
use crate::selection::coerce_id;
use crate::types::DbId;

pub const OPERATORS: &[&str] = &["_eq", "_in", "_neq", "_nin"];

#[derive(Debug, thiserror::Error)]
pub enum RuleParseError {
    #[error("Rule '{rule_id}': {part} is not valid JSON: {source}")]
    InvalidJson {
        rule_id: String,
        part: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rule '{rule_id}': {part} must be a JSON object")]
    NotAnObject { rule_id: String, part: &'static str },

    #[error("Rule '{rule_id}': unmapped field '{field}'")]
    UnknownField { rule_id: String, field: String },

    #[error("Rule '{rule_id}': unknown operator '{operator}' on '{field}'. Must be one of: _eq, _in, _neq, _nin")]
    UnknownOperator {
        rule_id: String,
        field: String,
        operator: String,
    },

    #[error("Rule '{rule_id}': invalid operand for '{operator}' on '{field}'")]
    InvalidOperand {
        rule_id: String,
        field: String,
        operator: String,
    },

    #[error("Rule '{rule_id}': then_that has no actions")]
    EmptyAction { rule_id: String },
}

/// Parse one rule. The returned rule has `position` 0; [`parse_rules`]
/// assigns load positions.
pub fn parse_rule(raw: &RawRule) -> Result<Rule, RuleParseError> {
    let rule_id = raw.id.as_str();
    let if_this = decode_part(rule_id, "if_this", &raw.if_this)?;
    let then_that = decode_part(rule_id, "then_that", &raw.then_that)?;

    let condition = parse_condition(rule_id, &if_this)?;
    let actions = parse_actions(rule_id, &then_that)?;
    if actions.is_empty() {
        return Err(RuleParseError::EmptyAction {
            rule_id: rule_id.to_string(),
        });
    }

    Ok(Rule {
        id: raw.id.clone(),
        name: raw.name.clone(),
        priority: raw.priority.unwrap_or(0),
        position: 0,
        condition,
        actions,
    })
}

/// Parse a rule list, skipping (and logging) malformed rules.
pub fn parse_rules(raw_rules: &[RawRule]) -> Vec<Rule> {
    raw_rules
        .iter()
        .enumerate()
        .filter_map(|(position, raw)| match parse_rule(raw) {
            Ok(rule) => Some(Rule { position, ..rule }),
            Err(err) => {
                tracing::warn!(rule_id = %raw.id, error = %err, "Skipping malformed rule");
                None
            }
        })
        .collect()
}

fn decode_part<'a>(
    rule_id: &str,
    part: &'static str,
    value: &'a Value,
) -> Result<Cow<'a, Value>, RuleParseError> {
    match value {
        Value::String(text) => serde_json::from_str(text)
            .map(Cow::Owned)
            .map_err(|source| RuleParseError::InvalidJson {
                rule_id: rule_id.to_string(),
                part,
                source,
            }),
        other => Ok(Cow::Borrowed(other)),
    }
}

fn as_object<'a>(
    rule_id: &str,
    part: &'static str,
    value: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, RuleParseError> {
    value.as_object().ok_or_else(|| RuleParseError::NotAnObject {
        rule_id: rule_id.to_string(),
        part,
    })
}

fn parse_condition(rule_id: &str, value: &Value) -> Result<Predicate, RuleParseError> {
    let object = as_object(rule_id, "if_this", value)?;
    let mut parts = Vec::with_capacity(object.len());

    for (key, operand) in object {
        if key == "_and" {
            let nested = operand.as_array().ok_or_else(|| invalid(rule_id, key, "_and"))?;
            let nested = nested
                .iter()
                .map(|item| parse_condition(rule_id, item))
                .collect::<Result<Vec<_>, _>>()?;
            parts.push(Predicate::All(nested));
            continue;
        }
        let collection = lookup_field(rule_id, key)?;
        for comparison in parse_comparisons(rule_id, key, operand)? {
            parts.push(Predicate::Field {
                collection,
                comparison,
            });
        }
    }

    Ok(if parts.len() == 1 {
        parts.remove(0)
    } else {
        Predicate::All(parts)
    })
}

fn parse_actions(rule_id: &str, value: &Value) -> Result<Vec<Action>, RuleParseError> {
    let object = as_object(rule_id, "then_that", value)?;
    let mut actions = Vec::with_capacity(object.len());

    for (key, operand) in object {
        if key == "_and" {
            let nested = operand.as_array().ok_or_else(|| invalid(rule_id, key, "_and"))?;
            for item in nested {
                actions.extend(parse_actions(rule_id, item)?);
            }
            continue;
        }
        let collection = lookup_field(rule_id, key)?;
        for comparison in parse_comparisons(rule_id, key, operand)? {
            // Forcing membership in an empty set cannot be satisfied.
            if matches!(&comparison, Comparison::In(ids) if ids.is_empty()) {
                return Err(invalid(rule_id, key, "_in"));
            }
            actions.push(Action {
                collection,
                comparison,
            });
        }
    }

    Ok(actions)
}

fn lookup_field(rule_id: &str, field: &str) -> Result<Collection, RuleParseError> {
    Collection::lookup(field).ok_or_else(|| RuleParseError::UnknownField {
        rule_id: rule_id.to_string(),
        field: field.to_string(),
    })
}

fn parse_comparisons(
    rule_id: &str,
    field: &str,
    operand: &Value,
) -> Result<Vec<Comparison>, RuleParseError> {
    let operators = match operand.as_object() {
        Some(ops) if !ops.is_empty() => ops,
        _ => return Err(invalid(rule_id, field, "<missing>")),
    };

    operators
        .iter()
        .map(|(operator, value)| {
            let comparison = match operator.as_str() {
                "_eq" => coerce_id(value).map(Comparison::Eq),
                "_neq" => coerce_id(value).map(Comparison::Neq),
                "_in" => id_list(value).map(Comparison::In),
                "_nin" => id_list(value).map(Comparison::Nin),
                _ => {
                    return Err(RuleParseError::UnknownOperator {
                        rule_id: rule_id.to_string(),
                        field: field.to_string(),
                        operator: operator.clone(),
                    })
                }
            };
            comparison.ok_or_else(|| invalid(rule_id, field, operator))
        })
        .collect()
}

/// Ids from an array or a comma-separated string, de-duplicated in order.
/// Any element that is not an id invalidates the whole list.
fn id_list(value: &Value) -> Option<Vec<DbId>> {
    let raw: Vec<Option<DbId>> = match value {
        Value::Array(items) => items.iter().map(coerce_id).collect(),
        Value::String(text) if text.trim().is_empty() => Vec::new(),
        Value::String(text) => text
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect(),
        _ => return None,
    };
    let mut ids = Vec::with_capacity(raw.len());
    for id in raw {
        let id = id?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Some(ids)
}

fn invalid(rule_id: &str, field: &str, operator: &str) -> RuleParseError {
    RuleParseError::InvalidOperand {
        rule_id: rule_id.to_string(),
        field: field.to_string(),
        operator: operator.to_string(),
    }
}
