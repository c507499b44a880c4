//! Declarative configurator rules.
//!
//! Rules arrive as `if_this` / `then_that` JSON predicates. They are parsed
//! once into typed [`model::Rule`] values, evaluated by a pure evaluator, and
//! reported to the UI as [`disabled::DisabledOptions`].

pub mod disabled;
pub mod evaluator;
pub mod model;
pub mod parse;

pub use disabled::{is_option_disabled_by_rules, DisabledOptions};
pub use evaluator::{
    apply_forced_values, apply_rules_complete, evaluate_rules, RuleOutcome, RulesApplication,
};
pub use model::{Action, Comparison, ForcedValue, Predicate, RawRule, Rule};
pub use parse::{parse_rule, parse_rules, RuleParseError};
