//! Rows of `configurator_rules`.

use configurator_core::rules::RawRule;
use configurator_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A stored rule. `if_this` / `then_that` are JSONB holding either an
/// object or a JSON-encoded string; parsing happens in core.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleRecord {
    pub id: DbId,
    pub name: Option<String>,
    pub priority: Option<i32>,
    pub product_line_id: Option<DbId>,
    pub active: bool,
    pub if_this: serde_json::Value,
    pub then_that: serde_json::Value,
    pub updated_at: Timestamp,
}

impl From<RuleRecord> for RawRule {
    fn from(record: RuleRecord) -> Self {
        RawRule {
            id: record.id.to_string(),
            name: record.name,
            priority: record.priority.map(i64::from),
            if_this: record.if_this,
            then_that: record.then_that,
        }
    }
}
