//! Repository for the `configurator_rules` table.

use configurator_core::rules::RawRule;
use configurator_core::types::DbId;
use sqlx::PgPool;

use crate::models::rule::RuleRecord;

const COLUMNS: &str =
    "id, name, priority, product_line_id, active, if_this, then_that, updated_at";

pub struct RuleRepo;

impl RuleRepo {
    /// Active rules that apply to a product line: its own plus global
    /// (`product_line_id IS NULL`) rules, in id order. Id order becomes the
    /// rule's load position.
    pub async fn list_active(
        pool: &PgPool,
        product_line_id: DbId,
    ) -> Result<Vec<RuleRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM configurator_rules \
             WHERE active = true AND (product_line_id IS NULL OR product_line_id = $1) \
             ORDER BY id"
        );
        sqlx::query_as::<_, RuleRecord>(&query)
            .bind(product_line_id)
            .fetch_all(pool)
            .await
    }

    pub async fn load_raw(pool: &PgPool, product_line_id: DbId) -> Result<Vec<RawRule>, sqlx::Error> {
        let records = Self::list_active(pool, product_line_id).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
