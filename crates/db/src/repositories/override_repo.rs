//! Repository for `product_line_defaults` and `product_overrides`.

use configurator_core::overrides::OverrideEntry;
use configurator_core::types::DbId;
use sqlx::PgPool;

use crate::models::override_entry::{LineDefaultRecord, ProductOverrideRecord};

pub struct OverrideRepo;

impl OverrideRepo {
    pub async fn list_line_defaults(
        pool: &PgPool,
        product_line_id: DbId,
    ) -> Result<Vec<LineDefaultRecord>, sqlx::Error> {
        sqlx::query_as::<_, LineDefaultRecord>(
            "SELECT product_line_id, collection, item FROM product_line_defaults \
             WHERE product_line_id = $1 ORDER BY id",
        )
        .bind(product_line_id)
        .fetch_all(pool)
        .await
    }

    /// Overrides of every product in the line.
    pub async fn list_product_overrides(
        pool: &PgPool,
        product_line_id: DbId,
    ) -> Result<Vec<ProductOverrideRecord>, sqlx::Error> {
        sqlx::query_as::<_, ProductOverrideRecord>(
            "SELECT po.product_id, po.collection, po.item \
             FROM product_overrides po \
             JOIN products p ON p.id = po.product_id \
             WHERE p.product_line_id = $1 \
             ORDER BY po.id",
        )
        .bind(product_line_id)
        .fetch_all(pool)
        .await
    }

    /// Line defaults followed by product overrides, scope-tagged.
    pub async fn load_entries(
        pool: &PgPool,
        product_line_id: DbId,
    ) -> Result<Vec<OverrideEntry>, sqlx::Error> {
        let defaults = Self::list_line_defaults(pool, product_line_id).await?;
        let overrides = Self::list_product_overrides(pool, product_line_id).await?;
        Ok(defaults
            .into_iter()
            .map(OverrideEntry::from)
            .chain(overrides.into_iter().map(OverrideEntry::from))
            .collect())
    }
}
