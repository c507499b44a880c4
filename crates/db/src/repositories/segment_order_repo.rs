//! Repository for the `segment_order` table.

use configurator_core::display::SegmentConfig;
use sqlx::PgPool;

use crate::models::segment::SegmentRecord;

pub struct SegmentOrderRepo;

impl SegmentOrderRepo {
    /// Rows in storage order; display sorting happens in core.
    pub async fn list(pool: &PgPool) -> Result<Vec<SegmentRecord>, sqlx::Error> {
        sqlx::query_as::<_, SegmentRecord>(
            "SELECT id, collection, enabled_in_sku, ui_type, sort FROM segment_order",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn load_segments(pool: &PgPool) -> Result<Vec<SegmentConfig>, sqlx::Error> {
        let records = Self::list(pool).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
