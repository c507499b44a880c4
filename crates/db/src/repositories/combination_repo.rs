//! Repository for the `product_combinations` table.

use configurator_core::filtering::CombinationRow;
use configurator_core::types::DbId;
use sqlx::PgPool;

use crate::models::combination::CombinationRecord;

const COLUMNS: &str = "id, product_line_id, product_id, mirror_style_id, light_direction_id, \
    size_id, light_output_id, color_temperature_id, driver_id, mounting_option_id, frame_color_id";

pub struct CombinationRepo;

impl CombinationRepo {
    pub async fn list_by_product_line(
        pool: &PgPool,
        product_line_id: DbId,
    ) -> Result<Vec<CombinationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_combinations WHERE product_line_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, CombinationRecord>(&query)
            .bind(product_line_id)
            .fetch_all(pool)
            .await
    }

    /// The combination index of a product line, as core rows.
    pub async fn load_index(
        pool: &PgPool,
        product_line_id: DbId,
    ) -> Result<Vec<CombinationRow>, sqlx::Error> {
        let records = Self::list_by_product_line(pool, product_line_id).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
