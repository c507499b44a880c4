//! Rows of `product_combinations`.

use configurator_core::filtering::CombinationRow;
use configurator_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CombinationRecord {
    pub id: DbId,
    pub product_line_id: DbId,
    pub product_id: Option<DbId>,
    pub mirror_style_id: Option<DbId>,
    pub light_direction_id: Option<DbId>,
    pub size_id: Option<DbId>,
    pub light_output_id: Option<DbId>,
    pub color_temperature_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub mounting_option_id: Option<DbId>,
    pub frame_color_id: Option<DbId>,
}

impl From<CombinationRecord> for CombinationRow {
    fn from(record: CombinationRecord) -> Self {
        CombinationRow {
            product_line_id: record.product_line_id,
            product_id: record.product_id,
            mirror_style_id: record.mirror_style_id,
            light_direction_id: record.light_direction_id,
            size_id: record.size_id,
            light_output_id: record.light_output_id,
            color_temperature_id: record.color_temperature_id,
            driver_id: record.driver_id,
            mounting_option_id: record.mounting_option_id,
            frame_color_id: record.frame_color_id,
        }
    }
}
