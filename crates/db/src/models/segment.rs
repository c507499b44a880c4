//! Rows of `segment_order`.

use configurator_core::display::SegmentConfig;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SegmentRecord {
    pub id: String,
    pub collection: String,
    pub enabled_in_sku: bool,
    pub ui_type: Option<String>,
    pub sort: Option<f64>,
}

impl From<SegmentRecord> for SegmentConfig {
    fn from(record: SegmentRecord) -> Self {
        SegmentConfig {
            id: Some(record.id),
            collection: record.collection,
            enabled_in_sku: record.enabled_in_sku,
            ui_type: record.ui_type,
            // NULL and NaN both become JSON null and sort last.
            sort: record
                .sort
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Null, Value::Number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sort: Option<f64>) -> SegmentRecord {
        SegmentRecord {
            id: "seg-1".to_string(),
            collection: "sizes".to_string(),
            enabled_in_sku: true,
            ui_type: None,
            sort,
        }
    }

    #[test]
    fn sort_converts_to_a_sort_key() {
        assert_eq!(SegmentConfig::from(record(Some(2.0))).sort_key(), 2.0);
        assert_eq!(SegmentConfig::from(record(None)).sort_key(), f64::MAX);
        assert_eq!(SegmentConfig::from(record(Some(f64::NAN))).sort_key(), f64::MAX);
    }
}
