//! Rows of `product_line_defaults` and `product_overrides`.

use configurator_core::overrides::{ItemRef, OverrideEntry, OverrideScope};
use configurator_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A default entry of a product line.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LineDefaultRecord {
    pub product_line_id: DbId,
    pub collection: String,
    pub item: String,
}

/// An override entry of a product.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductOverrideRecord {
    pub product_id: DbId,
    pub collection: String,
    pub item: String,
}

impl From<LineDefaultRecord> for OverrideEntry {
    fn from(record: LineDefaultRecord) -> Self {
        OverrideEntry {
            scope: OverrideScope::ProductLine(record.product_line_id),
            collection: record.collection,
            item: ItemRef::Text(record.item),
        }
    }
}

impl From<ProductOverrideRecord> for OverrideEntry {
    fn from(record: ProductOverrideRecord) -> Self {
        OverrideEntry {
            scope: OverrideScope::Product(record.product_id),
            collection: record.collection,
            item: ItemRef::Text(record.item),
        }
    }
}
