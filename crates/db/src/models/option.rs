//! Rows of the per-collection option tables.

use configurator_core::catalog::OptionItem;
use configurator_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from any collection table (`sizes`, `drivers`, ...).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OptionRow {
    pub id: DbId,
    pub name: String,
    pub sku_code: Option<String>,
    pub active: Option<bool>,
    pub sort: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub hex: Option<String>,
}

impl From<OptionRow> for OptionItem {
    fn from(row: OptionRow) -> Self {
        OptionItem {
            id: row.id,
            name: row.name,
            sku_code: row.sku_code.map(|c| c.trim().to_string()).unwrap_or_default(),
            active: row.active.unwrap_or(true),
            sort: row.sort,
            width: row.width,
            height: row.height,
            hex: row.hex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_get_catalog_defaults() {
        let item = OptionItem::from(OptionRow {
            id: 5,
            name: "36\" Diameter".to_string(),
            sku_code: Some(" 0036 ".to_string()),
            active: None,
            sort: None,
            width: Some(36.0),
            height: Some(36.0),
            hex: None,
        });
        assert_eq!(item.sku_code, "0036");
        assert!(item.active);
        assert_eq!(item.width, Some(36.0));
    }
}
