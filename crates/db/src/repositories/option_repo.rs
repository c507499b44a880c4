//! Repository for the per-collection option tables.

use configurator_core::catalog::OptionCatalog;
use configurator_core::collections::Collection;
use sqlx::PgPool;

use crate::models::option::OptionRow;

/// Column list shared by every collection table.
const COLUMNS: &str = "id, name, sku_code, active, sort, width, height, hex";

pub struct OptionRepo;

impl OptionRepo {
    /// All rows of one collection, inactive included. The table name is the
    /// collection key, which only ever comes from the registry.
    pub async fn list_by_collection(
        pool: &PgPool,
        collection: Collection,
    ) -> Result<Vec<OptionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} ORDER BY sort NULLS LAST, id",
            table = collection.key()
        );
        sqlx::query_as::<_, OptionRow>(&query).fetch_all(pool).await
    }

    /// Load every collection into a catalog.
    pub async fn load_catalog(pool: &PgPool) -> Result<OptionCatalog, sqlx::Error> {
        let mut catalog = OptionCatalog::new();
        for collection in Collection::ALL {
            let rows = Self::list_by_collection(pool, collection).await?;
            tracing::debug!(collection = %collection, count = rows.len(), "Loaded options");
            catalog.insert(collection, rows.into_iter().map(Into::into).collect());
        }
        Ok(catalog)
    }
}
