//! Where snapshots come from.

use std::sync::Arc;

use async_trait::async_trait;
use configurator_core::collections::Collection;
use configurator_core::display::SegmentConfig;
use configurator_core::error::CoreError;
use configurator_core::filtering::CombinationRow;
use configurator_core::overrides::OverrideEntry;
use configurator_core::rules::{parse_rules, RawRule};
use configurator_core::sku::SkuSettings;
use configurator_core::types::DbId;
use configurator_core::validation::{
    validate_collection_mapping, validate_combination_rows, validate_rules,
};
use configurator_core::{ConfiguratorData, OptionCatalog};
use configurator_db::repositories::{
    CombinationRepo, OptionRepo, OverrideRepo, RuleRepo, SegmentOrderRepo,
};
use configurator_db::DbPool;

use crate::error::LoaderResult;

/// Loads the data of one product line.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load(&self, product_line_id: DbId) -> LoaderResult<ConfiguratorData>;
}

#[async_trait]
impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    async fn load(&self, product_line_id: DbId) -> LoaderResult<ConfiguratorData> {
        (**self).load(product_line_id).await
    }
}

/// Reads snapshots from Postgres.
pub struct PgSnapshotSource {
    pool: DbPool,
    sku_settings: SkuSettings,
}

impl PgSnapshotSource {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            sku_settings: SkuSettings::default(),
        }
    }

    pub fn with_sku_settings(mut self, sku_settings: SkuSettings) -> Self {
        self.sku_settings = sku_settings;
        self
    }
}

#[async_trait]
impl SnapshotSource for PgSnapshotSource {
    async fn load(&self, product_line_id: DbId) -> LoaderResult<ConfiguratorData> {
        let catalog = OptionRepo::load_catalog(&self.pool).await?;
        if catalog.find(Collection::ProductLines, product_line_id).is_none() {
            return Err(CoreError::NotFound {
                entity: "product_line",
                id: product_line_id,
            }
            .into());
        }

        let combinations = CombinationRepo::load_index(&self.pool, product_line_id).await?;
        let raw_rules = RuleRepo::load_raw(&self.pool, product_line_id).await?;
        let overrides = OverrideRepo::load_entries(&self.pool, product_line_id).await?;
        let segments = SegmentOrderRepo::load_segments(&self.pool).await?;

        Ok(assemble_snapshot(
            product_line_id,
            catalog,
            combinations,
            &raw_rules,
            overrides,
            segments,
            self.sku_settings.clone(),
        ))
    }
}

/// Parse rules and build the snapshot. Integrity problems are logged, not
/// fatal: malformed rules are skipped, everything else is kept.
pub fn assemble_snapshot(
    product_line_id: DbId,
    catalog: OptionCatalog,
    combinations: Vec<CombinationRow>,
    raw_rules: &[RawRule],
    overrides: Vec<OverrideEntry>,
    segments: Vec<SegmentConfig>,
    sku_settings: SkuSettings,
) -> ConfiguratorData {
    let problems = validate_collection_mapping(&segments, Some(&catalog))
        .into_iter()
        .chain(validate_rules(raw_rules))
        .chain(validate_combination_rows(&combinations, &catalog));
    for problem in problems {
        tracing::warn!(product_line_id, problem = %problem, "Snapshot integrity problem");
    }

    let rules = parse_rules(raw_rules);
    tracing::info!(
        product_line_id,
        rows = combinations.len(),
        rules = rules.len(),
        skipped_rules = raw_rules.len() - rules.len(),
        overrides = overrides.len(),
        "Snapshot loaded",
    );

    ConfiguratorData {
        catalog,
        combinations,
        rules,
        overrides,
        segments,
        sku_settings,
    }
}
