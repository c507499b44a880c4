//! Core operations over cached snapshots.

use std::time::Duration;

use configurator_core::configurator::{configure, filter_options, ConfigureResult, FilterOptionsResult};
use configurator_core::rules::{apply_rules_complete, RulesApplication};
use configurator_core::sku::{BuildSkuResult, DecodedSku, SkuOverrides};
use configurator_core::types::DbId;
use configurator_core::{Configuration, Selection};

use crate::cache::SnapshotCache;
use crate::error::LoaderResult;
use crate::source::SnapshotSource;

pub struct ConfiguratorService<S> {
    cache: SnapshotCache<S>,
}

impl<S: SnapshotSource> ConfiguratorService<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            cache: SnapshotCache::new(source, ttl),
        }
    }

    pub fn cache(&self) -> &SnapshotCache<S> {
        &self.cache
    }

    pub async fn filter_options(
        &self,
        selection: &Selection,
        product_line_id: DbId,
        current_product: Option<DbId>,
    ) -> LoaderResult<FilterOptionsResult> {
        let data = self.cache.get(product_line_id).await?;
        Ok(filter_options(&data, selection, product_line_id, current_product))
    }

    pub async fn apply_rules_complete(
        &self,
        config: &Configuration,
        product_line_id: DbId,
    ) -> LoaderResult<RulesApplication> {
        let data = self.cache.get(product_line_id).await?;
        Ok(apply_rules_complete(&data.rules, config))
    }

    pub async fn build_sku(
        &self,
        config: &Configuration,
        product_line_id: DbId,
        overrides: Option<&SkuOverrides>,
    ) -> LoaderResult<BuildSkuResult> {
        let data = self.cache.get(product_line_id).await?;
        let product_line = data.product_line(product_line_id)?;
        Ok(data.codec(product_line_id).encode(config, product_line, overrides))
    }

    pub async fn decode_sku(&self, sku: &str, product_line_id: DbId) -> LoaderResult<DecodedSku> {
        let data = self.cache.get(product_line_id).await?;
        let product_line = data.product_line(product_line_id)?;
        Ok(data.codec(product_line_id).decode(sku, product_line))
    }

    pub async fn configure(
        &self,
        config: &Configuration,
        product_line_id: DbId,
        current_product: Option<DbId>,
    ) -> LoaderResult<ConfigureResult> {
        let data = self.cache.get(product_line_id).await?;
        Ok(configure(&data, config, product_line_id, current_product)?)
    }
}
