//! The per-interaction pipeline.
//!
//! [`configure`] runs the fixed protocol:
//!
//! 1. filter the combination index with the raw selection;
//! 2. evaluate rules against the raw selection (plus one cascade pass);
//! 3. apply forced values onto a copy of the selection;
//! 4. filter again with the rule-adjusted selection;
//! 5. merge rule exclusions with the second pass's unavailable ids.
//!
//! The adjusted configuration is then rendered as a SKU.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::{OptionCatalog, OptionItem};
use crate::collections::Collection;
use crate::display::{
    build_ordered_component_configs, filter_available_collections, ComponentConfig, SegmentConfig,
};
use crate::error::CoreError;
use crate::filtering::{filter_by_pairs, materialize_options, normalize_selection, CombinationRow};
use crate::overrides::{entries_for_scope, resolve_for, EffectiveOptions, OverrideEntry, OverrideScope};
use crate::rules::{apply_rules_complete, DisabledOptions, Rule, RulesApplication};
use crate::selection::{Configuration, Selection};
use crate::sku::{BuildSkuResult, SkuCodec, SkuSettings};
use crate::types::DbId;

/// Everything the pipeline needs, already loaded.
#[derive(Debug, Clone, Default)]
pub struct ConfiguratorData {
    pub catalog: OptionCatalog,
    pub combinations: Vec<CombinationRow>,
    pub rules: Vec<Rule>,
    /// Line defaults and product overrides, told apart by scope.
    pub overrides: Vec<OverrideEntry>,
    pub segments: Vec<SegmentConfig>,
    pub sku_settings: SkuSettings,
}

impl ConfiguratorData {
    pub fn product_line(&self, id: DbId) -> Result<&OptionItem, CoreError> {
        self.catalog
            .find(Collection::ProductLines, id)
            .ok_or(CoreError::NotFound {
                entity: "product_line",
                id,
            })
    }

    pub fn line_defaults(&self, product_line_id: DbId) -> Vec<OverrideEntry> {
        entries_for_scope(&self.overrides, OverrideScope::ProductLine(product_line_id))
    }

    /// UI sections for a product line, in display order.
    pub fn components(&self, product_line_id: DbId) -> Vec<ComponentConfig> {
        let visible =
            filter_available_collections(&self.segments, &self.line_defaults(product_line_id));
        build_ordered_component_configs(&visible)
    }

    /// SKU codec over the segments configured for a product line. The core
    /// segment is kept even when the line has no defaults for it.
    pub fn codec(&self, product_line_id: DbId) -> SkuCodec<'_> {
        let mut segments =
            filter_available_collections(&self.segments, &self.line_defaults(product_line_id));
        segments.extend(
            self.segments
                .iter()
                .filter(|s| Collection::lookup(&s.collection) == Some(Collection::ProductLines))
                .cloned(),
        );
        SkuCodec::new(&self.catalog, &segments).with_settings(self.sku_settings.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptionsResult {
    /// Selectable ids per collection: combination availability within the
    /// effective universe. Accessories are not part of the combination
    /// index and get their whole universe.
    pub available_ids: BTreeMap<Collection, BTreeSet<DbId>>,
    pub available_options: BTreeMap<Collection, Vec<OptionItem>>,
    /// Universe ids no matching row contains.
    pub unavailable: BTreeMap<Collection, BTreeSet<DbId>>,
    pub matching_row_count: usize,
    pub product_count: usize,
    pub effective: EffectiveOptions,
}

/// Availability for a selection within one product line.
pub fn filter_options(
    data: &ConfiguratorData,
    selection: &Selection,
    product_line_id: DbId,
    current_product: Option<DbId>,
) -> FilterOptionsResult {
    let effective = resolve_for(&data.overrides, product_line_id, current_product, &data.catalog);
    let rows = effective
        .scope_rows(&data.combinations)
        .into_iter()
        .filter(|row| row.product_line_id == product_line_id);
    let filtered = filter_by_pairs(&normalize_selection(selection), rows);

    let mut available_ids = BTreeMap::new();
    let mut unavailable = BTreeMap::new();
    for collection in Collection::ALL {
        let universe = effective.ids(collection);
        let available: BTreeSet<DbId> = match filtered.available(collection) {
            Some(ids) => ids.intersection(&universe).copied().collect(),
            None => universe.clone(),
        };
        let missing: BTreeSet<DbId> = universe.difference(&available).copied().collect();
        if !missing.is_empty() {
            unavailable.insert(collection, missing);
        }
        available_ids.insert(collection, available);
    }

    tracing::debug!(
        product_line_id,
        matching_rows = filtered.matching_row_count,
        products = filtered.product_count,
        "Filtered options",
    );

    FilterOptionsResult {
        available_options: materialize_options(&available_ids, &data.catalog),
        available_ids,
        unavailable,
        matching_row_count: filtered.matching_row_count,
        product_count: filtered.product_count,
        effective,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigureResult {
    /// Rule-adjusted configuration.
    pub configuration: Configuration,
    /// Availability for the raw selection.
    pub initial: FilterOptionsResult,
    /// Availability for the adjusted selection.
    pub options: FilterOptionsResult,
    pub rules: RulesApplication,
    /// Rule exclusions merged with second-pass unavailability.
    pub disabled_options: DisabledOptions,
    pub sku: BuildSkuResult,
    pub components: Vec<ComponentConfig>,
}

/// Run the full pipeline for one interaction.
pub fn configure(
    data: &ConfiguratorData,
    config: &Configuration,
    product_line_id: DbId,
    current_product: Option<DbId>,
) -> Result<ConfigureResult, CoreError> {
    let product_line = data.product_line(product_line_id)?;
    let mut raw = config.clone();
    raw.product_line = Some(product_line_id);

    let initial = filter_options(data, &raw.to_selection(), product_line_id, current_product);
    let rules = apply_rules_complete(&data.rules, &raw);
    let adjusted = rules.adjusted.clone();
    let options = filter_options(data, &adjusted.to_selection(), product_line_id, current_product);

    let mut disabled_options = rules.disabled_options.clone();
    disabled_options.merge_unavailable(options.unavailable.clone());

    let sku = data.codec(product_line_id).encode(&adjusted, product_line, None);

    Ok(ConfigureResult {
        configuration: adjusted,
        initial,
        options,
        rules,
        disabled_options,
        sku,
        components: data.components(product_line_id),
    })
}
