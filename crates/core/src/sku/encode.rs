use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::size::size_fragment;
use super::{SkuCodec, ACCESSORY_SEPARATOR, SEGMENT_SEPARATOR};
use crate::catalog::OptionItem;
use crate::collections::Collection;
use crate::selection::Configuration;

/// Caller-supplied fragments that replace computed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuOverrides {
    /// Replaces the whole core segment.
    #[serde(default)]
    pub core: Option<String>,
    #[serde(default)]
    pub segments: BTreeMap<Collection, String>,
}

impl SkuOverrides {
    pub fn core(core: impl Into<String>) -> Self {
        Self {
            core: Some(core.into()),
            segments: BTreeMap::new(),
        }
    }

    pub fn with_segment(mut self, collection: Collection, fragment: impl Into<String>) -> Self {
        self.segments.insert(collection, fragment.into());
        self
    }

    fn fragment(&self, collection: Collection) -> Option<&str> {
        let fragment = if collection == Collection::ProductLines {
            self.core.as_deref()
        } else {
            self.segments.get(&collection).map(String::as_str)
        };
        fragment.filter(|f| !f.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSkuResult {
    pub sku: String,
    /// Fragment per included segment. The core is keyed by `product_lines`.
    pub parts: BTreeMap<Collection, String>,
    /// Segments that produced a fragment, in SKU order.
    pub included_segments: Vec<Collection>,
}

impl SkuCodec<'_> {
    /// Render a configuration. Segments without a value are skipped.
    pub fn encode(
        &self,
        config: &Configuration,
        product_line: &OptionItem,
        overrides: Option<&SkuOverrides>,
    ) -> BuildSkuResult {
        let mut result = BuildSkuResult::default();
        let mut fragments = Vec::new();

        for &collection in &self.order {
            // Folded into the core segment.
            if matches!(collection, Collection::MirrorStyles | Collection::LightDirections) {
                continue;
            }
            let fragment = match overrides.and_then(|o| o.fragment(collection)) {
                Some(fixed) => Some(fixed.to_string()),
                None => self.fragment(collection, config, product_line),
            };
            let Some(fragment) = fragment.filter(|f| !f.is_empty()) else {
                continue;
            };
            fragments.push(fragment.clone());
            result.parts.insert(collection, fragment);
            result.included_segments.push(collection);
        }

        result.sku = fragments.join(&SEGMENT_SEPARATOR.to_string());
        tracing::debug!(sku = %result.sku, segments = result.included_segments.len(), "Encoded SKU");
        result
    }

    fn fragment(
        &self,
        collection: Collection,
        config: &Configuration,
        product_line: &OptionItem,
    ) -> Option<String> {
        match collection {
            Collection::ProductLines => {
                let core: String = [
                    Some(product_line.sku_code.as_str()),
                    self.code_for(Collection::MirrorStyles, config),
                    self.code_for(Collection::LightDirections, config),
                ]
                .into_iter()
                .flatten()
                .collect();
                Some(core)
            }
            Collection::Sizes => size_fragment(config, self.catalog, self.settings.custom_size_format),
            Collection::Accessories => {
                let codes: Vec<&str> = config
                    .accessories
                    .iter()
                    .filter_map(|id| self.catalog.code(Collection::Accessories, *id))
                    .collect();
                (!codes.is_empty()).then(|| codes.join(&ACCESSORY_SEPARATOR.to_string()))
            }
            other => self.code_for(other, config).map(str::to_string),
        }
    }

    fn code_for(&self, collection: Collection, config: &Configuration) -> Option<&str> {
        config
            .value(collection)
            .and_then(|id| self.catalog.code(collection, id))
    }
}
