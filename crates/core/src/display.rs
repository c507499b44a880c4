//! Segment order / display order handling.
//!
//! The same externally supplied list drives which configurator sections the
//! UI renders (and in what order) and which segments the SKU contains.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collections::{Collection, UiType};
use crate::overrides::{group_entries, OverrideEntry};

fn default_enabled() -> bool {
    true
}

/// One row of the segment order list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Stable identifier used as the sort tie-break.
    #[serde(default)]
    pub id: Option<String>,
    pub collection: String,
    #[serde(default = "default_enabled")]
    pub enabled_in_sku: bool,
    #[serde(default)]
    pub ui_type: Option<String>,
    /// Kept loose: malformed values sort to the end.
    #[serde(default)]
    pub sort: Value,
}

impl SegmentConfig {
    pub fn new(collection: Collection, sort: i64) -> Self {
        Self {
            id: None,
            collection: collection.key().to_string(),
            enabled_in_sku: true,
            ui_type: None,
            sort: Value::from(sort),
        }
    }

    pub fn disabled_in_sku(mut self) -> Self {
        self.enabled_in_sku = false;
        self
    }

    /// Numeric sort key; null, non-numeric and non-finite values become
    /// `f64::MAX`.
    pub fn sort_key(&self) -> f64 {
        let parsed = match &self.sort {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|f| f.is_finite()).unwrap_or(f64::MAX)
    }

    /// Tie-break identifier: explicit id, else the collection key.
    pub fn stable_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.collection)
    }
}

/// Deterministic ordering: sort key, then stable id lexically.
pub fn compare_segments(a: &SegmentConfig, b: &SegmentConfig) -> Ordering {
    a.sort_key()
        .total_cmp(&b.sort_key())
        .then_with(|| a.stable_id().cmp(b.stable_id()))
}

/// A segment resolved against the collection registry, ready for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentConfig {
    pub id: String,
    pub collection: Collection,
    pub field: &'static str,
    pub title: &'static str,
    pub ui_type: UiType,
    pub enabled_in_sku: bool,
    pub sort: f64,
}

/// Sort segments and resolve them against the registry.
///
/// Unmapped collections and unsupported UI types are skipped here and
/// reported by [`crate::validation::validate_collection_mapping`].
pub fn build_ordered_component_configs(segments: &[SegmentConfig]) -> Vec<ComponentConfig> {
    let mut sorted: Vec<&SegmentConfig> = segments.iter().collect();
    sorted.sort_by(|a, b| compare_segments(a, b));

    sorted
        .into_iter()
        .filter_map(|segment| {
            let Some(collection) = Collection::lookup(&segment.collection) else {
                tracing::warn!(collection = %segment.collection, "Skipping unmapped segment");
                return None;
            };
            let ui_type = match segment.ui_type.as_deref() {
                Some(raw) => match UiType::parse(raw) {
                    Ok(ui_type) => ui_type,
                    Err(err) => {
                        tracing::warn!(collection = %segment.collection, error = %err, "Skipping segment");
                        return None;
                    }
                },
                None => collection.entry().ui_type,
            };
            Some(ComponentConfig {
                id: segment.stable_id().to_string(),
                collection,
                field: collection.field(),
                title: collection.title(),
                ui_type,
                enabled_in_sku: segment.enabled_in_sku,
                sort: segment.sort_key(),
            })
        })
        .collect()
}

/// Segments whose collection is configured for the product line.
///
/// A line with no defaults at all shows every segment.
pub fn filter_available_collections(
    segments: &[SegmentConfig],
    line_defaults: &[OverrideEntry],
) -> Vec<SegmentConfig> {
    let configured: BTreeSet<Collection> = group_entries(line_defaults).into_keys().collect();
    if configured.is_empty() {
        return segments.to_vec();
    }
    segments
        .iter()
        .filter(|segment| {
            Collection::lookup(&segment.collection).is_some_and(|c| configured.contains(&c))
        })
        .cloned()
        .collect()
}

/// Collections that contribute a SKU segment, in segment order.
pub fn sku_segment_order(segments: &[SegmentConfig]) -> Vec<Collection> {
    let mut order = Vec::new();
    for component in build_ordered_component_configs(segments) {
        if component.enabled_in_sku && !order.contains(&component.collection) {
            order.push(component.collection);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(collection: &str, sort: Value) -> SegmentConfig {
        SegmentConfig {
            id: None,
            collection: collection.to_string(),
            enabled_in_sku: true,
            ui_type: None,
            sort,
        }
    }

    fn collections(configs: &[ComponentConfig]) -> Vec<Collection> {
        configs.iter().map(|c| c.collection).collect()
    }

    #[test]
    fn sorts_by_numeric_sort() {
        let segments = vec![
            segment("frame_colors", json!(3)),
            segment("sizes", json!(1)),
            segment("drivers", json!(2)),
        ];
        assert_eq!(
            collections(&build_ordered_component_configs(&segments)),
            vec![Collection::Sizes, Collection::Drivers, Collection::FrameColors]
        );
    }

    #[test]
    fn permutations_produce_the_same_order() {
        let a = vec![
            segment("sizes", json!(1)),
            segment("drivers", json!(1)),
            segment("accessories", json!(1)),
            segment("frame_colors", json!(0)),
        ];
        let mut b = a.clone();
        b.reverse();
        b.swap(0, 2);
        let order_a = build_ordered_component_configs(&a);
        let order_b = build_ordered_component_configs(&b);
        assert_eq!(order_a, order_b);
        assert_eq!(
            collections(&order_a),
            vec![
                Collection::FrameColors,
                Collection::Accessories,
                Collection::Drivers,
                Collection::Sizes
            ]
        );
    }

    #[test]
    fn explicit_id_breaks_ties() {
        let mut first = segment("sizes", json!(5));
        first.id = Some("b".to_string());
        let mut second = segment("drivers", json!(5));
        second.id = Some("a".to_string());
        let order = build_ordered_component_configs(&[first, second]);
        assert_eq!(collections(&order), vec![Collection::Drivers, Collection::Sizes]);
    }

    #[test]
    fn malformed_sort_goes_last() {
        let segments = vec![
            segment("sizes", json!(null)),
            segment("drivers", json!("abc")),
            segment("frame_colors", json!(10)),
            segment("mounting_options", json!("2")),
        ];
        let order = build_ordered_component_configs(&segments);
        assert_eq!(
            collections(&order),
            vec![
                Collection::MountingOptions,
                Collection::FrameColors,
                Collection::Drivers,
                Collection::Sizes
            ]
        );
        assert_eq!(order[3].sort, f64::MAX);
    }

    #[test]
    fn unmapped_and_unsupported_segments_are_skipped() {
        let mut bad_ui = segment("drivers", json!(1));
        bad_ui.ui_type = Some("carousel".to_string());
        let segments = vec![segment("widgets", json!(0)), bad_ui, segment("sizes", json!(2))];
        assert_eq!(
            collections(&build_ordered_component_configs(&segments)),
            vec![Collection::Sizes]
        );
    }

    #[test]
    fn available_collections_follow_line_defaults() {
        let segments = vec![segment("sizes", json!(1)), segment("drivers", json!(2))];
        let defaults = vec![OverrideEntry::line_default(1, Collection::Sizes, 3)];
        let visible = filter_available_collections(&segments, &defaults);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].collection, "sizes");
    }

    #[test]
    fn no_defaults_shows_everything() {
        let segments = vec![segment("sizes", json!(1)), segment("drivers", json!(2))];
        assert_eq!(filter_available_collections(&segments, &[]), segments);
    }

    #[test]
    fn sku_order_skips_disabled_segments() {
        let segments = vec![
            SegmentConfig::new(Collection::FrameColors, 2),
            SegmentConfig::new(Collection::Sizes, 1),
            SegmentConfig::new(Collection::Drivers, 3).disabled_in_sku(),
        ];
        assert_eq!(
            sku_segment_order(&segments),
            vec![Collection::Sizes, Collection::FrameColors]
        );
    }
}
