//! Dynamic option filtering over the combination index.
//!
//! Given a partial selection, a row of the index is *active* when every
//! selected field matches the row's column exactly. The ids still available
//! for a collection are the distinct non-null values its column takes
//! across active rows. Filtering is advisory: unknown keys and values that
//! are not ids are dropped rather than rejected.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{OptionCatalog, OptionItem};
use crate::collections::Collection;
use crate::selection::{coerce_id, Selection};
use crate::types::DbId;

/// One concretely buildable product configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationRow {
    pub product_line_id: DbId,
    #[serde(default)]
    pub product_id: Option<DbId>,
    #[serde(default)]
    pub mirror_style_id: Option<DbId>,
    #[serde(default)]
    pub light_direction_id: Option<DbId>,
    #[serde(default)]
    pub size_id: Option<DbId>,
    #[serde(default)]
    pub light_output_id: Option<DbId>,
    #[serde(default)]
    pub color_temperature_id: Option<DbId>,
    #[serde(default)]
    pub driver_id: Option<DbId>,
    #[serde(default)]
    pub mounting_option_id: Option<DbId>,
    #[serde(default)]
    pub frame_color_id: Option<DbId>,
}

impl CombinationRow {
    pub fn new(product_line_id: DbId) -> Self {
        Self {
            product_line_id,
            ..Self::default()
        }
    }

    /// Column value for a collection. Accessories have no column.
    pub fn column(&self, collection: Collection) -> Option<DbId> {
        match collection {
            Collection::ProductLines => Some(self.product_line_id),
            Collection::MirrorStyles => self.mirror_style_id,
            Collection::LightDirections => self.light_direction_id,
            Collection::Sizes => self.size_id,
            Collection::LightOutputs => self.light_output_id,
            Collection::ColorTemperatures => self.color_temperature_id,
            Collection::Drivers => self.driver_id,
            Collection::MountingOptions => self.mounting_option_id,
            Collection::FrameColors => self.frame_color_id,
            Collection::Accessories => None,
        }
    }

    pub fn with(mut self, collection: Collection, id: DbId) -> Self {
        let slot = match collection {
            Collection::ProductLines => {
                self.product_line_id = id;
                return self;
            }
            Collection::MirrorStyles => &mut self.mirror_style_id,
            Collection::LightDirections => &mut self.light_direction_id,
            Collection::Sizes => &mut self.size_id,
            Collection::LightOutputs => &mut self.light_output_id,
            Collection::ColorTemperatures => &mut self.color_temperature_id,
            Collection::Drivers => &mut self.driver_id,
            Collection::MountingOptions => &mut self.mounting_option_id,
            Collection::FrameColors => &mut self.frame_color_id,
            Collection::Accessories => return self,
        };
        *slot = Some(id);
        self
    }

    pub fn with_product(mut self, product_id: DbId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    fn matches(&self, pairs: &[(Collection, DbId)]) -> bool {
        pairs
            .iter()
            .all(|(collection, id)| self.column(*collection) == Some(*id))
    }
}

/// Collections that have a column in the combination index.
pub fn filterable_collections() -> impl Iterator<Item = Collection> {
    Collection::ALL.into_iter().filter(|c| c.is_filterable())
}

/// Availability computed for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterResult {
    /// Every filterable collection has an entry, possibly empty.
    pub available_ids: BTreeMap<Collection, BTreeSet<DbId>>,
    pub matching_row_count: usize,
    pub matching_rows: Vec<CombinationRow>,
    /// Distinct products among the matching rows.
    pub product_count: usize,
}

impl FilterResult {
    pub fn available(&self, collection: Collection) -> Option<&BTreeSet<DbId>> {
        self.available_ids.get(&collection)
    }

    pub fn is_available(&self, collection: Collection, id: DbId) -> bool {
        self.available(collection).is_some_and(|ids| ids.contains(&id))
    }

    /// No row matches the selection at all.
    pub fn is_impossible(&self) -> bool {
        self.matching_row_count == 0
    }
}

/// Normalize a raw selection into `(collection, id)` pairs.
///
/// Unknown keys, accessories, and values that are unset, empty or not
/// integral are dropped. When both the field name (`size`) and the
/// collection key (`sizes`) carry a value, the field name wins.
pub fn normalize_selection(selection: &Selection) -> Vec<(Collection, DbId)> {
    let mut picked: BTreeMap<Collection, (bool, DbId)> = BTreeMap::new();
    for (key, value) in selection {
        let Some(collection) = Collection::lookup(key) else {
            continue;
        };
        if !collection.is_filterable() {
            continue;
        }
        let Some(id) = coerce_id(value) else {
            continue;
        };
        let by_field = key.as_str() == collection.field();
        match picked.get(&collection) {
            Some(&(kept_by_field, kept)) if kept_by_field || !by_field => {
                if kept != id {
                    tracing::debug!(
                        collection = %collection,
                        kept,
                        ignored = id,
                        "Conflicting selection keys, using the field name",
                    );
                }
            }
            _ => {
                picked.insert(collection, (by_field, id));
            }
        }
    }
    picked
        .into_iter()
        .map(|(collection, (_, id))| (collection, id))
        .collect()
}

/// Filter the combination index by a raw selection.
pub fn filter_combinations(selection: &Selection, rows: &[CombinationRow]) -> FilterResult {
    filter_by_pairs(&normalize_selection(selection), rows.iter())
}

/// Filter an arbitrary row set by already-normalized pairs.
pub fn filter_by_pairs<'a>(
    pairs: &[(Collection, DbId)],
    rows: impl IntoIterator<Item = &'a CombinationRow>,
) -> FilterResult {
    let mut available_ids: BTreeMap<Collection, BTreeSet<DbId>> =
        filterable_collections().map(|c| (c, BTreeSet::new())).collect();
    let mut matching_rows = Vec::new();
    let mut products = BTreeSet::new();

    for row in rows.into_iter().filter(|row| row.matches(pairs)) {
        for (collection, ids) in available_ids.iter_mut() {
            if let Some(id) = row.column(*collection) {
                ids.insert(id);
            }
        }
        if let Some(product_id) = row.product_id {
            products.insert(product_id);
        }
        matching_rows.push(row.clone());
    }

    FilterResult {
        available_ids,
        matching_row_count: matching_rows.len(),
        matching_rows,
        product_count: products.len(),
    }
}

/// Turn available ids into option objects. Ids without catalog metadata
/// are left out.
pub fn materialize_options(
    available: &BTreeMap<Collection, BTreeSet<DbId>>,
    catalog: &OptionCatalog,
) -> BTreeMap<Collection, Vec<OptionItem>> {
    available
        .iter()
        .map(|(collection, ids)| (*collection, catalog.materialize(*collection, ids)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sel(value: serde_json::Value) -> Selection {
        value.as_object().cloned().unwrap_or_default()
    }

    fn scenario_rows() -> Vec<CombinationRow> {
        vec![
            CombinationRow::new(1)
                .with(Collection::Sizes, 1)
                .with(Collection::FrameColors, 1),
            CombinationRow::new(1)
                .with(Collection::Sizes, 1)
                .with(Collection::FrameColors, 2),
            CombinationRow::new(1)
                .with(Collection::Sizes, 2)
                .with(Collection::FrameColors, 1),
        ]
    }

    fn index() -> Vec<CombinationRow> {
        vec![
            CombinationRow::new(1)
                .with_product(10)
                .with(Collection::MirrorStyles, 1)
                .with(Collection::Sizes, 1)
                .with(Collection::Drivers, 1)
                .with(Collection::FrameColors, 1),
            CombinationRow::new(1)
                .with_product(10)
                .with(Collection::MirrorStyles, 1)
                .with(Collection::Sizes, 2)
                .with(Collection::Drivers, 2)
                .with(Collection::FrameColors, 1),
            CombinationRow::new(1)
                .with_product(11)
                .with(Collection::MirrorStyles, 2)
                .with(Collection::Sizes, 2)
                .with(Collection::Drivers, 2)
                .with(Collection::FrameColors, 2),
            CombinationRow::new(1)
                .with_product(12)
                .with(Collection::MirrorStyles, 2)
                .with(Collection::Sizes, 3)
                .with(Collection::FrameColors, 3),
        ]
    }

    // -- Scenario: size narrows color --

    #[test]
    fn selecting_size_narrows_colors() {
        let rows = scenario_rows();
        let one = filter_combinations(&sel(json!({"size": 1})), &rows);
        assert_eq!(one.available(Collection::FrameColors), Some(&BTreeSet::from([1, 2])));
        let two = filter_combinations(&sel(json!({"size": 2})), &rows);
        assert_eq!(two.available(Collection::FrameColors), Some(&BTreeSet::from([1])));
    }

    // -- Empty selection --

    #[test]
    fn empty_selection_makes_everything_available() {
        let rows = index();
        let result = filter_combinations(&Selection::new(), &rows);
        assert_eq!(result.matching_row_count, 4);
        assert_eq!(result.product_count, 3);
        assert_eq!(result.available(Collection::Sizes), Some(&BTreeSet::from([1, 2, 3])));
        assert_eq!(result.available(Collection::Drivers), Some(&BTreeSet::from([1, 2])));
        assert_eq!(result.available(Collection::LightOutputs), Some(&BTreeSet::new()));
    }

    // -- Monotonic restriction --

    #[test]
    fn adding_a_field_only_restricts() {
        let rows = index();
        let base = filter_combinations(&sel(json!({"mirror_style": 2})), &rows);
        let narrowed = filter_combinations(&sel(json!({"mirror_style": 2, "size": 2})), &rows);
        for collection in filterable_collections() {
            let before = base.available(collection).unwrap();
            let after = narrowed.available(collection).unwrap();
            assert!(after.is_subset(before), "{collection} grew");
        }
        assert_eq!(narrowed.available(Collection::FrameColors), Some(&BTreeSet::from([2])));
    }

    #[test]
    fn every_prefix_of_a_selection_is_monotonic() {
        let rows = index();
        let fields = [("mirror_style", 1), ("size", 2), ("driver", 2), ("frame_color", 1)];
        let mut selection = Selection::new();
        let mut previous = filter_combinations(&selection, &rows);
        for (field, id) in fields {
            selection.insert(field.to_string(), json!(id));
            let next = filter_combinations(&selection, &rows);
            for collection in filterable_collections() {
                assert!(next
                    .available(collection)
                    .unwrap()
                    .is_subset(previous.available(collection).unwrap()));
            }
            previous = next;
        }
        assert_eq!(previous.matching_row_count, 1);
    }

    // -- Edge cases --

    #[test]
    fn empty_index_yields_empty_availability() {
        let result = filter_combinations(&sel(json!({"size": 1})), &[]);
        assert_eq!(result.matching_row_count, 0);
        assert_eq!(result.product_count, 0);
        assert!(result.available_ids.values().all(BTreeSet::is_empty));
        assert!(result.is_impossible());
    }

    #[test]
    fn impossible_selection_empties_everything() {
        let result = filter_combinations(&sel(json!({"size": 1, "mirror_style": 2})), &index());
        assert!(result.is_impossible());
        assert!(result.available_ids.values().all(BTreeSet::is_empty));
    }

    #[test]
    fn junk_fields_are_dropped_not_rejected() {
        let rows = index();
        let result = filter_combinations(
            &sel(json!({"size": "", "driver": "abc", "widgets": 4, "frame_color": null})),
            &rows,
        );
        assert_eq!(result.matching_row_count, rows.len());
    }

    #[test]
    fn numeric_strings_and_collection_keys_are_accepted() {
        let result = filter_combinations(&sel(json!({"sizes": "3"})), &index());
        assert_eq!(result.matching_row_count, 1);
        assert_eq!(result.available(Collection::FrameColors), Some(&BTreeSet::from([3])));
    }

    #[test]
    fn null_columns_never_match_a_selected_value() {
        // Row 4 has no driver; selecting driver 1 must exclude it.
        let result = filter_combinations(&sel(json!({"driver": 1})), &index());
        assert_eq!(result.matching_row_count, 1);
    }

    #[test]
    fn accessories_do_not_filter_rows() {
        let result = filter_combinations(&sel(json!({"accessories": [1, 2]})), &index());
        assert_eq!(result.matching_row_count, 4);
        assert!(!result.available_ids.contains_key(&Collection::Accessories));
    }

    #[test]
    fn materialize_omits_ids_without_metadata() {
        let rows = index();
        let result = filter_combinations(&Selection::new(), &rows);
        let catalog = OptionCatalog::new().with(
            Collection::Sizes,
            vec![OptionItem::new(1, "Small", "S"), OptionItem::new(2, "Medium", "M")],
        );
        let options = materialize_options(&result.available_ids, &catalog);
        let sizes: Vec<DbId> = options[&Collection::Sizes].iter().map(|o| o.id).collect();
        assert_eq!(sizes, vec![1, 2]);
        // Id 3 still matched rows even though it has no metadata.
        assert!(result.is_available(Collection::Sizes, 3));
    }

    #[test]
    fn field_name_wins_over_collection_key() {
        let pairs = normalize_selection(&sel(json!({"size": 3, "sizes": 1, "drivers": 2})));
        assert_eq!(pairs, vec![(Collection::Sizes, 3), (Collection::Drivers, 2)]);

        let pairs = normalize_selection(&sel(json!({"sizes": 1, "size": "3"})));
        assert_eq!(pairs, vec![(Collection::Sizes, 3)]);
    }

    #[test]
    fn filtering_is_repeatable() {
        let rows = index();
        let selection = sel(json!({"mirror_style": 1}));
        assert_eq!(
            filter_combinations(&selection, &rows),
            filter_combinations(&selection, &rows)
        );
    }
}
