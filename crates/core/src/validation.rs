//! Load-time integrity checks.
//!
//! These never fail; they return human-readable problems so the caller can
//! log them or refuse a snapshot.

use std::collections::BTreeSet;

use crate::catalog::OptionCatalog;
use crate::collections::{Collection, UiType};
use crate::display::SegmentConfig;
use crate::filtering::{filterable_collections, CombinationRow};
use crate::rules::{parse_rule, RawRule};

/// Every segment must name a known collection (once) with a supported UI
/// type. With a catalog, the collection must also have loaded options.
pub fn validate_collection_mapping(
    segments: &[SegmentConfig],
    catalog: Option<&OptionCatalog>,
) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();

    for segment in segments {
        let Some(collection) = Collection::lookup(&segment.collection) else {
            problems.push(format!("Unmapped collection '{}'", segment.collection));
            continue;
        };
        if !seen.insert(collection) {
            problems.push(format!("Collection '{}' listed more than once", collection.key()));
        }
        if let Some(raw) = segment.ui_type.as_deref() {
            if let Err(err) = UiType::parse(raw) {
                problems.push(format!("Collection '{}': {err}", collection.key()));
            }
        }
        if let Some(catalog) = catalog {
            if !catalog.has_collection(collection) {
                problems.push(format!("Collection '{}' has no loaded options", collection.key()));
            }
        }
    }

    problems
}

/// Parse errors plus duplicate ids.
pub fn validate_rules(rules: &[RawRule]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut ids = BTreeSet::new();

    for raw in rules {
        if !ids.insert(raw.id.as_str()) {
            problems.push(format!("Duplicate rule id '{}'", raw.id));
        }
        if let Err(err) = parse_rule(raw) {
            problems.push(err.to_string());
        }
    }

    problems
}

/// Every non-null id in a combination row must exist in the catalog.
pub fn validate_combination_rows(rows: &[CombinationRow], catalog: &OptionCatalog) -> Vec<String> {
    let mut problems = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        for collection in filterable_collections() {
            let Some(id) = row.column(collection) else {
                continue;
            };
            if catalog.find(collection, id).is_none() {
                problems.push(format!(
                    "Combination row {index}: unknown {} id {id}",
                    collection.field()
                ));
            }
        }
    }

    problems
}
