//! Default/override resolution.
//!
//! A product line carries default option entries per collection; a product
//! may carry its own override entries. For each collection the effective
//! universe is, in order of precedence:
//!
//! 1. the product's override entries (full replacement, never a union),
//! 2. the product line's default entries,
//! 3. every active catalog item of the collection.
//!
//! The last step is a permissive fallback: a collection nobody configured
//! shows everything.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::OptionCatalog;
use crate::collections::Collection;
use crate::filtering::CombinationRow;
use crate::types::DbId;

/// Who an override entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OverrideScope {
    ProductLine(DbId),
    Product(DbId),
}

/// Item reference as stored externally: numeric or textual id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Id(DbId),
    Text(String),
}

impl ItemRef {
    pub fn as_id(&self) -> Option<DbId> {
        match self {
            ItemRef::Id(id) => Some(*id),
            ItemRef::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<DbId> for ItemRef {
    fn from(id: DbId) -> Self {
        ItemRef::Id(id)
    }
}

/// One `(scope, collection, item)` default or override entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub scope: OverrideScope,
    pub collection: String,
    pub item: ItemRef,
}

impl OverrideEntry {
    pub fn line_default(product_line_id: DbId, collection: Collection, item: DbId) -> Self {
        Self {
            scope: OverrideScope::ProductLine(product_line_id),
            collection: collection.key().to_string(),
            item: ItemRef::Id(item),
        }
    }

    pub fn product_override(product_id: DbId, collection: Collection, item: DbId) -> Self {
        Self {
            scope: OverrideScope::Product(product_id),
            collection: collection.key().to_string(),
            item: ItemRef::Id(item),
        }
    }
}

/// Where a collection's effective universe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniverseSource {
    ProductOverride,
    ProductLineDefault,
    AllActive,
}

/// Effective option ids for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Universe {
    pub ids: BTreeSet<DbId>,
    pub source: UniverseSource,
}

impl Universe {
    /// Restricted universes scope the combination index; the permissive
    /// fallback does not.
    pub fn is_restricted(&self) -> bool {
        self.source != UniverseSource::AllActive
    }
}

/// Resolved option universe per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveOptions {
    by_collection: BTreeMap<Collection, Universe>,
}

impl EffectiveOptions {
    pub fn get(&self, collection: Collection) -> Option<&Universe> {
        self.by_collection.get(&collection)
    }

    pub fn ids(&self, collection: Collection) -> BTreeSet<DbId> {
        self.get(collection)
            .map(|u| u.ids.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, collection: Collection, id: DbId) -> bool {
        self.get(collection).is_some_and(|u| u.ids.contains(&id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Collection, &Universe)> {
        self.by_collection.iter().map(|(c, u)| (*c, u))
    }

    /// Keep rows whose value in every restricted collection is either null
    /// or inside the resolved universe.
    pub fn scope_rows<'a>(&self, rows: &'a [CombinationRow]) -> Vec<&'a CombinationRow> {
        let restricted: Vec<(Collection, &BTreeSet<DbId>)> = self
            .by_collection
            .iter()
            .filter(|(c, u)| c.is_filterable() && u.is_restricted())
            .map(|(c, u)| (*c, &u.ids))
            .collect();

        rows.iter()
            .filter(|row| {
                restricted.iter().all(|(collection, ids)| {
                    row.column(*collection).map_or(true, |id| ids.contains(&id))
                })
            })
            .collect()
    }
}

/// Group entries by collection, dropping unknown collection keys and items
/// that are not ids.
pub fn group_entries(entries: &[OverrideEntry]) -> BTreeMap<Collection, BTreeSet<DbId>> {
    let mut grouped: BTreeMap<Collection, BTreeSet<DbId>> = BTreeMap::new();
    for entry in entries {
        let Some(collection) = Collection::lookup(&entry.collection) else {
            tracing::warn!(collection = %entry.collection, "Skipping entry for unmapped collection");
            continue;
        };
        let Some(id) = entry.item.as_id() else {
            tracing::warn!(
                collection = %entry.collection,
                item = ?entry.item,
                "Skipping entry with non-numeric item",
            );
            continue;
        };
        grouped.entry(collection).or_default().insert(id);
    }
    grouped
}

/// Entries belonging to one scope.
pub fn entries_for_scope(entries: &[OverrideEntry], scope: OverrideScope) -> Vec<OverrideEntry> {
    entries
        .iter()
        .filter(|e| e.scope == scope)
        .cloned()
        .collect()
}

/// Resolve the effective option universe for a product line, optionally
/// narrowed to one product's overrides.
pub fn resolve_effective_options(
    line_defaults: &[OverrideEntry],
    product_overrides: Option<&[OverrideEntry]>,
    catalog: &OptionCatalog,
) -> EffectiveOptions {
    let defaults = group_entries(line_defaults);
    let overrides = product_overrides.map(group_entries).unwrap_or_default();

    let by_collection = Collection::ALL
        .iter()
        .map(|&collection| {
            let universe = if let Some(ids) = overrides.get(&collection) {
                Universe {
                    ids: ids.clone(),
                    source: UniverseSource::ProductOverride,
                }
            } else if let Some(ids) = defaults.get(&collection) {
                Universe {
                    ids: ids.clone(),
                    source: UniverseSource::ProductLineDefault,
                }
            } else {
                Universe {
                    ids: catalog.active_ids(collection),
                    source: UniverseSource::AllActive,
                }
            };
            (collection, universe)
        })
        .collect();

    EffectiveOptions { by_collection }
}

/// Resolve for a product line id out of a mixed entry list.
pub fn resolve_for(
    entries: &[OverrideEntry],
    product_line_id: DbId,
    product_id: Option<DbId>,
    catalog: &OptionCatalog,
) -> EffectiveOptions {
    let defaults = entries_for_scope(entries, OverrideScope::ProductLine(product_line_id));
    let overrides = product_id.map(|id| entries_for_scope(entries, OverrideScope::Product(id)));
    resolve_effective_options(&defaults, overrides.as_deref(), catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OptionItem;

    fn catalog() -> OptionCatalog {
        OptionCatalog::new()
            .with(
                Collection::Sizes,
                (1..=6).map(|i| OptionItem::new(i, format!("S{i}"), format!("S{i}"))).collect(),
            )
            .with(
                Collection::Drivers,
                vec![
                    OptionItem::new(1, "Standard", "STD"),
                    OptionItem::new(2, "Dimmable", "DIM"),
                    OptionItem::new(3, "Old", "OLD").inactive(),
                ],
            )
    }

    fn line_defaults() -> Vec<OverrideEntry> {
        vec![
            OverrideEntry::line_default(1, Collection::Sizes, 1),
            OverrideEntry::line_default(1, Collection::Sizes, 2),
            OverrideEntry::line_default(1, Collection::Sizes, 3),
        ]
    }

    #[test]
    fn override_replaces_never_merges() {
        let overrides = vec![
            OverrideEntry::product_override(10, Collection::Sizes, 5),
            OverrideEntry::product_override(10, Collection::Sizes, 6),
        ];
        let effective = resolve_effective_options(&line_defaults(), Some(&overrides), &catalog());
        let sizes = effective.get(Collection::Sizes).unwrap();
        assert_eq!(sizes.ids, BTreeSet::from([5, 6]));
        assert_eq!(sizes.source, UniverseSource::ProductOverride);
    }

    #[test]
    fn line_defaults_apply_without_product() {
        let effective = resolve_effective_options(&line_defaults(), None, &catalog());
        assert_eq!(effective.ids(Collection::Sizes), BTreeSet::from([1, 2, 3]));
        assert_eq!(
            effective.get(Collection::Sizes).unwrap().source,
            UniverseSource::ProductLineDefault
        );
    }

    #[test]
    fn product_without_overrides_for_a_collection_uses_defaults() {
        let overrides = vec![OverrideEntry::product_override(10, Collection::Drivers, 2)];
        let effective = resolve_effective_options(&line_defaults(), Some(&overrides), &catalog());
        assert_eq!(effective.ids(Collection::Sizes), BTreeSet::from([1, 2, 3]));
        assert_eq!(effective.ids(Collection::Drivers), BTreeSet::from([2]));
    }

    #[test]
    fn unconfigured_collection_falls_back_to_all_active() {
        let effective = resolve_effective_options(&line_defaults(), None, &catalog());
        let drivers = effective.get(Collection::Drivers).unwrap();
        assert_eq!(drivers.ids, BTreeSet::from([1, 2]));
        assert_eq!(drivers.source, UniverseSource::AllActive);
        assert!(!drivers.is_restricted());
    }

    #[test]
    fn textual_items_and_unknown_collections() {
        let entries = vec![
            OverrideEntry {
                scope: OverrideScope::ProductLine(1),
                collection: "sizes".to_string(),
                item: ItemRef::Text("4".to_string()),
            },
            OverrideEntry {
                scope: OverrideScope::ProductLine(1),
                collection: "sizes".to_string(),
                item: ItemRef::Text("four".to_string()),
            },
            OverrideEntry {
                scope: OverrideScope::ProductLine(1),
                collection: "widgets".to_string(),
                item: ItemRef::Id(1),
            },
        ];
        let grouped = group_entries(&entries);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[&Collection::Sizes], BTreeSet::from([4]));
    }

    #[test]
    fn resolve_for_splits_scopes() {
        let mut entries = line_defaults();
        entries.push(OverrideEntry::product_override(10, Collection::Sizes, 5));
        entries.push(OverrideEntry::product_override(11, Collection::Sizes, 6));
        let effective = resolve_for(&entries, 1, Some(10), &catalog());
        assert_eq!(effective.ids(Collection::Sizes), BTreeSet::from([5]));
        let line_only = resolve_for(&entries, 1, None, &catalog());
        assert_eq!(line_only.ids(Collection::Sizes), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn scope_rows_only_checks_restricted_collections() {
        let rows = vec![
            CombinationRow::new(1).with(Collection::Sizes, 1).with(Collection::Drivers, 3),
            CombinationRow::new(1).with(Collection::Sizes, 4),
            CombinationRow::new(1).with(Collection::Drivers, 1),
        ];
        let effective = resolve_effective_options(&line_defaults(), None, &catalog());
        let scoped = effective.scope_rows(&rows);
        // Row 2 has a size outside the defaults; row 1's inactive driver is
        // irrelevant because drivers use the permissive fallback.
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped[0].size_id, Some(1));
        assert_eq!(scoped[1].size_id, None);
    }

    #[test]
    fn scope_serializes_tagged() {
        let json = serde_json::to_value(OverrideScope::Product(7)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "product", "id": 7}));
    }
}
