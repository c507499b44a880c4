//! Option catalog: read-only reference data per collection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::collections::Collection;
use crate::types::DbId;

fn default_active() -> bool {
    true
}

/// One selectable value within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: DbId,
    pub name: String,
    pub sku_code: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub sort: Option<f64>,
    /// Sizes only.
    #[serde(default)]
    pub width: Option<f64>,
    /// Sizes only.
    #[serde(default)]
    pub height: Option<f64>,
    /// Colors only.
    #[serde(default)]
    pub hex: Option<String>,
}

impl OptionItem {
    pub fn new(id: DbId, name: impl Into<String>, sku_code: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sku_code: sku_code.into(),
            active: true,
            sort: None,
            width: None,
            height: None,
            hex: None,
        }
    }

    pub fn with_dimensions(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_sort(mut self, sort: f64) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// All option items, grouped by collection.
///
/// Items within a collection are kept ordered by `sort` (missing sorts last)
/// then id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionCatalog {
    items: BTreeMap<Collection, Vec<OptionItem>>,
}

impl OptionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items of one collection.
    pub fn insert(&mut self, collection: Collection, mut items: Vec<OptionItem>) {
        items.sort_by(|a, b| {
            let sa = a.sort.unwrap_or(f64::MAX);
            let sb = b.sort.unwrap_or(f64::MAX);
            sa.total_cmp(&sb).then(a.id.cmp(&b.id))
        });
        self.items.insert(collection, items);
    }

    pub fn with(mut self, collection: Collection, items: Vec<OptionItem>) -> Self {
        self.insert(collection, items);
        self
    }

    pub fn items(&self, collection: Collection) -> &[OptionItem] {
        self.items.get(&collection).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_collection(&self, collection: Collection) -> bool {
        self.items.contains_key(&collection)
    }

    pub fn find(&self, collection: Collection, id: DbId) -> Option<&OptionItem> {
        self.items(collection).iter().find(|item| item.id == id)
    }

    /// Exact, case-sensitive code lookup.
    pub fn find_by_code(&self, collection: Collection, code: &str) -> Option<&OptionItem> {
        self.items(collection)
            .iter()
            .find(|item| !item.sku_code.is_empty() && item.sku_code == code)
    }

    /// SKU fragment for an id, if the item exists and has a non-empty code.
    pub fn code(&self, collection: Collection, id: DbId) -> Option<&str> {
        self.find(collection, id)
            .map(|item| item.sku_code.as_str())
            .filter(|code| !code.is_empty())
    }

    pub fn active_ids(&self, collection: Collection) -> BTreeSet<DbId> {
        self.items(collection)
            .iter()
            .filter(|item| item.active)
            .map(|item| item.id)
            .collect()
    }

    /// Items of `collection` whose ids are in `ids`, in catalog order.
    pub fn materialize(&self, collection: Collection, ids: &BTreeSet<DbId>) -> Vec<OptionItem> {
        self.items(collection)
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect()
    }

    pub fn collections(&self) -> impl Iterator<Item = Collection> + '_ {
        self.items.keys().copied()
    }
}
