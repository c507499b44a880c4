//! Configuration state and raw UI selections.
//!
//! A [`Selection`] is what the UI hands over: a loose JSON map keyed by field
//! name or collection key. A [`Configuration`] is the typed form that rules
//! and the SKU codec work with. Either may be partial.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collections::Collection;
use crate::types::DbId;

/// Raw selection as received from the UI layer.
pub type Selection = serde_json::Map<String, Value>;

/// Coerce a loose JSON value into an option id.
///
/// Integers and integral floats are accepted, as are numeric strings.
/// Everything else (null, empty string, fractions, objects) yields `None`.
pub fn coerce_id(value: &Value) -> Option<DbId> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as DbId)
        }),
        Value::String(s) => s.trim().parse::<DbId>().ok(),
        _ => None,
    }
}

/// Typed, possibly partial, product configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_line: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_style: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_direction: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<DbId>,
    /// Custom width in inches when no size preset is chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Custom height in inches when no size preset is chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_output: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounting: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_color: Option<DbId>,
    /// Selection order is kept; ids are unique.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<DbId>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, collection: Collection) -> Option<&Option<DbId>> {
        match collection {
            Collection::ProductLines => Some(&self.product_line),
            Collection::MirrorStyles => Some(&self.mirror_style),
            Collection::LightDirections => Some(&self.light_direction),
            Collection::Sizes => Some(&self.size),
            Collection::LightOutputs => Some(&self.light_output),
            Collection::ColorTemperatures => Some(&self.color_temperature),
            Collection::Drivers => Some(&self.driver),
            Collection::MountingOptions => Some(&self.mounting),
            Collection::FrameColors => Some(&self.frame_color),
            Collection::Accessories => None,
        }
    }

    fn slot_mut(&mut self, collection: Collection) -> Option<&mut Option<DbId>> {
        match collection {
            Collection::ProductLines => Some(&mut self.product_line),
            Collection::MirrorStyles => Some(&mut self.mirror_style),
            Collection::LightDirections => Some(&mut self.light_direction),
            Collection::Sizes => Some(&mut self.size),
            Collection::LightOutputs => Some(&mut self.light_output),
            Collection::ColorTemperatures => Some(&mut self.color_temperature),
            Collection::Drivers => Some(&mut self.driver),
            Collection::MountingOptions => Some(&mut self.mounting),
            Collection::FrameColors => Some(&mut self.frame_color),
            Collection::Accessories => None,
        }
    }

    /// Single value of a collection. Always `None` for accessories.
    pub fn value(&self, collection: Collection) -> Option<DbId> {
        self.slot(collection).copied().flatten()
    }

    /// All values of a collection (zero or one for single-valued fields).
    pub fn values(&self, collection: Collection) -> Vec<DbId> {
        match self.slot(collection) {
            Some(slot) => slot.iter().copied().collect(),
            None => self.accessories.clone(),
        }
    }

    pub fn has_value(&self, collection: Collection) -> bool {
        match self.slot(collection) {
            Some(slot) => slot.is_some(),
            None => !self.accessories.is_empty(),
        }
    }

    /// Set or clear a single-valued field. For accessories, replaces the
    /// whole set with the given id (or clears it).
    pub fn set(&mut self, collection: Collection, id: Option<DbId>) {
        match self.slot_mut(collection) {
            Some(slot) => *slot = id,
            None => self.set_accessories(id),
        }
    }

    pub fn with(mut self, collection: Collection, id: DbId) -> Self {
        self.set(collection, Some(id));
        self
    }

    /// Replace accessories, dropping duplicates but keeping first-seen order.
    pub fn set_accessories(&mut self, ids: impl IntoIterator<Item = DbId>) {
        self.accessories.clear();
        for id in ids {
            self.add_accessory(id);
        }
    }

    pub fn add_accessory(&mut self, id: DbId) {
        if !self.accessories.contains(&id) {
            self.accessories.push(id);
        }
    }

    pub fn with_accessories(mut self, ids: impl IntoIterator<Item = DbId>) -> Self {
        self.set_accessories(ids);
        self
    }

    pub fn with_dimensions(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Collections that currently hold a value, in canonical order.
    pub fn populated(&self) -> Vec<Collection> {
        Collection::ALL
            .iter()
            .copied()
            .filter(|c| self.has_value(*c))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.populated().is_empty() && self.width.is_none() && self.height.is_none()
    }

    /// Loose map form, keyed by field name.
    pub fn to_selection(&self) -> Selection {
        let mut selection = Selection::new();
        for collection in self.populated() {
            let value = if collection.is_multi_valued() {
                Value::from(self.accessories.clone())
            } else {
                match self.value(collection) {
                    Some(id) => Value::from(id),
                    None => continue,
                }
            };
            selection.insert(collection.field().to_string(), value);
        }
        if let Some(width) = self.width {
            selection.insert("width".to_string(), Value::from(width));
        }
        if let Some(height) = self.height {
            selection.insert("height".to_string(), Value::from(height));
        }
        selection
    }

    /// Tolerant conversion from a raw selection. Unknown keys and values
    /// that are not ids are ignored.
    pub fn from_selection(selection: &Selection) -> Self {
        let mut config = Self::default();
        for (key, value) in selection {
            match key.as_str() {
                "width" => config.width = value.as_f64(),
                "height" => config.height = value.as_f64(),
                _ => {
                    let Some(collection) = Collection::lookup(key) else {
                        continue;
                    };
                    if collection.is_multi_valued() {
                        let ids: Vec<DbId> = match value {
                            Value::Array(items) => items.iter().filter_map(coerce_id).collect(),
                            other => coerce_id(other).into_iter().collect(),
                        };
                        config.set_accessories(ids);
                    } else {
                        config.set(collection, coerce_id(value));
                    }
                }
            }
        }
        config
    }
}
