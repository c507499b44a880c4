//! Collection registry.
//!
//! Every attribute the configurator knows about is a [`Collection`]. The
//! registry below is closed: each collection key maps to exactly one
//! configuration field, a default UI hint, a title and a short URL parameter.
//! Keys outside the registry are configuration errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// A named attribute category with a fixed set of selectable options.
///
/// Variant order is the canonical attribute order; maps keyed by
/// `Collection` iterate in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    ProductLines,
    MirrorStyles,
    LightDirections,
    Sizes,
    LightOutputs,
    ColorTemperatures,
    Drivers,
    MountingOptions,
    FrameColors,
    Accessories,
}

/// Rendering hint handed to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiType {
    Grid,
    List,
    ColorSwatch,
    SizeGrid,
    MultiSelect,
}

pub const VALID_UI_TYPES: &[&str] = &["grid", "list", "color_swatch", "size_grid", "multi_select"];

impl UiType {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "grid" => Ok(Self::Grid),
            "list" => Ok(Self::List),
            "color_swatch" => Ok(Self::ColorSwatch),
            "size_grid" => Ok(Self::SizeGrid),
            "multi_select" => Ok(Self::MultiSelect),
            _ => Err(CoreError::Validation(format!(
                "Unsupported ui_type '{s}'. Must be one of: {}",
                VALID_UI_TYPES.join(", ")
            ))),
        }
    }
}

/// Registry entry describing how a collection is wired into the configurator.
#[derive(Debug, Clone, Copy)]
pub struct CollectionEntry {
    pub collection: Collection,
    /// Collection key as used by external data (`"sizes"`).
    pub key: &'static str,
    /// Configuration field the collection writes (`"size"`).
    pub field: &'static str,
    pub ui_type: UiType,
    pub title: &'static str,
    /// Short URL query parameter (`"sz"`).
    pub query_param: &'static str,
}

pub const REGISTRY: &[CollectionEntry] = &[
    CollectionEntry {
        collection: Collection::ProductLines,
        key: "product_lines",
        field: "product_line",
        ui_type: UiType::Grid,
        title: "Product Line",
        query_param: "pl",
    },
    CollectionEntry {
        collection: Collection::MirrorStyles,
        key: "mirror_styles",
        field: "mirror_style",
        ui_type: UiType::Grid,
        title: "Mirror Style",
        query_param: "ms",
    },
    CollectionEntry {
        collection: Collection::LightDirections,
        key: "light_directions",
        field: "light_direction",
        ui_type: UiType::List,
        title: "Light Direction",
        query_param: "ld",
    },
    CollectionEntry {
        collection: Collection::Sizes,
        key: "sizes",
        field: "size",
        ui_type: UiType::SizeGrid,
        title: "Size",
        query_param: "sz",
    },
    CollectionEntry {
        collection: Collection::LightOutputs,
        key: "light_outputs",
        field: "light_output",
        ui_type: UiType::List,
        title: "Light Output",
        query_param: "lo",
    },
    CollectionEntry {
        collection: Collection::ColorTemperatures,
        key: "color_temperatures",
        field: "color_temperature",
        ui_type: UiType::List,
        title: "Color Temperature",
        query_param: "ct",
    },
    CollectionEntry {
        collection: Collection::Drivers,
        key: "drivers",
        field: "driver",
        ui_type: UiType::List,
        title: "Dimming",
        query_param: "dr",
    },
    CollectionEntry {
        collection: Collection::MountingOptions,
        key: "mounting_options",
        field: "mounting",
        ui_type: UiType::List,
        title: "Mounting",
        query_param: "mo",
    },
    CollectionEntry {
        collection: Collection::FrameColors,
        key: "frame_colors",
        field: "frame_color",
        ui_type: UiType::ColorSwatch,
        title: "Frame Color",
        query_param: "fc",
    },
    CollectionEntry {
        collection: Collection::Accessories,
        key: "accessories",
        field: "accessories",
        ui_type: UiType::MultiSelect,
        title: "Accessories",
        query_param: "ac",
    },
];

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::ProductLines,
        Collection::MirrorStyles,
        Collection::LightDirections,
        Collection::Sizes,
        Collection::LightOutputs,
        Collection::ColorTemperatures,
        Collection::Drivers,
        Collection::MountingOptions,
        Collection::FrameColors,
        Collection::Accessories,
    ];

    /// Registry entry for this collection.
    pub fn entry(self) -> &'static CollectionEntry {
        // REGISTRY is declared in variant order.
        &REGISTRY[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.entry().key
    }

    pub fn field(self) -> &'static str {
        self.entry().field
    }

    pub fn title(self) -> &'static str {
        self.entry().title
    }

    pub fn query_param(self) -> &'static str {
        self.entry().query_param
    }

    /// Only accessories hold a set of ids.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, Collection::Accessories)
    }

    /// Collections with a column in the combination index.
    pub fn is_filterable(self) -> bool {
        !self.is_multi_valued()
    }

    /// Look up a collection by its key (`"sizes"`).
    pub fn from_key(key: &str) -> Option<Self> {
        REGISTRY.iter().find(|s| s.key == key).map(|s| s.collection)
    }

    /// Look up a collection by the configuration field it writes (`"size"`).
    pub fn from_field(field: &str) -> Option<Self> {
        REGISTRY.iter().find(|s| s.field == field).map(|s| s.collection)
    }

    /// Accept either a collection key or a field name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_key(name).or_else(|| Self::from_field(name))
    }

    pub fn from_query_param(param: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|s| s.query_param == param)
            .map(|s| s.collection)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
            .ok_or_else(|| CoreError::Validation(format!("Unmapped collection key '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn registry_is_in_variant_order() {
        for (i, collection) in Collection::ALL.iter().enumerate() {
            assert_eq!(REGISTRY[i].collection, *collection);
        }
    }

    #[test]
    fn key_and_field_lookup() {
        assert_eq!(Collection::from_key("sizes"), Some(Collection::Sizes));
        assert_eq!(Collection::from_field("size"), Some(Collection::Sizes));
        assert_eq!(Collection::lookup("mounting"), Some(Collection::MountingOptions));
        assert_eq!(Collection::lookup("mounting_options"), Some(Collection::MountingOptions));
        assert_eq!(Collection::lookup("widgets"), None);
    }

    #[test]
    fn unmapped_key_is_an_error() {
        assert_matches!("widgets".parse::<Collection>(), Err(CoreError::Validation(_)));
        assert_matches!("frame_colors".parse::<Collection>(), Ok(Collection::FrameColors));
    }

    #[test]
    fn serde_uses_collection_key() {
        let json = serde_json::to_string(&Collection::ColorTemperatures).unwrap();
        assert_eq!(json, "\"color_temperatures\"");
    }

    #[test]
    fn query_params_are_unique() {
        for entry in REGISTRY {
            assert_eq!(Collection::from_query_param(entry.query_param), Some(entry.collection));
        }
    }

    #[test]
    fn ui_type_parse() {
        assert_eq!(UiType::parse("color_swatch").unwrap(), UiType::ColorSwatch);
        assert!(UiType::parse("carousel").is_err());
    }
}
