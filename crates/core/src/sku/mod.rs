//! SKU codec.
//!
//! A SKU is a dash-delimited list of segments. Which segments appear, and in
//! what order, comes from the segment order list rather than code:
//!
//! ```text
//! RMA2L-2436-HO-30K-PBB-NL+AF
//! ^^^^^ core: product line + mirror style + light direction codes
//! ```
//!
//! Empty segments are skipped entirely; there are never empty placeholders.

mod decode;
mod encode;
pub mod size;

use serde::{Deserialize, Serialize};

use crate::catalog::{OptionCatalog, OptionItem};
use crate::collections::Collection;
use crate::display::{sku_segment_order, SegmentConfig};
use crate::selection::Configuration;

pub use decode::DecodedSku;
pub use encode::{BuildSkuResult, SkuOverrides};
pub use size::CustomSizeFormat;

/// Segment order used for decoding when none is configured.
pub const CANONICAL_DECODE_ORDER: [Collection; 7] = [
    Collection::Sizes,
    Collection::LightOutputs,
    Collection::ColorTemperatures,
    Collection::Drivers,
    Collection::MountingOptions,
    Collection::FrameColors,
    Collection::Accessories,
];

pub const ACCESSORY_SEPARATOR: char = '+';
pub const SEGMENT_SEPARATOR: char = '-';

/// A single accessory code standing for several accessories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryBundle {
    pub code: String,
    pub components: Vec<String>,
}

impl AccessoryBundle {
    pub fn new<I, S>(code: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: code.into(),
            components: components.into_iter().map(Into::into).collect(),
        }
    }
}

fn default_no_accessories_code() -> Option<String> {
    Some("NA".to_string())
}

/// Codec knobs that vary per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuSettings {
    #[serde(default)]
    pub custom_size_format: CustomSizeFormat,
    /// Shorthands recognized when decoding. Encoding always writes the
    /// individual codes.
    #[serde(default)]
    pub accessory_bundles: Vec<AccessoryBundle>,
    /// Token meaning "explicitly no accessories".
    #[serde(default = "default_no_accessories_code")]
    pub no_accessories_code: Option<String>,
}

impl Default for SkuSettings {
    fn default() -> Self {
        Self {
            custom_size_format: CustomSizeFormat::default(),
            accessory_bundles: Vec::new(),
            no_accessories_code: default_no_accessories_code(),
        }
    }
}

/// Encoder/decoder bound to one catalog and segment order.
#[derive(Debug, Clone)]
pub struct SkuCodec<'a> {
    catalog: &'a OptionCatalog,
    order: Vec<Collection>,
    settings: SkuSettings,
}

impl<'a> SkuCodec<'a> {
    pub fn new(catalog: &'a OptionCatalog, segments: &[SegmentConfig]) -> Self {
        Self::with_order(catalog, sku_segment_order(segments))
    }

    pub fn with_order(catalog: &'a OptionCatalog, order: Vec<Collection>) -> Self {
        Self {
            catalog,
            order,
            settings: SkuSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SkuSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Segments that may appear in an encoded SKU, in order.
    pub fn order(&self) -> &[Collection] {
        &self.order
    }

    pub fn settings(&self) -> &SkuSettings {
        &self.settings
    }

    /// Whether the first token is the core segment.
    fn has_core(&self) -> bool {
        self.order.is_empty() || self.order.contains(&Collection::ProductLines)
    }

    /// Non-core segments in decode order.
    fn decode_order(&self) -> Vec<Collection> {
        let order: Vec<Collection> = self
            .order
            .iter()
            .copied()
            .filter(|c| !is_core_part(*c))
            .collect();
        if order.is_empty() {
            CANONICAL_DECODE_ORDER.to_vec()
        } else {
            order
        }
    }
}

/// Collections folded into the core segment.
fn is_core_part(collection: Collection) -> bool {
    matches!(
        collection,
        Collection::ProductLines | Collection::MirrorStyles | Collection::LightDirections
    )
}

pub fn build_ordered_sku(
    config: &Configuration,
    catalog: &OptionCatalog,
    segments: &[SegmentConfig],
    product_line: &OptionItem,
    overrides: Option<&SkuOverrides>,
) -> BuildSkuResult {
    SkuCodec::new(catalog, segments).encode(config, product_line, overrides)
}

pub fn decode_sku(
    sku: &str,
    catalog: &OptionCatalog,
    segments: &[SegmentConfig],
    product_line: &OptionItem,
) -> DecodedSku {
    SkuCodec::new(catalog, segments).decode(sku, product_line)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::catalog::OptionItem;

    pub fn product_line() -> OptionItem {
        OptionItem::new(1, "Rounded", "R")
    }

    pub fn catalog() -> OptionCatalog {
        OptionCatalog::new()
            .with(Collection::ProductLines, vec![product_line()])
            .with(
                Collection::MirrorStyles,
                vec![
                    OptionItem::new(1, "Matte", "M"),
                    OptionItem::new(2, "Matte Arch", "MA"),
                    OptionItem::new(3, "Full Frame", "F"),
                ],
            )
            .with(
                Collection::LightDirections,
                vec![
                    OptionItem::new(1, "Direct", "2"),
                    OptionItem::new(2, "Indirect", "A2"),
                    OptionItem::new(3, "Both", "B"),
                ],
            )
            .with(
                Collection::Sizes,
                vec![
                    OptionItem::new(1, "24 x 36", "STD24").with_dimensions(24.0, 36.0),
                    OptionItem::new(2, "36\" Diameter", "0036").with_dimensions(36.0, 36.0),
                ],
            )
            .with(
                Collection::LightOutputs,
                vec![
                    OptionItem::new(1, "Standard", "S"),
                    OptionItem::new(2, "High", "HO"),
                ],
            )
            .with(
                Collection::ColorTemperatures,
                vec![
                    OptionItem::new(1, "3000K", "30K"),
                    OptionItem::new(2, "4000K", "40K"),
                ],
            )
            .with(
                Collection::Drivers,
                vec![
                    OptionItem::new(1, "Standard", "STD"),
                    OptionItem::new(2, "Dimmable", "DIM"),
                ],
            )
            .with(
                Collection::MountingOptions,
                vec![
                    OptionItem::new(1, "Portrait", "P"),
                    OptionItem::new(2, "Landscape", "L"),
                ],
            )
            .with(
                Collection::FrameColors,
                vec![
                    OptionItem::new(1, "Black", "PBB"),
                    OptionItem::new(2, "Silver", "PSS"),
                ],
            )
            .with(
                Collection::Accessories,
                vec![
                    OptionItem::new(1, "Night Light", "NL"),
                    OptionItem::new(2, "Anti-Fog", "AF"),
                    OptionItem::new(3, "Touch Sensor", "TS"),
                ],
            )
    }

    /// Every collection enabled, in registry order.
    pub fn segments() -> Vec<SegmentConfig> {
        Collection::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| SegmentConfig::new(*c, i as i64 + 1))
            .collect()
    }

    pub fn full_configuration() -> Configuration {
        Configuration::new()
            .with(Collection::ProductLines, 1)
            .with(Collection::MirrorStyles, 2)
            .with(Collection::LightDirections, 2)
            .with(Collection::Sizes, 1)
            .with(Collection::LightOutputs, 2)
            .with(Collection::ColorTemperatures, 1)
            .with(Collection::Drivers, 2)
            .with(Collection::MountingOptions, 1)
            .with(Collection::FrameColors, 1)
            .with_accessories([1, 2])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn disabled_segments_are_left_out_of_the_order() {
        let mut segments = segments();
        segments[3] = segments[3].clone().disabled_in_sku();
        let catalog = catalog();
        let codec = SkuCodec::new(&catalog, &segments);
        assert!(!codec.order().contains(&Collection::Sizes));
        assert!(!codec.decode_order().contains(&Collection::Sizes));
    }

    #[test]
    fn empty_order_decodes_canonically() {
        let catalog = catalog();
        let codec = SkuCodec::with_order(&catalog, Vec::new());
        assert!(codec.has_core());
        assert_eq!(codec.decode_order(), CANONICAL_DECODE_ORDER.to_vec());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: SkuSettings = serde_json::from_value(serde_json::json!({
            "accessory_bundles": [{"code": "ALL", "components": ["NL", "AF"]}]
        }))
        .unwrap();
        assert_eq!(settings.custom_size_format, CustomSizeFormat::Delimited);
        assert_eq!(settings.no_accessories_code.as_deref(), Some("NA"));
        assert_eq!(settings.accessory_bundles[0], AccessoryBundle::new("ALL", ["NL", "AF"]));
    }

    #[test]
    fn round_trip_recovers_every_populated_field() {
        let catalog = catalog();
        let codec = SkuCodec::new(&catalog, &segments());
        let config = full_configuration();

        let encoded = codec.encode(&config, &product_line(), None);
        let decoded = codec.decode(&encoded.sku, &product_line());

        assert_eq!(decoded.configuration, config);
        assert!(decoded.unmatched.is_empty());
    }

    #[test]
    fn round_trip_with_custom_size_and_partial_config() {
        let catalog = catalog();
        let config = Configuration::new()
            .with(Collection::ProductLines, 1)
            .with(Collection::MirrorStyles, 1)
            .with_dimensions(33.5, 33.0)
            .with(Collection::FrameColors, 2);

        for format in [CustomSizeFormat::Delimited, CustomSizeFormat::Legacy] {
            let codec = SkuCodec::new(&catalog, &segments()).with_settings(SkuSettings {
                custom_size_format: format,
                ..SkuSettings::default()
            });
            let encoded = codec.encode(&config, &product_line(), None);
            let decoded = codec.decode(&encoded.sku, &product_line()).configuration;
            assert_eq!(decoded.mirror_style, Some(1), "{}", encoded.sku);
            assert_eq!(decoded.frame_color, Some(2), "{}", encoded.sku);
            if format == CustomSizeFormat::Delimited {
                assert_eq!(decoded.width, Some(33.5));
                assert_eq!(decoded.height, Some(33.0));
            }
        }
    }

    #[test]
    fn convenience_functions_agree_with_codec() {
        let catalog = catalog();
        let segments = segments();
        let config = full_configuration();
        let built = build_ordered_sku(&config, &catalog, &segments, &product_line(), None);
        assert_eq!(
            built,
            SkuCodec::new(&catalog, &segments).encode(&config, &product_line(), None)
        );
        assert_eq!(
            decode_sku(&built.sku, &catalog, &segments, &product_line()).configuration,
            config
        );
    }
}
