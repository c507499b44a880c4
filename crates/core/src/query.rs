//! Shareable deep links: a configuration as short URL query parameters.
//!
//! Parameter names come from the collection registry (`pl`, `ms`, `ld`, `sz`,
//! `lo`, `ct`, `dr`, `mo`, `fc`, `ac`). Values are the same code fragments the
//! SKU codec writes, so a link and a SKU always describe the same selection.

use crate::catalog::OptionCatalog;
use crate::collections::Collection;
use crate::selection::Configuration;
use crate::sku::size::{find_preset, parse_custom_size, size_fragment, CustomSizeFormat};
use crate::sku::ACCESSORY_SEPARATOR;

/// Encode every populated field as `param=code`, in registry order.
pub fn encode_sku_to_query(config: &Configuration, catalog: &OptionCatalog) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());

    for collection in Collection::ALL {
        let value = match collection {
            Collection::Sizes => size_fragment(config, catalog, CustomSizeFormat::Delimited),
            Collection::Accessories => {
                let codes: Vec<&str> = config
                    .accessories
                    .iter()
                    .filter_map(|id| catalog.code(collection, *id))
                    .collect();
                (!codes.is_empty()).then(|| codes.join(&ACCESSORY_SEPARATOR.to_string()))
            }
            _ => config
                .value(collection)
                .and_then(|id| catalog.code(collection, id))
                .map(str::to_string),
        };
        if let Some(value) = value {
            serializer.append_pair(collection.query_param(), &value);
        }
    }

    serializer.finish()
}

/// Decode a query string (with or without a leading `?`). Unknown parameters
/// and codes are ignored.
pub fn decode_query_to_selection(query: &str, catalog: &OptionCatalog) -> Configuration {
    let query = query.trim().trim_start_matches('?');
    let mut config = Configuration::new();

    for (param, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let Some(collection) = Collection::from_query_param(&param) else {
            continue;
        };
        let value = value.trim();
        match collection {
            Collection::Sizes => {
                if let Some(item) = catalog.find_by_code(collection, value) {
                    config.size = Some(item.id);
                } else if let Some(dims) = parse_custom_size(value) {
                    config.size = find_preset(catalog, dims.width, dims.height);
                    if config.size.is_none() {
                        config.width = Some(dims.width);
                        config.height = Some(dims.height);
                    }
                } else {
                    tracing::debug!(param = %param, value = %value, "Ignoring unknown size");
                }
            }
            Collection::Accessories => {
                // An unescaped `+` arrives as a space.
                for code in value.split(|c: char| c == ACCESSORY_SEPARATOR || c == ' ' || c == ',') {
                    if let Some(item) = catalog.find_by_code(collection, code) {
                        config.add_accessory(item.id);
                    }
                }
            }
            _ => match catalog.find_by_code(collection, value) {
                Some(item) => config.set(collection, Some(item.id)),
                None => {
                    tracing::debug!(param = %param, value = %value, "Ignoring unknown code");
                }
            },
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sku::fixtures::{catalog, full_configuration, product_line, segments};
    use crate::sku::SkuCodec;

    #[test]
    fn encodes_codes_in_registry_order() {
        let query = encode_sku_to_query(&full_configuration(), &catalog());
        assert_eq!(
            query,
            "pl=R&ms=MA&ld=A2&sz=STD24&lo=HO&ct=30K&dr=DIM&mo=P&fc=PBB&ac=NL%2BAF"
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let catalog = catalog();
        let config = full_configuration();
        let query = encode_sku_to_query(&config, &catalog);
        assert_eq!(decode_query_to_selection(&query, &catalog), config);
    }

    #[test]
    fn custom_size_round_trips() {
        let catalog = catalog();
        let config = Configuration::new().with_dimensions(33.5, 33.0);
        let query = encode_sku_to_query(&config, &catalog);
        assert_eq!(query, "sz=33.5x33");
        assert_eq!(decode_query_to_selection(&query, &catalog), config);
    }

    #[test]
    fn preset_dimensions_resolve_to_the_preset() {
        let catalog = catalog();
        let decoded = decode_query_to_selection("?sz=24x36", &catalog);
        assert_eq!(decoded.size, Some(1));
        assert_eq!(decoded.width, None);
    }

    #[test]
    fn tolerates_unescaped_plus_and_unknown_input() {
        let catalog = catalog();
        let decoded = decode_query_to_selection("fc=PBB&ac=NL+TS&zz=1&dr=NOPE", &catalog);
        assert_eq!(decoded.frame_color, Some(1));
        assert_eq!(decoded.accessories, vec![1, 3]);
        assert_eq!(decoded.driver, None);
    }

    #[test]
    fn agrees_with_the_sku_codec() {
        let catalog = catalog();
        let config = full_configuration();
        let from_query =
            decode_query_to_selection(&encode_sku_to_query(&config, &catalog), &catalog);
        let codec = SkuCodec::new(&catalog, &segments());
        let sku = codec.encode(&config, &product_line(), None).sku;
        let from_sku = codec.decode(&sku, &product_line()).configuration;
        assert_eq!(from_query, from_sku);
    }
}
