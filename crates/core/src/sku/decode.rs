use serde::Serialize;

use super::size::parse_custom_size;
use super::{SkuCodec, ACCESSORY_SEPARATOR, SEGMENT_SEPARATOR};
use crate::catalog::OptionItem;
use crate::collections::Collection;
use crate::selection::Configuration;
use crate::types::DbId;

/// Best-effort decode result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedSku {
    pub configuration: Configuration,
    /// Tokens (or token parts) that matched nothing, in input order.
    pub unmatched: Vec<String>,
}

/// What a single token resolved to.
enum TokenMatch {
    Single(Collection, DbId),
    CustomSize(f64, f64),
    Accessories(Vec<DbId>),
}

impl SkuCodec<'_> {
    /// Recover a configuration from a SKU string. Never fails: anything that
    /// does not match exactly is dropped and reported in `unmatched`.
    pub fn decode(&self, sku: &str, product_line: &OptionItem) -> DecodedSku {
        let mut decoded = DecodedSku::default();
        let mut tokens = sku
            .trim()
            .split(SEGMENT_SEPARATOR)
            .filter(|t| !t.is_empty());

        if self.has_core() {
            if let Some(first) = tokens.next() {
                self.decode_core(first, product_line, &mut decoded);
            }
        }

        let order = self.decode_order();
        let mut cursor = 0;
        for token in tokens {
            match self.match_token(token, &order[cursor.min(order.len())..]) {
                Some((offset, matched)) => {
                    self.apply(matched, token, &mut decoded);
                    cursor += offset + 1;
                }
                None => decoded.unmatched.push(token.to_string()),
            }
        }

        if !decoded.unmatched.is_empty() {
            tracing::debug!(
                sku = %sku,
                unmatched = ?decoded.unmatched,
                "Dropped unmatched SKU tokens",
            );
        }
        decoded
    }

    /// Product line prefix, then the longest mirror style code that leaves a
    /// valid light direction (or nothing) behind.
    fn decode_core(&self, token: &str, product_line: &OptionItem, decoded: &mut DecodedSku) {
        let Some(rest) = token.strip_prefix(product_line.sku_code.as_str()) else {
            decoded.unmatched.push(token.to_string());
            return;
        };
        let config = &mut decoded.configuration;
        config.product_line = Some(product_line.id);
        if rest.is_empty() {
            return;
        }

        let mut styles: Vec<&OptionItem> = self
            .catalog
            .items(Collection::MirrorStyles)
            .iter()
            .filter(|item| !item.sku_code.is_empty() && rest.starts_with(&item.sku_code))
            .collect();
        styles.sort_by(|a, b| b.sku_code.len().cmp(&a.sku_code.len()));

        for style in &styles {
            let tail = &rest[style.sku_code.len()..];
            if tail.is_empty() {
                config.mirror_style = Some(style.id);
                return;
            }
            if let Some(direction) = self.catalog.find_by_code(Collection::LightDirections, tail) {
                config.mirror_style = Some(style.id);
                config.light_direction = Some(direction.id);
                return;
            }
        }

        // No clean split: keep the longest style and drop the tail.
        if let Some(style) = styles.first() {
            config.mirror_style = Some(style.id);
            decoded
                .unmatched
                .push(rest[style.sku_code.len()..].to_string());
        } else if let Some(direction) = self.catalog.find_by_code(Collection::LightDirections, rest) {
            config.light_direction = Some(direction.id);
        } else {
            decoded.unmatched.push(rest.to_string());
        }
    }

    /// First collection at or after the cursor whose codes match `token`
    /// exactly. Custom sizes are only tried when nothing matched exactly.
    fn match_token(&self, token: &str, remaining: &[Collection]) -> Option<(usize, TokenMatch)> {
        for (offset, &collection) in remaining.iter().enumerate() {
            let matched = match collection {
                Collection::Accessories => self.match_accessories(token).map(TokenMatch::Accessories),
                _ => self
                    .catalog
                    .find_by_code(collection, token)
                    .map(|item| TokenMatch::Single(collection, item.id)),
            };
            if let Some(matched) = matched {
                return Some((offset, matched));
            }
        }

        let offset = remaining.iter().position(|c| *c == Collection::Sizes)?;
        let dims = parse_custom_size(token)?;
        Some((offset, TokenMatch::CustomSize(dims.width, dims.height)))
    }

    /// Sentinel, then bundle shorthand, then `+`-separated codes. At least
    /// one code must match.
    fn match_accessories(&self, token: &str) -> Option<Vec<DbId>> {
        if self.settings.no_accessories_code.as_deref() == Some(token) {
            return Some(Vec::new());
        }

        let codes: Vec<&str> = match self
            .settings
            .accessory_bundles
            .iter()
            .find(|bundle| bundle.code == token)
        {
            Some(bundle) => bundle.components.iter().map(String::as_str).collect(),
            None => token.split(ACCESSORY_SEPARATOR).collect(),
        };

        let ids: Vec<DbId> = codes
            .iter()
            .filter_map(|code| self.catalog.find_by_code(Collection::Accessories, code))
            .map(|item| item.id)
            .collect();
        (!ids.is_empty()).then_some(ids)
    }

    fn apply(&self, matched: TokenMatch, token: &str, decoded: &mut DecodedSku) {
        let config = &mut decoded.configuration;
        match matched {
            TokenMatch::Single(collection, id) => config.set(collection, Some(id)),
            TokenMatch::CustomSize(width, height) => {
                config.width = Some(width);
                config.height = Some(height);
            }
            TokenMatch::Accessories(ids) => {
                if ids.is_empty() {
                    config.set_accessories(ids);
                    return;
                }
                for id in ids {
                    config.add_accessory(id);
                }
                // Report parts of a `+` list that matched nothing.
                for part in token.split(ACCESSORY_SEPARATOR) {
                    let known = self
                        .catalog
                        .find_by_code(Collection::Accessories, part)
                        .is_some()
                        || self.settings.accessory_bundles.iter().any(|b| b.code == token);
                    if !known && !part.is_empty() {
                        decoded.unmatched.push(part.to_string());
                    }
                }
            }
        }
    }
}
