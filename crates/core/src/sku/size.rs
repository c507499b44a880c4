//! Size fragments: preset codes and custom dimensions.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::catalog::OptionCatalog;
use crate::collections::Collection;
use crate::selection::Configuration;
use crate::types::DbId;

/// `{width}x{height}`; width may carry up to two decimals.
static DELIMITED_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^(\d{1,3}(?:\.\d{1,2})?)[xX](\d{1,3})$").expect("valid regex")
});

/// Legacy `WWHH`: two-digit width, two-digit height.
static LEGACY_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^(\d{2})(\d{2})$").expect("valid regex"));

/// How custom (non-preset) sizes are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomSizeFormat {
    /// `33.5x33`. Unambiguous, and readable by older decoders.
    #[default]
    Delimited,
    /// `33.533`. Width and height run together.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Width with at most two decimals, trailing zeros stripped.
pub fn format_width(width: f64) -> String {
    let fixed = format!("{width:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Height rounded to a whole number.
pub fn format_height(height: f64) -> String {
    format!("{}", height.round() as i64)
}

pub fn custom_size_fragment(width: f64, height: f64, format: CustomSizeFormat) -> String {
    match format {
        CustomSizeFormat::Delimited => format!("{}x{}", format_width(width), format_height(height)),
        CustomSizeFormat::Legacy => format!("{}{}", format_width(width), format_height(height)),
    }
}

/// Parse a custom size token (`WWxHH` or legacy `WWHH`). Zero dimensions
/// are rejected.
pub fn parse_custom_size(token: &str) -> Option<Dimensions> {
    let caps = DELIMITED_RE
        .captures(token)
        .or_else(|| LEGACY_RE.captures(token))?;
    let width: f64 = caps[1].parse().ok()?;
    let height: f64 = caps[2].parse().ok()?;
    (width > 0.0 && height > 0.0).then_some(Dimensions { width, height })
}

/// Size preset whose dimensions match exactly.
pub fn find_preset(catalog: &OptionCatalog, width: f64, height: f64) -> Option<DbId> {
    catalog
        .items(Collection::Sizes)
        .iter()
        .find(|item| {
            !item.sku_code.is_empty() && item.width == Some(width) && item.height == Some(height)
        })
        .map(|item| item.id)
}

/// SKU fragment for the configuration's size.
///
/// A selected size preset wins. Otherwise custom dimensions are matched
/// against the presets, and written as a custom fragment if none matches.
pub fn size_fragment(
    config: &Configuration,
    catalog: &OptionCatalog,
    format: CustomSizeFormat,
) -> Option<String> {
    if let Some(code) = config.size.and_then(|id| catalog.code(Collection::Sizes, id)) {
        return Some(code.to_string());
    }
    let (width, height) = (config.width?, config.height?);
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    match find_preset(catalog, width, height).and_then(|id| catalog.code(Collection::Sizes, id)) {
        Some(code) => Some(code.to_string()),
        None => Some(custom_size_fragment(width, height, format)),
    }
}
