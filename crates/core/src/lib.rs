//! Configurator core: option availability filtering, rule evaluation,
//! default/override resolution and the SKU codec.
//!
//! Everything in this crate is pure logic over already-loaded data. Loading
//! and caching live in `configurator-loader`.

pub mod catalog;
pub mod collections;
pub mod configurator;
pub mod display;
pub mod error;
pub mod filtering;
pub mod overrides;
pub mod query;
pub mod rules;
pub mod selection;
pub mod sku;
pub mod types;
pub mod validation;

pub use catalog::{OptionCatalog, OptionItem};
pub use collections::Collection;
pub use configurator::ConfiguratorData;
pub use error::CoreError;
pub use selection::{Configuration, Selection};
