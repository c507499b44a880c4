//! Async loading and caching of configurator snapshots.
//!
//! A snapshot is everything `configurator-core` needs for one product line
//! ([`ConfiguratorData`]). [`SnapshotCache`] keeps one per line for a TTL and
//! falls back to the last good snapshot when a refresh fails;
//! [`ConfiguratorService`] runs the core operations on cached snapshots.

pub mod cache;
pub mod config;
pub mod error;
pub mod service;
pub mod source;

pub use cache::{Snapshot, SnapshotCache};
pub use config::LoaderConfig;
pub use configurator_core::ConfiguratorData;
pub use error::{LoaderError, LoaderResult};
pub use service::ConfiguratorService;
pub use source::{assemble_snapshot, PgSnapshotSource, SnapshotSource};

/// Connect to Postgres and build a service over it.
pub async fn connect(config: &LoaderConfig) -> LoaderResult<ConfiguratorService<PgSnapshotSource>> {
    let pool = configurator_db::create_pool(&config.database_url, config.max_connections).await?;
    configurator_db::health_check(&pool).await?;
    tracing::info!(max_connections = config.max_connections, "Database pool ready");
    Ok(ConfiguratorService::new(
        PgSnapshotSource::new(pool),
        config.cache_ttl,
    ))
}
