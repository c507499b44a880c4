//! TTL cache of snapshots, one per product line.
//!
//! A failed refresh serves the last good snapshot (and logs a warning) so the
//! configurator keeps working while the database is unavailable. Only a line
//! that was never loaded surfaces the error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use configurator_core::types::{DbId, Timestamp};
use configurator_core::ConfiguratorData;
use tokio::sync::RwLock;

use crate::error::LoaderResult;
use crate::source::SnapshotSource;

/// A cached snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub data: Arc<ConfiguratorData>,
    pub loaded_at: Timestamp,
    fetched: Instant,
}

pub struct SnapshotCache<S> {
    source: S,
    ttl: Duration,
    entries: RwLock<HashMap<DbId, Snapshot>>,
}

impl<S: SnapshotSource> SnapshotCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fresh snapshot if cached within the TTL, otherwise reload.
    pub async fn get(&self, product_line_id: DbId) -> LoaderResult<Arc<ConfiguratorData>> {
        if let Some(snapshot) = self.entries.read().await.get(&product_line_id) {
            if snapshot.fetched.elapsed() < self.ttl {
                return Ok(Arc::clone(&snapshot.data));
            }
        }

        match self.source.load(product_line_id).await {
            Ok(data) => {
                let snapshot = Snapshot {
                    data: Arc::new(data),
                    loaded_at: chrono::Utc::now(),
                    fetched: Instant::now(),
                };
                let data = Arc::clone(&snapshot.data);
                self.entries.write().await.insert(product_line_id, snapshot);
                Ok(data)
            }
            Err(err) => match self.entries.read().await.get(&product_line_id) {
                Some(stale) => {
                    tracing::warn!(
                        product_line_id,
                        loaded_at = %stale.loaded_at,
                        error = %err,
                        "Snapshot refresh failed, serving stale data",
                    );
                    Ok(Arc::clone(&stale.data))
                }
                None => Err(err),
            },
        }
    }

    /// When the cached snapshot of a line was loaded, if any.
    pub async fn loaded_at(&self, product_line_id: DbId) -> Option<Timestamp> {
        self.entries
            .read()
            .await
            .get(&product_line_id)
            .map(|s| s.loaded_at)
    }

    /// Drop one line; the next `get` reloads it.
    pub async fn invalidate(&self, product_line_id: DbId) {
        self.entries.write().await.remove(&product_line_id);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
