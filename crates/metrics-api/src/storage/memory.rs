//! The in-memory backend: two `RwLock`-guarded maps, with an optional
//! synchronous snapshot hook used by [`super::FileStore`]'s synchronous
//! mode.

use super::{StoreError, StoreSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// A callback invoked while `MemoryStore` still holds the write lock on the
/// map it just updated, so the save itself never tries to re-acquire a
/// lock the caller already holds — this is the "non-reentrant internal
/// save" that keeps synchronous-mode `FileStore` deadlock-free.
#[async_trait]
pub(crate) trait SyncSnapshotHook: Send + Sync {
    async fn save_locked(
        &self,
        gauges: &HashMap<String, f64>,
        counters: &HashMap<String, i64>,
    ) -> Result<(), StoreError>;
}

pub struct MemoryStore {
    gauges: RwLock<HashMap<String, f64>>,
    counters: RwLock<HashMap<String, i64>>,
    sync_hook: Option<Box<dyn SyncSnapshotHook>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            gauges: RwLock::new(HashMap::new()),
            counters: RwLock::new(HashMap::new()),
            sync_hook: None,
        }
    }

    pub fn with_initial(gauges: HashMap<String, f64>, counters: HashMap<String, i64>) -> Self {
        Self {
            gauges: RwLock::new(gauges),
            counters: RwLock::new(counters),
            sync_hook: None,
        }
    }

    pub(crate) fn with_sync_hook(mut self, hook: Box<dyn SyncSnapshotHook>) -> Self {
        self.sync_hook = Some(hook);
        self
    }

    pub(crate) async fn snapshot_locked(&self) -> (HashMap<String, f64>, HashMap<String, i64>) {
        let gauges = self.gauges.read().await.clone();
        let counters = self.counters.read().await.clone();
        (gauges, counters)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::MetricStore for MemoryStore {
    async fn update_gauge(&self, id: &str, value: f64) -> Result<f64, StoreError> {
        let mut gauges = self.gauges.write().await;
        gauges.insert(id.to_string(), value);

        if let Some(hook) = &self.sync_hook {
            let counters = self.counters.read().await;
            hook.save_locked(&gauges, &counters).await?;
        }

        Ok(value)
    }

    async fn update_counter(&self, id: &str, delta: i64) -> Result<i64, StoreError> {
        // Always take the gauges lock before the counters lock — the same
        // order `update_gauge` uses — so two concurrent calls can never
        // hold one map's lock while waiting on the other's.
        let gauges_guard = match &self.sync_hook {
            Some(_) => Some(self.gauges.read().await),
            None => None,
        };

        let mut counters = self.counters.write().await;
        let total = counters.entry(id.to_string()).or_insert(0);
        *total += delta;
        let total = *total;

        if let Some(hook) = &self.sync_hook {
            let gauges = gauges_guard.expect("sync_hook present implies gauges_guard present");
            hook.save_locked(&gauges, &counters).await?;
        }

        Ok(total)
    }

    async fn get_gauge(&self, id: &str) -> Result<Option<f64>, StoreError> {
        Ok(self.gauges.read().await.get(id).copied())
    }

    async fn get_counter(&self, id: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.counters.read().await.get(id).copied())
    }

    async fn get_all(&self) -> Result<StoreSnapshot, StoreError> {
        let (gauges, counters) = self.snapshot_locked().await;
        Ok(StoreSnapshot { gauges, counters })
    }
}

/// A file path paired with the synchronous-save behaviour `MemoryStore`
/// invokes under its own write lock. Lives here (rather than in `file.rs`)
/// so `MemoryStore` never needs to import the `FileStore` type itself —
/// only this narrow hook trait.
pub(crate) struct PathSyncHook {
    pub path: PathBuf,
}

#[async_trait]
impl SyncSnapshotHook for PathSyncHook {
    async fn save_locked(
        &self,
        gauges: &HashMap<String, f64>,
        counters: &HashMap<String, i64>,
    ) -> Result<(), StoreError> {
        super::file::write_snapshot_atomic(&self.path, gauges, counters).await
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
