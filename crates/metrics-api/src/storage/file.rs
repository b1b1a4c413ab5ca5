//! The file-backed store: a [`MemoryStore`] plus durable snapshotting,
//! either synchronous (save on every write) or periodic (a background task
//! ticking every `store_interval`).

use super::memory::{MemoryStore, PathSyncHook};
use super::{MetricStore, StoreError, StoreSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The on-disk snapshot shape: `{"gauges": {...}, "counters": {...}}`.
/// `#[serde(default)]` on both maps means an empty or partially-written
/// file still loads rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub gauges: HashMap<String, f64>,
    #[serde(default)]
    pub counters: HashMap<String, i64>,
}

/// Write `gauges`/`counters` to `path` atomically: serialize to a temp file
/// in the same directory, then rename over the target. A crash mid-write
/// leaves either the old snapshot or nothing, never a half-written file.
pub(crate) async fn write_snapshot_atomic(
    path: &Path,
    gauges: &HashMap<String, f64>,
    counters: &HashMap<String, i64>,
) -> Result<(), StoreError> {
    let document = SnapshotDocument {
        gauges: gauges.clone(),
        counters: counters.clone(),
    };
    let body = serde_json::to_vec_pretty(&document).map_err(|e| {
        StoreError::SnapshotWrite(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp_path = PathBuf::from(dir);
    let file_name = path
        .file_name()
        .map(|n| format!(".{}.tmp", n.to_string_lossy()))
        .unwrap_or_else(|| ".snapshot.tmp".to_string());
    tmp_path.push(file_name);

    tokio::fs::write(&tmp_path, &body)
        .await
        .map_err(StoreError::SnapshotWrite)?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(StoreError::SnapshotWrite)?;
    Ok(())
}

/// Load a snapshot from `path`. A missing file is not an error — it's
/// treated as "nothing persisted yet" and yields an empty document.
async fn load_snapshot(path: &Path) -> Result<SnapshotDocument, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str(&contents).map_err(StoreError::SnapshotParse),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SnapshotDocument::default()),
        Err(e) => Err(StoreError::SnapshotRead(e)),
    }
}

pub struct FileStore {
    memory: Arc<MemoryStore>,
    path: PathBuf,
    periodic_handle: Option<JoinHandle<()>>,
}

impl FileStore {
    /// Build a file-backed store, restoring from `path` first if `restore`
    /// is set and the file exists, then wiring up synchronous or periodic
    /// snapshotting per `store_interval` (`0` means synchronous).
    pub async fn new(
        path: PathBuf,
        restore: bool,
        store_interval: Duration,
    ) -> Result<Arc<Self>, StoreError> {
        let initial = if restore {
            load_snapshot(&path).await?
        } else {
            SnapshotDocument::default()
        };

        if store_interval.is_zero() {
            let memory = Arc::new(
                MemoryStore::with_initial(initial.gauges, initial.counters)
                    .with_sync_hook(Box::new(PathSyncHook { path: path.clone() })),
            );
            return Ok(Arc::new(Self {
                memory,
                path,
                periodic_handle: None,
            }));
        }

        let memory = Arc::new(MemoryStore::with_initial(initial.gauges, initial.counters));
        let task_memory = Arc::clone(&memory);
        let task_path = path.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(store_interval);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                ticker.tick().await;
                let (gauges, counters) = task_memory.snapshot_locked().await;
                if let Err(err) = write_snapshot_atomic(&task_path, &gauges, &counters).await {
                    tracing::warn!(error = %err, "periodic snapshot save failed");
                }
            }
        });

        Ok(Arc::new(Self {
            memory,
            path,
            periodic_handle: Some(handle),
        }))
    }

    /// Write the current in-memory state to disk, regardless of save mode.
    /// Called by the periodic saver task and on final shutdown flush.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (gauges, counters) = self.memory.snapshot_locked().await;
        write_snapshot_atomic(&self.path, &gauges, &counters).await
    }

    /// Stop the periodic saver task (if any) and attempt one final flush.
    /// Safe to call even in synchronous mode, where every write was already
    /// durable.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        if let Some(handle) = &self.periodic_handle {
            handle.abort();
        }
        self.flush().await
    }
}

#[async_trait]
impl MetricStore for FileStore {
    async fn update_gauge(&self, id: &str, value: f64) -> Result<f64, StoreError> {
        self.memory.update_gauge(id, value).await
    }

    async fn update_counter(&self, id: &str, delta: i64) -> Result<i64, StoreError> {
        self.memory.update_counter(id, delta).await
    }

    async fn get_gauge(&self, id: &str) -> Result<Option<f64>, StoreError> {
        self.memory.get_gauge(id).await
    }

    async fn get_counter(&self, id: &str) -> Result<Option<i64>, StoreError> {
        self.memory.get_counter(id).await
    }

    async fn get_all(&self) -> Result<StoreSnapshot, StoreError> {
        self.memory.get_all().await
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
