//! The metric store contract and its three backends.
//!
//! `MetricStore` is the single trait handlers depend on; `MemoryStore`,
//! `FileStore`, and `RelationalStore` are interchangeable behind it.
//! Selection between them is a startup-time decision (relational DSN beats
//! file path beats bare memory), made once in `metrics-server`'s `main`.

mod file;
mod memory;
mod relational;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use relational::RelationalStore;

use async_trait::async_trait;
use metrics_core::wire::Metric;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot file write failed: {0}")]
    SnapshotWrite(#[source] std::io::Error),

    #[error("snapshot file read failed: {0}")]
    SnapshotRead(#[source] std::io::Error),

    #[error("snapshot file contents are not valid JSON: {0}")]
    SnapshotParse(#[source] serde_json::Error),

    #[error("relational backend error: {0}")]
    Relational(#[source] sqlx::Error),
}

/// A full, defensive-copy view of both maps, as returned by `get_all` (the
/// `/` dashboard handler and the integration tests' restore assertions both
/// consume this shape).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub gauges: HashMap<String, f64>,
    pub counters: HashMap<String, i64>,
}

/// The storage contract every handler is written against. Every method is
/// `async` even on the in-memory backend, so handlers never need to know
/// which backend is behind the trait object.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Replace the stored value for gauge `id`, returning the new value.
    async fn update_gauge(&self, id: &str, value: f64) -> Result<f64, StoreError>;

    /// Add `delta` to counter `id` (starting from 0 on first sight),
    /// returning the new accumulated total.
    async fn update_counter(&self, id: &str, delta: i64) -> Result<i64, StoreError>;

    async fn get_gauge(&self, id: &str) -> Result<Option<f64>, StoreError>;

    async fn get_counter(&self, id: &str) -> Result<Option<i64>, StoreError>;

    async fn get_all(&self) -> Result<StoreSnapshot, StoreError>;

    /// Backend connectivity check for `/ping`. The default is always
    /// healthy — only the relational backend has a connection to lose.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Apply an ordered batch as a single unit. Implementations that wrap a
    /// transactional backend make this all-or-nothing; the in-memory
    /// backend applies sequentially under its usual per-op locking since it
    /// has no rollback capability (validation happens before this is ever
    /// called, so partial failure mid-batch is not expected in practice).
    ///
    /// Returns the canonical updated record for each input metric, echoing
    /// the post-update value — the accumulated total for counters, not the
    /// submitted delta.
    async fn apply_batch(&self, metrics: &[Metric]) -> Result<Vec<Metric>, StoreError> {
        let mut out = Vec::with_capacity(metrics.len());
        for metric in metrics {
            out.push(self.apply_one(metric).await?);
        }
        Ok(out)
    }

    /// Apply a single metric update, returning the canonical updated
    /// record. Shared by `apply_batch`'s default sequential path and the
    /// single-update handlers.
    async fn apply_one(&self, metric: &Metric) -> Result<Metric, StoreError> {
        use metrics_core::wire::MetricKind;
        match metric.kind() {
            MetricKind::Gauge => {
                let value = self.update_gauge(metric.id(), metric.value().unwrap_or(0.0)).await?;
                Ok(metric.clone().with_gauge_value(value))
            }
            MetricKind::Counter => {
                let total = self
                    .update_counter(metric.id(), metric.delta().unwrap_or(0))
                    .await?;
                Ok(metric.clone().with_counter_total(total))
            }
        }
    }
}
