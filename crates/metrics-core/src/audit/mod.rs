//! Audit event fanout.
//!
//! An async-trait observer/notifier pattern: the system only needs "what
//! ingest happened, from where, touching which metrics", so this stays
//! deliberately thin rather than growing actor/resource/compliance-
//! category/content-hash-chain fields a regulated audit trail would need.

mod file_observer;
mod remote_observer;

pub use file_observer::FileAuditObserver;
pub use remote_observer::RemoteAuditObserver;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A record of one accepted ingest, published to zero or more observers
/// after the handler has durably stored the metric(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub occurred_at: DateTime<Utc>,
    pub metric_ids: Vec<String>,
    pub client_ip: String,
}

impl AuditEvent {
    pub fn new(occurred_at: DateTime<Utc>, metric_ids: Vec<String>, client_ip: impl Into<String>) -> Self {
        Self {
            occurred_at,
            metric_ids,
            client_ip: client_ip.into(),
        }
    }
}

/// A sink for audit events. Implementations must not let a failure to
/// record propagate to the caller — the subject logs observer errors and
/// moves on.
#[async_trait]
pub trait AuditObserver: Send + Sync {
    async fn notify(&self, event: &AuditEvent) -> Result<(), AuditObserverError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditObserverError {
    #[error("failed to write audit event to file: {0}")]
    File(#[source] std::io::Error),

    #[error("failed to deliver audit event to remote collector: {0}")]
    Remote(#[source] reqwest::Error),

    #[error("remote audit collector returned non-2xx status {status}")]
    RemoteStatus { status: u16 },
}

/// Multi-observer notifier. `attach` adds an observer; `notify` iterates a
/// snapshot of attached observers so that a slow or failing observer never
/// holds the lock across its own call, and so new `attach` calls during a
/// notify can't deadlock against it.
#[derive(Default)]
pub struct AuditSubject {
    observers: RwLock<Vec<Arc<dyn AuditObserver>>>,
}

impl AuditSubject {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attach(&self, observer: Arc<dyn AuditObserver>) {
        self.observers.write().await.push(observer);
    }

    /// Publish `event` to every attached observer. Per-observer errors are
    /// logged and do not prevent delivery to the remaining observers.
    pub async fn notify(&self, event: &AuditEvent) {
        let snapshot: Vec<Arc<dyn AuditObserver>> = self.observers.read().await.clone();

        for observer in snapshot {
            if let Err(err) = observer.notify(event).await {
                tracing::warn!(error = %err, "audit observer failed to record event");
            }
        }
    }
}

#[cfg(test)]
#[path = "subject_tests.rs"]
mod tests;
