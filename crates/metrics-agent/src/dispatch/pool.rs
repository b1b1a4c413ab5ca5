//! The bounded worker pool: `rate_limit` tasks consuming a
//! single job channel of capacity `10 * rate_limit`, each driving
//! [`super::send_metric`] serially.

use super::client::DispatchDeps;
use super::single::send_metric;
use metrics_core::wire::Metric;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Internal agent record enqueued to the worker pool. The
/// category tag is observational only — it never affects routing, only
/// what gets logged when a job is dropped or fails.
#[derive(Debug, Clone)]
pub struct WorkerJob {
    pub metric: Metric,
    pub category: &'static str,
}

impl WorkerJob {
    pub fn new(metric: Metric, category: &'static str) -> Self {
        Self { metric, category }
    }
}

/// A cheaply cloneable submission handle. Multiple producers (the
/// forwarder, the batch-fallback path) may submit concurrently — both
/// hold a clone of this handle rather than the pool itself, since only
/// shutdown needs exclusive ownership.
#[derive(Clone)]
pub struct PoolHandle {
    sender: mpsc::Sender<WorkerJob>,
}

impl PoolHandle {
    /// Enqueue `job` without blocking. Drops (with a log line) if the
    /// channel is full or every worker has already stopped.
    pub fn submit(&self, job: WorkerJob) {
        if let Err(err) = self.sender.try_send(job) {
            let category = err.into_inner().category;
            tracing::warn!(category, "job dropped: worker queue full or pool closed");
        }
    }
}

/// A bounded pool of worker tasks draining a shared job channel.
/// Submission never blocks: a full channel drops the job with a log line
///.
pub struct WorkerPool {
    sender: Option<mpsc::Sender<WorkerJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `rate_limit` worker tasks sharing one job channel of capacity
    /// `10 * rate_limit`.
    pub fn new(rate_limit: usize, deps: Arc<DispatchDeps>) -> Self {
        let rate_limit = rate_limit.max(1);
        let (sender, receiver) = mpsc::channel(10 * rate_limit);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..rate_limit)
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                let deps = Arc::clone(&deps);
                tokio::spawn(worker_loop(worker_id, receiver, deps))
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// A cloneable handle producers submit jobs through. Returns `None`
    /// once [`WorkerPool::stop`] has been called.
    pub fn handle(&self) -> Option<PoolHandle> {
        self.sender.clone().map(|sender| PoolHandle { sender })
    }

    /// Close the job channel and join every worker, letting in-flight
    /// sends finish.
    pub async fn stop(mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if let Err(err) = worker.await {
                tracing::warn!(error = %err, "worker task panicked during shutdown");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<WorkerJob>>>,
    deps: Arc<DispatchDeps>,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            tracing::debug!(worker_id, "worker stopping: job channel closed");
            return;
        };

        if let Err(err) = send_metric(&deps, &job.metric).await {
            tracing::warn!(
                worker_id,
                category = job.category,
                metric_id = job.metric.id(),
                error = %err,
                "dropping metric after exhausting dispatch retries"
            );
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
