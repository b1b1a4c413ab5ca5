//! The aggregator/forwarder: a single task that drains the
//! two sampler channels and, on every `report_interval` tick, dispatches
//! everything accumulated since the last cycle — either as one batch or
//! as individual worker-pool submissions, depending on configuration.

use crate::dispatch::{send_batch, DispatchDeps, PoolHandle, WorkerJob};
use metrics_core::wire::Metric;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawn the aggregator task. It drains `runtime_rx`/`system_rx`
/// non-blockingly as samples arrive, and on each `report_interval` tick
/// dispatches the accumulated metrics plus the current `PollCount`
///. On cancellation it drains and dispatches one final
/// report before returning, so the last report cycle isn't silently
/// dropped on shutdown.
#[allow(clippy::too_many_arguments)]
pub fn spawn_aggregator(
    mut runtime_rx: Receiver<Metric>,
    mut system_rx: Receiver<Metric>,
    poll_count: Arc<AtomicI64>,
    pool: PoolHandle,
    deps: Arc<DispatchDeps>,
    batch_size: i64,
    report_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer: Vec<WorkerJob> = Vec::new();
        let mut ticker = tokio::time::interval(report_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("aggregator stopping, dispatching final report");
                    drain_available(&mut runtime_rx, &mut system_rx, &mut buffer);
                    dispatch_cycle(&mut buffer, &poll_count, &pool, &deps, batch_size).await;
                    return;
                }
                Some(metric) = runtime_rx.recv() => {
                    buffer.push(WorkerJob::new(metric, "runtime"));
                }
                Some(metric) = system_rx.recv() => {
                    buffer.push(WorkerJob::new(metric, "system"));
                }
                _ = ticker.tick() => {
                    dispatch_cycle(&mut buffer, &poll_count, &pool, &deps, batch_size).await;
                }
            }
        }
    })
}

/// Drain whatever is immediately available on both channels without
/// waiting — used on shutdown so the final report reflects every sample
/// already queued, but doesn't block forever on senders that have closed.
fn drain_available(
    runtime_rx: &mut Receiver<Metric>,
    system_rx: &mut Receiver<Metric>,
    buffer: &mut Vec<WorkerJob>,
) {
    while let Ok(metric) = runtime_rx.try_recv() {
        buffer.push(WorkerJob::new(metric, "runtime"));
    }
    while let Ok(metric) = system_rx.try_recv() {
        buffer.push(WorkerJob::new(metric, "system"));
    }
}

/// Dispatch everything buffered since the last cycle, plus the current
/// `PollCount` counter value, then clear the buffer.
async fn dispatch_cycle(
    buffer: &mut Vec<WorkerJob>,
    poll_count: &AtomicI64,
    pool: &PoolHandle,
    deps: &DispatchDeps,
    batch_size: i64,
) {
    let poll_metric = Metric::counter("PollCount", poll_count.load(Ordering::Relaxed));
    let drained: Vec<WorkerJob> = buffer.drain(..).collect();

    if batch_size > 0 {
        let mut metrics: Vec<Metric> = drained.iter().map(|job| job.metric.clone()).collect();
        metrics.push(poll_metric.clone());

        if let Err(err) = send_batch(deps, &metrics).await {
            tracing::warn!(
                error = %err,
                count = metrics.len(),
                "batch dispatch failed, falling back to individual worker submissions"
            );
            for metric in metrics {
                pool.submit(WorkerJob::new(metric, "batch_fallback"));
            }
        }
    } else {
        for job in drained {
            pool.submit(job);
        }
        pool.submit(WorkerJob::new(poll_metric, "runtime"));
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
