//! Runtime sampler: publishes the fixed 27-name gauge
//! set plus `RandomValue`, and increments the atomic `PollCount` the
//! aggregator reads back on every report cycle.
//!
//! Rust has no garbage
//! collector, so the handful of names that describe Go's GC internals
//! (`GCCPUFraction`, `NumGC`, `PauseTotalNs`, ...) have no real source —
//! those report `0.0` here, while the memory-shaped names
//! (`Alloc`/`HeapAlloc`/`Sys`/`TotalAlloc`) are backed by the process's
//! actual resident/virtual memory via `sysinfo`, which is the closest
//! Rust-native analogue available (see DESIGN.md Open Questions).

use metrics_core::wire::Metric;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The fixed gauge names the runtime sampler reports every tick, in
/// report order.
pub const RUNTIME_GAUGE_NAMES: &[&str] = &[
    "Alloc",
    "BuckHashSys",
    "Frees",
    "GCCPUFraction",
    "GCSys",
    "HeapAlloc",
    "HeapIdle",
    "HeapInuse",
    "HeapObjects",
    "HeapReleased",
    "HeapSys",
    "LastGC",
    "Lookups",
    "MCacheInuse",
    "MCacheSys",
    "MSpanInuse",
    "MSpanSys",
    "Mallocs",
    "NextGC",
    "NumForcedGC",
    "NumGC",
    "OtherSys",
    "PauseTotalNs",
    "StackInuse",
    "StackSys",
    "Sys",
    "TotalAlloc",
];

/// Sample the current process's memory footprint and map it onto the
/// fixed gauge set. Names with no Rust-native counterpart report `0.0`.
fn sample_process_memory() -> Vec<(&'static str, f64)> {
    let mut system = System::new();
    let pid = Pid::from_u32(std::process::id());
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    let (resident, virtual_mem) = system
        .process(pid)
        .map(|p| (p.memory() as f64, p.virtual_memory() as f64))
        .unwrap_or((0.0, 0.0));

    RUNTIME_GAUGE_NAMES
        .iter()
        .map(|&name| {
            let value = match name {
                "Alloc" | "HeapAlloc" | "HeapInuse" => resident,
                "Sys" | "HeapSys" | "TotalAlloc" => virtual_mem,
                _ => 0.0,
            };
            (name, value)
        })
        .collect()
}

/// Spawn the runtime sampler task. Every `interval` tick it samples
/// process memory, emits the fixed gauge set plus `RandomValue`,
/// increments `poll_count`, and returns promptly once `cancel` fires.
pub fn spawn_runtime_sampler(
    sink: Sender<Metric>,
    poll_count: Arc<AtomicI64>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("runtime sampler stopping");
                    return;
                }
                _ = ticker.tick() => {
                    poll_count.fetch_add(1, Ordering::Relaxed);

                    for (name, value) in sample_process_memory() {
                        publish(&sink, Metric::gauge(name, value));
                    }
                    publish(&sink, Metric::gauge("RandomValue", rand::random::<f64>()));
                }
            }
        }
    })
}

fn publish(sink: &Sender<Metric>, metric: Metric) {
    if let Err(err) = sink.try_send(metric) {
        tracing::warn!(error = %err, "runtime sample dropped: aggregator channel full or closed");
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
