//! System sampler: host-wide memory and per-CPU
//! utilization, independent of the runtime sampler's process-local stats.

use metrics_core::wire::Metric;
use std::time::Duration;
use sysinfo::System;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// `sysinfo` needs two `refresh_cpu_usage` calls separated by a pause to
/// report a meaningful per-core percentage rather than `0.0` on the first
/// read after process start.
const CPU_AVERAGING_WINDOW: Duration = Duration::from_secs(1);

/// Spawn the system sampler task. Every `interval` tick it publishes
/// `TotalMemory`, `FreeMemory`, and one `CPUutilization{n}` gauge per
/// core, returning promptly once `cancel` fires — including mid-tick,
/// since the CPU averaging pause is itself cancellation-aware.
pub fn spawn_system_sampler(sink: Sender<Metric>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut system = System::new_all();
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("system sampler stopping");
                    return;
                }
                _ = ticker.tick() => {
                    system.refresh_memory();
                    publish(&sink, Metric::gauge("TotalMemory", system.total_memory() as f64));
                    publish(&sink, Metric::gauge("FreeMemory", system.free_memory() as f64));

                    system.refresh_cpu_usage();
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!("system sampler stopping mid-round");
                            return;
                        }
                        _ = tokio::time::sleep(CPU_AVERAGING_WINDOW) => {}
                    }
                    system.refresh_cpu_usage();

                    for (index, cpu) in system.cpus().iter().enumerate() {
                        let name = format!("CPUutilization{}", index + 1);
                        publish(&sink, Metric::gauge(name, cpu.cpu_usage() as f64));
                    }
                }
            }
        }
    })
}

fn publish(sink: &Sender<Metric>, metric: Metric) {
    if let Err(err) = sink.try_send(metric) {
        tracing::warn!(error = %err, "system sample dropped: aggregator channel full or closed");
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
