//! The two independent samplers: a runtime-style sampler
//! publishing the fixed gauge set plus `PollCount`/`RandomValue`, and a
//! system sampler publishing host memory and per-CPU utilization.
//!
//! Both samplers push onto a bounded channel with `try_send` so a slow or
//! stalled aggregator never blocks sampling — a dropped sample is logged
//! and otherwise silently discarded.

mod runtime;
mod system;

pub use runtime::{spawn_runtime_sampler, RUNTIME_GAUGE_NAMES};
pub use system::spawn_system_sampler;

/// Capacity of each sampler's output channel.
pub const CHANNEL_CAPACITY: usize = 100;
