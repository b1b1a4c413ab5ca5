//! # Metrics Core
//!
//! Shared domain logic for the metrics telemetry agent/server pair.
//!
//! This crate contains the pieces both processes need: the wire model for a
//! single metric, the classified-retry executor, and the cryptographic
//! framing (gzip, HMAC-SHA256, chunked RSA-OAEP) that secures requests
//! between them.
//!
//! ## Architecture
//!
//! The core follows the same split the rest of this workspace uses:
//! business logic depends only on these shared types, while HTTP transport,
//! storage backends, and process wiring live in `metrics-api`,
//! `metrics-server`, and `metrics-agent`.
//!
//! ## Usage
//!
//! ```rust
//! use metrics_core::wire::{Metric, MetricKind};
//!
//! let metric = Metric::gauge("HeapAlloc", 1024.0);
//! assert_eq!(metric.kind(), MetricKind::Gauge);
//! ```

pub mod audit;
pub mod crypto;
pub mod retry;
pub mod wire;

pub use wire::{Metric, MetricKind};
