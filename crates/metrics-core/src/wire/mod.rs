//! # Wire Model
//!
//! The single shared record that crosses the agent/server boundary, plus the
//! HTTP framing header names both sides agree on.

pub mod headers;
mod metric;

pub use metric::{Batch, BatchError, Metric, MetricKind, ValidationError};
