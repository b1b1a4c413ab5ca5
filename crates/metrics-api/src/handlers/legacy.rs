//! The legacy plain-text endpoints, kept alongside the JSON ones for
//! backward compatibility with older clients. They share
//! `MetricKind::from_str` and `Metric::validated` with the JSON path so
//! the two codepaths cannot drift on validation semantics.

use super::publish_audit;
use crate::errors::IngestError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use metrics_core::wire::{Metric, MetricKind};
use std::sync::Arc;

pub async fn update_legacy(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((kind, name, value)): Path<(String, String, String)>,
) -> Result<String, IngestError> {
    let kind: MetricKind = kind.parse()?;

    let metric = match kind {
        MetricKind::Gauge => {
            let parsed: f64 = value.parse().map_err(|_| IngestError::MalformedBody(
                format!("'{value}' is not a valid gauge value"),
            ))?;
            Metric::gauge(name.clone(), parsed)
        }
        MetricKind::Counter => {
            let parsed: i64 = value.parse().map_err(|_| IngestError::MalformedBody(
                format!("'{value}' is not a valid counter delta"),
            ))?;
            Metric::counter(name.clone(), parsed)
        }
    };

    state.store.apply_one(&metric).await?;
    publish_audit(&state, &headers, vec![name]).await;

    Ok("OK".to_string())
}

pub async fn value_legacy(
    State(state): State<Arc<AppState>>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<String, IngestError> {
    let kind: MetricKind = kind.parse()?;

    match kind {
        MetricKind::Gauge => {
            let value = state.store.get_gauge(&name).await?.ok_or_else(|| IngestError::NotFound {
                id: name.clone(),
                kind: kind.as_str().to_string(),
            })?;
            Ok(format!("{value}"))
        }
        MetricKind::Counter => {
            let value = state.store.get_counter(&name).await?.ok_or_else(|| IngestError::NotFound {
                id: name.clone(),
                kind: kind.as_str().to_string(),
            })?;
            Ok(format!("{value}"))
        }
    }
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
