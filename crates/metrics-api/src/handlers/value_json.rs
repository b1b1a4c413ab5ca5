//! `POST /value/` — JSON read. Request carries only `id`/`type`; response
//! echoes the stored value under the field the metric kind implies.

use crate::errors::IngestError;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use metrics_core::wire::{Metric, MetricKind};
use std::sync::Arc;

pub async fn value_json(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Metric>,
) -> Result<Json<Metric>, IngestError> {
    match request.kind() {
        MetricKind::Gauge => {
            let value = state
                .store
                .get_gauge(request.id())
                .await?
                .ok_or_else(|| IngestError::NotFound {
                    id: request.id().to_string(),
                    kind: request.kind().as_str().to_string(),
                })?;
            Ok(Json(Metric::gauge(request.id().to_string(), value)))
        }
        MetricKind::Counter => {
            let value = state
                .store
                .get_counter(request.id())
                .await?
                .ok_or_else(|| IngestError::NotFound {
                    id: request.id().to_string(),
                    kind: request.kind().as_str().to_string(),
                })?;
            Ok(Json(Metric::counter(request.id().to_string(), value)))
        }
    }
}

#[cfg(test)]
#[path = "value_json_tests.rs"]
mod tests;
