//! `POST /update/` — single JSON metric update, returning the canonical
//! updated record (accumulated total for counters, not the submitted delta).

use super::publish_audit;
use crate::errors::IngestError;
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use metrics_core::wire::Metric;
use std::sync::Arc;

pub async fn update_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(metric): Json<Metric>,
) -> Result<Json<Metric>, IngestError> {
    let validated = Metric::validated(
        metric.id().to_string(),
        metric.kind(),
        metric.value(),
        metric.delta(),
    )?;

    let updated = state.store.apply_one(&validated).await?;
    publish_audit(&state, &headers, vec![updated.id().to_string()]).await;

    Ok(Json(updated))
}

#[cfg(test)]
#[path = "update_json_tests.rs"]
mod tests;
