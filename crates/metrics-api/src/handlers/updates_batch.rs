//! `POST /updates/` — JSON batch update. Empty batches are rejected at the
//! door; everything else is applied as a single unit by the storage
//! backend (transactionally, for the relational backend).

use super::publish_audit;
use crate::errors::IngestError;
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use metrics_core::wire::{Batch, Metric};
use std::sync::Arc;

pub async fn updates_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(metrics): Json<Vec<Metric>>,
) -> Result<Json<Vec<Metric>>, IngestError> {
    let batch: Batch = metrics
        .try_into()
        .map_err(|_| IngestError::MalformedBody("batch must contain at least one metric".to_string()))?;

    let updated = state.store.apply_batch(batch.metrics()).await?;

    let ids = updated.iter().map(|m| m.id().to_string()).collect();
    publish_audit(&state, &headers, ids).await;

    Ok(Json(updated))
}

#[cfg(test)]
#[path = "updates_batch_tests.rs"]
mod tests;
