//! `GET /` — a minimal HTML table of every stored metric. A richer
//! static-HTML dashboard renderer is an external collaborator; this
//! handler only needs to return *some* HTML body built from the current
//! store contents.

use crate::errors::IngestError;
use crate::AppState;
use axum::extract::State;
use axum::response::Html;
use std::fmt::Write as _;
use std::sync::Arc;

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, IngestError> {
    let snapshot = state.store.get_all().await?;

    let mut body = String::from("<html><head><title>metrics</title></head><body>");
    body.push_str("<h1>Gauges</h1><table><tr><th>id</th><th>value</th></tr>");
    let mut gauges: Vec<_> = snapshot.gauges.iter().collect();
    gauges.sort_by_key(|(id, _)| id.to_string());
    for (id, value) in gauges {
        let _ = write!(body, "<tr><td>{id}</td><td>{value}</td></tr>");
    }
    body.push_str("</table><h1>Counters</h1><table><tr><th>id</th><th>value</th></tr>");
    let mut counters: Vec<_> = snapshot.counters.iter().collect();
    counters.sort_by_key(|(id, _)| id.to_string());
    for (id, value) in counters {
        let _ = write!(body, "<tr><td>{id}</td><td>{value}</td></tr>");
    }
    body.push_str("</table></body></html>");

    Ok(Html(body))
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
