use crate::error::ApiError;
use crate::server::ApiState;
use axum::extract::State;
use axum::response::Json;
use chrono::Utc;
use signaltrap_core::Snapshot;
use signaltrap_core::TrapError;
use signaltrap_core::stats::load_snapshot;
use std::sync::Arc;

/// `GET /api/stats`: re-read and re-aggregate the whole log.
///
/// The file read is blocking, so it runs on the blocking pool. No caching:
/// two requests a millisecond apart may legitimately differ if the producer
/// appended in between.
pub async fn get_stats(State(state): State<Arc<ApiState>>) -> Result<Json<Snapshot>, ApiError> {
    let st = Arc::clone(&state);
    let snapshot = tokio::task::spawn_blocking(move || {
        load_snapshot(&st.log_path, st.limits, st.geo.as_ref(), Utc::now())
    })
    .await
    .map_err(|e| TrapError::Internal(format!("stats task failed: {e}")))??;

    tracing::debug!(
        total = snapshot.total_events,
        ips = snapshot.ip_counts.len(),
        "stats: snapshot built"
    );
    Ok(Json(snapshot))
}
