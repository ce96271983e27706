use axum::response::Json;
use serde_json::{Value, json};

/// `GET /health`: liveness only; never touches the log.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
