//! Integration tests for the stats API.
//!
//! Uses `tower::ServiceExt::oneshot` to call handlers without binding a real
//! TCP port; every test gets its own temp log file.

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use signaltrap_api::server::{ApiState, build_api_router};
use signaltrap_core::aggregate::Limits;
use signaltrap_core::geo::{GeoCache, GeoLocation, GeoLookup, NoGeo};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt; // .oneshot()

// ── Helper ────────────────────────────────────────────────────

fn make_state(log_path: &Path) -> Arc<ApiState> {
    make_state_with(log_path.to_path_buf(), Arc::new(NoGeo), None)
}

fn make_state_with(
    log_path: PathBuf,
    geo: Arc<dyn GeoLookup>,
    public_dir: Option<PathBuf>,
) -> Arc<ApiState> {
    Arc::new(ApiState {
        log_path,
        limits: Limits::default(),
        geo,
        public_dir,
    })
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn log_file(contents: &str) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    write!(tmp, "{contents}").unwrap();
    tmp
}

// ── Health ────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok_true() {
    let app = build_api_router(make_state(Path::new("/nonexistent/traffic.log")));
    let resp = app.oneshot(get_req("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let j = body_json(resp).await;
    assert_eq!(j["ok"], true);
}

// ── Stats ─────────────────────────────────────────────────────

#[tokio::test]
async fn stats_aggregates_log_contents() {
    let log = log_file(
        "2025-01-01T00:00:00Z SRC=10.0.0.1 DSTPORT=22\n2025-01-01T00:00:01Z SRC=10.0.0.1 DSTPORT=22\n",
    );
    let app = build_api_router(make_state(log.path()));
    let resp = app.oneshot(get_req("/api/stats")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let j = body_json(resp).await;
    assert_eq!(j["ipCounts"], serde_json::json!({ "10.0.0.1": 2 }));
    assert_eq!(j["portCounts"], serde_json::json!({ "22": 2 }));
    assert_eq!(j["lastSeen"]["10.0.0.1"], "2025-01-01T00:00:01Z");
    assert_eq!(j["totalEvents"], 2);
    assert_eq!(j["topIPs"][0]["ip"], "10.0.0.1");
    assert_eq!(j["topPorts"][0]["port"], 22);
    assert_eq!(j["recentEvents"][0]["timestamp"], "2025-01-01T00:00:01Z");
    assert_eq!(j["recentEvents"][0]["protocol"], "SSH");
}

#[tokio::test]
async fn stats_on_missing_log_is_empty_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_api_router(make_state(&dir.path().join("traffic.log")));
    let resp = app.oneshot(get_req("/api/stats")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let j = body_json(resp).await;
    assert_eq!(j["ipCounts"], serde_json::json!({}));
    assert_eq!(j["portCounts"], serde_json::json!({}));
    assert_eq!(j["lastSeen"], serde_json::json!({}));
    assert_eq!(j["totalEvents"], 0);
}

#[tokio::test]
async fn stats_on_empty_log_is_empty() {
    let log = log_file("");
    let app = build_api_router(make_state(log.path()));
    let resp = app.oneshot(get_req("/api/stats")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let j = body_json(resp).await;
    assert_eq!(j["ipCounts"], serde_json::json!({}));
}

#[tokio::test]
async fn stats_io_failure_returns_500_with_error_body() {
    // A directory exists but cannot be read as a file.
    let dir = tempfile::tempdir().unwrap();
    let app = build_api_router(make_state(dir.path()));
    let resp = app.oneshot(get_req("/api/stats")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let j = body_json(resp).await;
    assert!(j["error"].as_str().is_some_and(|s| s.starts_with("IO error")));
}

#[tokio::test]
async fn stats_reflects_appends_between_requests() {
    let mut log = log_file("SRC=1.1.1.1\n");
    let state = make_state(log.path());

    let app1 = build_api_router(Arc::clone(&state));
    let j = body_json(app1.oneshot(get_req("/api/stats")).await.unwrap()).await;
    assert_eq!(j["ipCounts"]["1.1.1.1"], 1);

    writeln!(log, "SRC=1.1.1.1").unwrap();
    log.flush().unwrap();

    let app2 = build_api_router(Arc::clone(&state));
    let j = body_json(app2.oneshot(get_req("/api/stats")).await.unwrap()).await;
    assert_eq!(j["ipCounts"]["1.1.1.1"], 2);
}

#[tokio::test]
async fn stats_unchanged_log_gives_identical_bodies() {
    let log = log_file("SRC=2.2.2.2 DSTPORT=80\nSRC=1.1.1.1 DSTPORT=22\n");
    let state = make_state(log.path());

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let app = build_api_router(Arc::clone(&state));
        let resp = app.oneshot(get_req("/api/stats")).await.unwrap();
        bodies.push(to_bytes(resp.into_body(), 1024 * 1024).await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn stats_includes_geo_records() {
    let log = log_file("SRC=8.8.8.8 DSTPORT=22\nSRC=192.168.1.5 DSTPORT=22\n");
    let geo = GeoCache::new(HashMap::from([(
        "8.8.8.8".to_string(),
        GeoLocation {
            country: Some("United States".into()),
            latitude: Some(37.7),
            longitude: Some(-97.8),
        },
    )]));
    let state = make_state_with(log.path().to_path_buf(), Arc::new(geo), None);
    let app = build_api_router(state);
    let j = body_json(app.oneshot(get_req("/api/stats")).await.unwrap()).await;

    let geo_ips = j["geoIPs"].as_array().unwrap();
    assert_eq!(geo_ips.len(), 1);
    assert_eq!(geo_ips[0]["ip"], "8.8.8.8");
    assert_eq!(geo_ips[0]["lat"], 37.7);
    assert_eq!(geo_ips[0]["lon"], -97.8);
    assert_eq!(geo_ips[0]["count"], 1);
}

// ── CORS ──────────────────────────────────────────────────────

#[tokio::test]
async fn every_response_allows_any_origin() {
    let app = build_api_router(make_state(Path::new("/nonexistent/traffic.log")));
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/stats")
        .header(header::ORIGIN, "https://dashboard.example")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

// ── Static passthrough ────────────────────────────────────────

#[tokio::test]
async fn unknown_paths_fall_through_to_public_dir() {
    let public = tempfile::tempdir().unwrap();
    std::fs::write(public.path().join("index.html"), "<h1>dash</h1>").unwrap();

    let state = make_state_with(
        PathBuf::from("/nonexistent/traffic.log"),
        Arc::new(NoGeo),
        Some(public.path().to_path_buf()),
    );
    let app = build_api_router(state);
    let resp = app.oneshot(get_req("/index.html")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>dash</h1>");
}

#[tokio::test]
async fn unknown_paths_without_public_dir_are_404() {
    let app = build_api_router(make_state(Path::new("/nonexistent/traffic.log")));
    let resp = app.oneshot(get_req("/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
