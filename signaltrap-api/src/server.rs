use crate::handlers;
use axum::{Router, routing::get};
use signaltrap_core::aggregate::Limits;
use signaltrap_core::config::SignalTrapConfig;
use signaltrap_core::geo::GeoLookup;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

/// Shared, read-only state for the stats API.
///
/// Nothing here changes after startup; every request reads the log afresh.
pub struct ApiState {
    pub log_path: PathBuf,
    pub limits: Limits,
    pub geo: Arc<dyn GeoLookup>,
    /// Static fallback root. `None` answers unknown paths with 404.
    pub public_dir: Option<PathBuf>,
}

impl ApiState {
    pub fn from_config(config: &SignalTrapConfig, geo: Arc<dyn GeoLookup>) -> Self {
        Self {
            log_path: config.log.path.clone(),
            limits: Limits {
                top: config.log.top_limit,
                recent: config.log.recent_limit,
            },
            geo,
            public_dir: Some(config.server.public_dir.clone()),
        }
    }
}

/// Build the axum router: stats, health, static passthrough, open CORS.
pub fn build_api_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/stats", get(handlers::stats::get_stats));

    if let Some(dir) = &state.public_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(cors).with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn start_api<F>(addr: &str, state: Arc<ApiState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_api_router(Arc::clone(&state));

    info!(
        addr = %addr,
        log = %state.log_path.display(),
        "Starting stats API server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Stats API server stopped");
    Ok(())
}
