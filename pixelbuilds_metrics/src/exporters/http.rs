use crate::{exporters::prometheus::{render_text, TEXT_CONTENT_TYPE}, registry::DownloadGauges};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
struct ScrapeState {
    gauges: DownloadGauges,
    start_time: Instant,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    last_cycle: Option<DateTime<Utc>>,
}

pub fn scrape_router(gauges: DownloadGauges) -> Router {
    let state = ScrapeState {
        gauges,
        start_time: Instant::now(),
    };

    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the scrape endpoint until `shutdown` is cancelled.
pub async fn serve_scrape(
    listener: TcpListener,
    gauges: DownloadGauges,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Serving metrics on http://{}/metrics", addr);
    }

    axum::serve(listener, scrape_router(gauges))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn metrics(State(state): State<ScrapeState>) -> Response {
    match render_text(&state.gauges) {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health(State(state): State<ScrapeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        last_cycle: state.gauges.last_cycle(),
    })
}
