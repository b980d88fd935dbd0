use crate::fixture::UpstreamFixture;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use pixelbuilds_core::Source;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::debug;

#[derive(Clone)]
struct AppState {
    fixture: Arc<RwLock<UpstreamFixture>>,
    requests: Arc<AtomicUsize>,
}

pub fn upstream_router(fixture: Arc<RwLock<UpstreamFixture>>) -> Router {
    router_with_state(AppState {
        fixture,
        requests: Arc::new(AtomicUsize::new(0)),
    })
}

fn router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/devices.json", get(devices))
        .route("/github/repos/:codename/releases", get(github_releases))
        .route(
            "/gitea/api/v1/repos/releases/:codename/releases",
            get(gitea_releases),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Mock upstream bound to a local port, stopped when dropped.
pub struct MockUpstream {
    addr: SocketAddr,
    fixture: Arc<RwLock<UpstreamFixture>>,
    requests: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn spawn(fixture: UpstreamFixture) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Self::serve(listener, fixture)
    }

    pub fn serve(listener: TcpListener, fixture: UpstreamFixture) -> std::io::Result<Self> {
        let addr = listener.local_addr()?;
        let state = AppState {
            fixture: Arc::new(RwLock::new(fixture)),
            requests: Arc::new(AtomicUsize::new(0)),
        };

        let fixture = state.fixture.clone();
        let requests = state.requests.clone();
        let app = router_with_state(state);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Mock upstream stopped: {}", e);
            }
        });

        Ok(Self {
            addr,
            fixture,
            requests,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn catalog_url(&self) -> String {
        format!("http://{}/devices.json", self.addr)
    }

    pub fn github_api_base(&self) -> String {
        format!("http://{}/github/repos", self.addr)
    }

    pub fn gitea_api_base(&self) -> String {
        format!("http://{}/gitea/api/v1/repos/releases", self.addr)
    }

    /// Requests served so far, across all routes.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn update(&self, f: impl FnOnce(&mut UpstreamFixture)) {
        let mut fixture = self.fixture.write().await;
        f(&mut fixture);
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn devices(State(state): State<AppState>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let fixture = state.fixture.read().await;

    if let Some(status) = fixture.catalog_status {
        return (status_code(status), "catalog unavailable").into_response();
    }

    Json(fixture.devices.clone()).into_response()
}

async fn github_releases(State(state): State<AppState>, Path(codename): Path<String>) -> Response {
    releases(&state, Source::Github, &codename).await
}

async fn gitea_releases(State(state): State<AppState>, Path(codename): Path<String>) -> Response {
    releases(&state, Source::Gitea, &codename).await
}

async fn releases(state: &AppState, source: Source, codename: &str) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let fixture = state.fixture.read().await;

    let (status, releases) = fixture.releases_for(source, codename);
    debug!("{} releases for {}: {}", source, codename, status);

    match releases {
        Some(releases) => Json(releases.clone()).into_response(),
        None => (status_code(status), Json(json!({ "message": "Not Found" }))).into_response(),
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_catalog_and_releases() {
        let upstream = MockUpstream::spawn(UpstreamFixture::sample()).await.unwrap();

        let devices: serde_json::Value = reqwest::get(upstream.catalog_url())
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(devices[0]["codename"], "angler");

        let response = reqwest::get(format!("{}/angler/releases", upstream.github_api_base()))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let releases: serde_json::Value = response.json().await.unwrap();
        assert_eq!(releases[0]["assets"][0]["download_count"], 42);

        let response = reqwest::get(format!("{}/angler/releases", upstream.gitea_api_base()))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(upstream.request_count(), 3);
    }

    #[tokio::test]
    async fn test_update_fixture() {
        let upstream = MockUpstream::spawn(UpstreamFixture::sample()).await.unwrap();
        upstream.update(|f| *f = f.clone().catalog_status(503)).await;

        let response = reqwest::get(upstream.catalog_url()).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    }
}
