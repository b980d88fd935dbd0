use pixelbuilds_targets::{upstream_router, UpstreamFixture};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:8081".to_string());

    let fixture = match args.next() {
        Some(path) => {
            info!("Loading fixture from {}", path);
            let contents = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&contents)?
        }
        None => UpstreamFixture::sample(),
    };

    info!("Starting mock upstream on {}", addr);
    info!("Endpoints:");
    info!("  GET /devices.json                                   - Device catalog");
    info!("  GET /github/repos/:codename/releases                - GitHub releases");
    info!("  GET /gitea/api/v1/repos/releases/:codename/releases - Gitea releases");
    info!("Serving {} devices", fixture.devices.len());

    let app = upstream_router(Arc::new(RwLock::new(fixture)));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
