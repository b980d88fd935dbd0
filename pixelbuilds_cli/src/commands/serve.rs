use anyhow::{Context, Result};
use pixelbuilds_metrics::{serve_scrape, DownloadGauges};
use pixelbuilds_scheduler::{CycleRunner, ExporterConfig, Scheduler};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn execute(
    mut config: ExporterConfig,
    listen: Option<SocketAddr>,
    interval: Option<String>,
) -> Result<()> {
    if let Some(listen) = listen {
        config.listen_addr = listen;
    }

    if let Some(interval) = interval {
        config.interval = humantime::parse_duration(&interval)
            .with_context(|| format!("Invalid interval '{}'", interval))?;
    }

    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let gauges = DownloadGauges::new(&config.namespace)?;
    let runner = CycleRunner::from_config(&config, gauges.clone())?;
    let scheduler = Scheduler::new(runner, config.interval);

    info!("Starting Prometheus server");
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let server = tokio::spawn(serve_scrape(listener, gauges, shutdown.clone()));

    let result = scheduler.run(shutdown.clone()).await;

    // A failed cycle also stops the scrape endpoint so the process exits
    shutdown.cancel();
    server.await??;

    let cycles = result?;
    info!("Exporter stopped after {} cycles", cycles);

    Ok(())
}

async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown requested, finishing current cycle");
    shutdown.cancel();
}
