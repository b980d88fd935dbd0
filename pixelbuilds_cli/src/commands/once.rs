use anyhow::Result;
use pixelbuilds_metrics::{render_text, DownloadGauges};
use pixelbuilds_scheduler::{CycleRunner, ExporterConfig};
use tracing::info;

pub async fn execute(config: ExporterConfig) -> Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let gauges = DownloadGauges::new(&config.namespace)?;
    let runner = CycleRunner::from_config(&config, gauges.clone())?;

    let report = runner.run_cycle().await?;
    info!(
        "Cycle finished: {} devices, {} assets counted, {} skipped, {} unavailable sources",
        report.devices,
        report.summary.assets_counted,
        report.summary.assets_skipped,
        report.unavailable.len()
    );

    print!("{}", render_text(&gauges)?);

    Ok(())
}
