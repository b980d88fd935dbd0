use crate::ui;
use anyhow::Result;
use pixelbuilds_core::{build_http_client, DeviceCatalog, HttpCatalog};
use pixelbuilds_scheduler::ExporterConfig;

pub async fn execute(config: ExporterConfig) -> Result<()> {
    let client = build_http_client(&config.user_agent, config.request_timeout)?;
    let catalog = HttpCatalog::new(client, &config.catalog_url);

    let devices = catalog.devices().await?;

    ui::print_header(&format!("Devices ({})", devices.len()));
    for device in &devices {
        println!("  • {}", device.codename);
    }

    Ok(())
}
