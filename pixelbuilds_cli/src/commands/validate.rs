use crate::ui;
use anyhow::Result;
use colored::Colorize;
use pixelbuilds_scheduler::ExporterConfig;
use std::path::PathBuf;

pub async fn execute(config: ExporterConfig, path: Option<PathBuf>) -> Result<()> {
    match &path {
        Some(path) => println!("Validating configuration: {}", path.display()),
        None => println!("Validating built-in defaults"),
    }

    if let Err(e) = config.validate() {
        anyhow::bail!("Configuration is invalid: {}", e);
    }

    ui::print_success("Configuration is valid");

    println!("\n{}", "Exporter:".bold());
    println!("  Listen: {}", config.listen_addr.to_string().green());
    println!("  Interval: {}", humantime::format_duration(config.interval));
    println!("  Namespace: {}", config.namespace);
    println!("  Catalog: {}", config.catalog_url);
    println!("  GitHub: {}", config.github_api_base);
    println!("  Gitea: {}", config.gitea_api_base);
    println!(
        "  Assets: prefix '{}' or suffix '{}'",
        config.naming.product_prefix, config.naming.archive_suffix
    );

    if config.device_concurrency > 1 {
        println!("  Device concurrency: {}", config.device_concurrency);
    }

    match config.request_timeout {
        Some(timeout) => println!("  Request timeout: {}", humantime::format_duration(timeout)),
        None => ui::print_warning("No request timeout set; a hung upstream blocks the cycle"),
    }

    Ok(())
}
