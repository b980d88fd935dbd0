mod commands;
mod ui;

use clap::{Parser, Subcommand};
use pixelbuilds_scheduler::{load_config_from_file, ExporterConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pixelbuilds-exporter")]
#[command(about = "Exports PixelBuilds release download counts as Prometheus gauges", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (YAML, TOML, or JSON)
    #[arg(short, long, global = true, env = "PIXELBUILDS_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve metrics and refresh them periodically (default)
    Serve {
        /// Address for the scrape endpoint
        #[arg(short, long)]
        listen: Option<SocketAddr>,

        /// Pause between collection cycles, e.g. "15m"
        #[arg(short, long)]
        interval: Option<String>,
    },

    /// Run a single collection cycle and print the exposition text
    Once,

    /// List device codenames from the catalog
    Devices,

    /// Validate the configuration and print it
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    let config = match &cli.config {
        Some(path) => load_config_from_file(path).await?,
        None => ExporterConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Serve {
        listen: None,
        interval: None,
    }) {
        Commands::Serve { listen, interval } => {
            commands::serve::execute(config, listen, interval).await?;
        }

        Commands::Once => {
            commands::once::execute(config).await?;
        }

        Commands::Devices => {
            commands::devices::execute(config).await?;
        }

        Commands::Validate => {
            commands::validate::execute(config, cli.config).await?;
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}
