//! ctp-sentinel binary entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use ctp_sentinel::{AppConfig, Application};
use ctp_telemetry::init_logging;

#[derive(Parser, Debug)]
#[command(name = "ctp-sentinel")]
#[command(about = "Trading-session scheduler with risk-gated action dispatch")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };
    info!(?config, "configuration loaded");

    Application::new(config).run().await?;
    Ok(())
}
