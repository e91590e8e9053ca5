mod config;
mod platform;
mod stub;

use clap::Parser;
use config::RuntimeConfig;
use meridian_telemetry::TelemetryConfig;
use platform::Platform;

/// Process entry point: boots every subsystem, starts the background
/// workers, and runs until interrupted (mirrors the original
/// `StartupService.initialize`/`shutdown` lifecycle).
#[derive(Parser, Debug)]
#[command(name = "meridian", about = "Knowledge ingestion and agent execution platform")]
struct Cli {
    /// Override the log level (otherwise read from MERIDIAN_LOG_LEVEL or RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON instead of the default console format.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = RuntimeConfig::from_env()?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.log_json |= cli.log_json;

    let mut telemetry = TelemetryConfig::new(config.service_name.clone()).with_log_level(config.log_level.clone());
    if config.log_json {
        telemetry = telemetry.with_json();
    }
    meridian_telemetry::init_with_config(telemetry);

    let mut platform = Platform::bootstrap(&config).await?;
    platform.start().await?;
    tracing::info!("meridian platform running, press ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    platform.shutdown().await;
    Ok(())
}
