//! Bot entry-point: loads settings, wires the sheet adapters, warms the cache,
//! and keeps it refreshed until interrupted.

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use battalion_bot::bootstrap::{BotRuntime, RuntimePorts};
use battalion_bot::config::BotSettings;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        BotSettings::load().map_err(|error| eyre!("failed to load settings: {error}"))?;
    let ports = RuntimePorts::from_settings(&settings).wrap_err("failed to build adapters")?;
    let runtime =
        BotRuntime::assemble(&settings, ports).wrap_err("failed to assemble bot runtime")?;

    let warmed = runtime.cache.refresh_all().await;
    info!(
        refreshed = warmed.refreshed,
        failed = warmed.failed,
        "sheet cache warmed"
    );

    let refresh = runtime.start_refresh();
    tokio::signal::ctrl_c()
        .await
        .wrap_err("failed to listen for shutdown signal")?;
    info!("shutdown requested");
    refresh.stop().await;
    Ok(())
}
