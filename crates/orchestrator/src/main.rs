use std::sync::Arc;

use anyhow::Result;
use orchestrator::{build_core, Config};
use orchestrator_adapters::{start_core, DiscordGateway};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "lunchbot=info,orchestrator=info,orchestrator_core=info,orchestrator_adapters=info,router=info";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let core = Arc::new(build_core(&config)?);

    match core.load_menu().await {
        Ok(0) => warn!(path = %config.menu_path.display(), "no menu loaded; ordering is off until one is chosen"),
        Ok(count) => info!(items = count, "menu ready"),
        Err(e) => error!(error = %format!("{:#}", e), "stored menu is unusable; starting with an empty menu"),
    }

    let handles = start_core(core);
    let gateway = DiscordGateway::new(config.require_discord_token()?);
    info!(channel = ?config.channel_id, "LunchBot starting");

    let outcome = gateway.run(handles.events_tx).await;
    if let Err(e) = handles.task.await {
        error!(error = %e, "dispatch task failed");
    }
    outcome
}
