use anyhow::{Context, Result};
use orchestrator_adapters::{
    DiscordOutbound, HttpPageFetcher, JsonFileMenuStore, LlmMenuExtractor, SerpApiSearch,
};
use orchestrator_core::OrchestratorCore;
use router::{IntentRouter, RouterConfig, Vocabulary};

use crate::config::Config;

pub type LunchCore =
    OrchestratorCore<SerpApiSearch, HttpPageFetcher, LlmMenuExtractor, JsonFileMenuStore, DiscordOutbound>;

pub fn router_config(config: &Config) -> Result<RouterConfig> {
    let selection_ttl = chrono::Duration::from_std(config.selection_ttl)
        .context("SELECTION_TTL_SECS is out of range")?;
    Ok(RouterConfig { channel_id: config.channel_id.clone(), selection_ttl })
}

/// Wires the production adapters around a fresh session. The menu is not
/// loaded here; call `load_menu` once the core exists.
pub fn build_core(config: &Config) -> Result<LunchCore> {
    let token = config.require_discord_token()?;
    let llm_settings = config.require_llm()?;

    let http = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let llm_client = llm::Client::new(
        llm_settings.provider.clone(),
        llm_settings.api_key.clone(),
        llm_settings.model.clone(),
    )?;

    let router = IntentRouter::new(Vocabulary::default(), router_config(config)?)?;
    let mut core = OrchestratorCore::new(
        router,
        SerpApiSearch::new(http.clone(), config.serpapi_key.clone(), config.search_location.clone()),
        HttpPageFetcher::new(http.clone(), config.fetch_timeout),
        LlmMenuExtractor::new(llm_client),
        JsonFileMenuStore::new(config.menu_path.clone()),
        DiscordOutbound::new(http, token),
    );
    core.set_service_timeout(config.service_timeout);
    Ok(core)
}
