use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use llm::Provider;

pub const DEFAULT_LOCATION: &str = "Newark, NJ";
pub const DEFAULT_MENU_PATH: &str = "menu.json";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Which chat model extracts menus.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: Option<String>,
    /// `None` means every channel is served.
    pub channel_id: Option<String>,
    pub serpapi_key: Option<String>,
    pub llm: Option<LlmSettings>,
    pub menu_path: PathBuf,
    pub search_location: String,
    pub service_timeout: Duration,
    pub fetch_timeout: Duration,
    pub selection_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let llm = match (get("OPENAI_API_KEY"), get("GROQ_API_KEY")) {
            (Some(api_key), _) => Some(LlmSettings {
                provider: Provider::OpenAi,
                api_key,
                model: get("MENU_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            }),
            (None, Some(api_key)) => Some(LlmSettings {
                provider: Provider::Groq,
                api_key,
                model: get("MENU_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            }),
            (None, None) => None,
        };

        Ok(Config {
            discord_token: get("DISCORD_TOKEN"),
            channel_id: get("CHANNEL_ID").filter(|c| c != "0"),
            serpapi_key: get("SERPAPI_KEY"),
            llm,
            menu_path: get("MENU_PATH").unwrap_or_else(|| DEFAULT_MENU_PATH.to_string()).into(),
            search_location: get("SEARCH_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            service_timeout: Duration::from_secs(parse_or(&get, "SERVICE_TIMEOUT_SECS", 60)?),
            fetch_timeout: Duration::from_millis(parse_or(&get, "FETCH_TIMEOUT_MS", 15_000)?),
            selection_ttl: Duration::from_secs(parse_or(&get, "SELECTION_TTL_SECS", 900)?),
        })
    }

    pub fn require_discord_token(&self) -> Result<&str> {
        self.discord_token
            .as_deref()
            .context("Missing DISCORD_TOKEN environment variable")
    }

    pub fn require_llm(&self) -> Result<&LlmSettings> {
        self.llm
            .as_ref()
            .context("Missing OPENAI_API_KEY or GROQ_API_KEY environment variable")
    }
}

fn parse_or<G>(get: &G, key: &str, default: u64) -> Result<u64>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => {
            let value: u64 = raw.parse().with_context(|| format!("Invalid {}", key))?;
            if value == 0 {
                bail!("Invalid {}: must be greater than zero", key);
            }
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.discord_token.is_none());
        assert!(cfg.channel_id.is_none());
        assert!(cfg.llm.is_none());
        assert_eq!(cfg.menu_path, PathBuf::from("menu.json"));
        assert_eq!(cfg.search_location, "Newark, NJ");
        assert_eq!(cfg.service_timeout, Duration::from_secs(60));
        assert_eq!(cfg.fetch_timeout, Duration::from_millis(15_000));
        assert_eq!(cfg.selection_ttl, Duration::from_secs(900));
        assert!(cfg.require_discord_token().is_err());
        assert!(cfg.require_llm().is_err());
    }

    #[test]
    fn test_channel_zero_means_unrestricted() {
        assert!(config(&[("CHANNEL_ID", "0")]).unwrap().channel_id.is_none());
        assert_eq!(config(&[("CHANNEL_ID", "1234")]).unwrap().channel_id.as_deref(), Some("1234"));
    }

    #[test]
    fn test_openai_preferred_over_groq() {
        let cfg = config(&[("OPENAI_API_KEY", "sk-1"), ("GROQ_API_KEY", "gsk-2")]).unwrap();
        let llm = cfg.require_llm().unwrap();
        assert_eq!(llm.provider, Provider::OpenAi);
        assert_eq!(llm.model, DEFAULT_OPENAI_MODEL);

        let cfg = config(&[("GROQ_API_KEY", "gsk-2"), ("MENU_MODEL", "custom")]).unwrap();
        let llm = cfg.require_llm().unwrap();
        assert_eq!(llm.provider, Provider::Groq);
        assert_eq!(llm.model, "custom");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let cfg = config(&[("DISCORD_TOKEN", "  "), ("SERPAPI_KEY", "")]).unwrap();
        assert!(cfg.discord_token.is_none());
        assert!(cfg.serpapi_key.is_none());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(config(&[("SERVICE_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config(&[("SELECTION_TTL_SECS", "0")]).is_err());
        let cfg = config(&[("FETCH_TIMEOUT_MS", "2500")]).unwrap();
        assert_eq!(cfg.fetch_timeout, Duration::from_millis(2500));
    }
}
