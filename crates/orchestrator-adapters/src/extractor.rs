//! Menu extraction through an OpenAI-compatible chat model.

use anyhow::{Context, Result};
use async_trait::async_trait;
use llm::{ChatMessage, ChatOptions, Client};
use orchestrator_core::ports::MenuExtractorPort;
use router::{JsonMenuExtractor, MenuItem};
use tracing::{debug, info};

const SYSTEM_PROMPT: &str = "You extract menu info.";

pub struct LlmMenuExtractor {
    client: Client,
    parser: JsonMenuExtractor,
}

impl LlmMenuExtractor {
    pub fn new(client: Client) -> Self {
        Self { client, parser: JsonMenuExtractor::new() }
    }
}

pub fn extraction_prompt(page_text: &str) -> String {
    format!(
        "Extract this menu into a JSON object of the form \
         {{\"items\": [{{\"name\": ..., \"description\": ..., \"price\": ...}}]}}. \
         Use a number for each price and an empty string when there is no description.\n\n{}",
        page_text
    )
}

#[async_trait]
impl MenuExtractorPort for LlmMenuExtractor {
    async fn extract_menu(&self, page_text: &str) -> Result<Vec<MenuItem>> {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(extraction_prompt(page_text))];
        let opts = ChatOptions { temperature: Some(0.0), json_object: true };

        let raw = self
            .client
            .chat(&messages, opts)
            .await
            .with_context(|| format!("{} menu extraction request failed", self.client.provider().name()))?;
        debug!(chars = raw.len(), "extraction response received");

        let items = self.parser.extract_menu(&raw).context("Model returned an unusable menu")?;
        info!(items = items.len(), model = self.client.model(), "menu extracted");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_page_text() {
        let prompt = extraction_prompt("Pad Thai 12.50");
        assert!(prompt.contains("\"items\""));
        assert!(prompt.ends_with("\n\nPad Thai 12.50"));
    }
}
