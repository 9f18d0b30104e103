//! Page retrieval and HTML-to-text conversion.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use orchestrator_core::ports::PageFetchPort;
use reqwest::Client;
use tracing::{info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; LunchBot/1.0)";
const TEXT_WIDTH: usize = 120;
/// Upper bound on the text handed to menu extraction.
pub const MAX_PAGE_CHARS: usize = 24_000;

pub struct HttpPageFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl PageFetchPort for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection"
                } else {
                    "request"
                };
                warn!(url, err = kind, "fetch fail");
                e
            })
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "fetch fail");
            anyhow::bail!("{} returned status: {}", url, status);
        }

        let html = response.text().await.context("Failed to read page body")?;
        info!(url, bytes = html.len(), ms = start.elapsed().as_millis() as u64, "fetch ok");
        Ok(page_text(&html))
    }
}

/// Plain text of an HTML page, capped at [`MAX_PAGE_CHARS`] characters.
pub fn page_text(html: &str) -> String {
    let text = html2text::from_read(html.as_bytes(), TEXT_WIDTH);
    text.chars().take(MAX_PAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text_strips_markup() {
        let html = "<html><body><h1>Menu</h1><p>Pad Thai $12.50</p><script>var x = 1;</script></body></html>";
        let text = page_text(html);
        assert!(text.contains("Menu"));
        assert!(text.contains("Pad Thai $12.50"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_page_text_is_capped() {
        let html = format!("<p>{}</p>", "word ".repeat(20_000));
        assert!(page_text(&html).chars().count() <= MAX_PAGE_CHARS);
    }
}
