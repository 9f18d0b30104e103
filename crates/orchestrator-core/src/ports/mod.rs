pub mod storage;

pub use storage::MenuStore;

use anyhow::Result;
use async_trait::async_trait;
use router::{Candidate, MenuItem};

/// Finds restaurants serving a cuisine near the configured location.
#[async_trait]
pub trait RestaurantSearchPort: Send + Sync {
    async fn search(&self, cuisine: &str) -> Result<Vec<Candidate>>;
}

/// Retrieves the visible text of a web page.
#[async_trait]
pub trait PageFetchPort: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Turns raw page text into structured menu items.
#[async_trait]
pub trait MenuExtractorPort: Send + Sync {
    async fn extract_menu(&self, page_text: &str) -> Result<Vec<MenuItem>>;
}

#[async_trait]
pub trait OutboundPort: Send + Sync {
    async fn send(&self, msg: protocol::Message) -> Result<()>;
}
