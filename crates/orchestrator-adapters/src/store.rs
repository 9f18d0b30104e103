//! Menu persistence as a pretty-printed JSON array.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use orchestrator_core::ports::MenuStore;
use router::{JsonMenuExtractor, MenuItem};
use tracing::{debug, info};

pub struct JsonFileMenuStore {
    path: PathBuf,
}

impl JsonFileMenuStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl MenuStore for JsonFileMenuStore {
    async fn load(&self) -> Result<Option<Vec<MenuItem>>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "menu file not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let items = JsonMenuExtractor::new()
            .extract_menu(&raw)
            .with_context(|| format!("{} is not a valid menu", self.path.display()))?;
        Ok(Some(items))
    }

    /// Writes a sibling temp file first and renames it over the target, so a
    /// reader never sees a half-written menu.
    async fn save(&self, items: &[MenuItem]) -> Result<()> {
        let json = serde_json::to_string_pretty(items).context("Failed to serialize menu")?;
        let staging = self.staging_path();

        tokio::fs::write(&staging, json)
            .await
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!(path = %self.path.display(), items = items.len(), "menu saved");
        Ok(())
    }
}
