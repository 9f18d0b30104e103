//! Loads the stored menu, validates it, and prints a short preview.

use anyhow::{Context, Result};
use orchestrator::config::DEFAULT_MENU_PATH;
use orchestrator_adapters::JsonFileMenuStore;
use orchestrator_core::ports::MenuStore;
use router::MenuIndex;

const PREVIEW_ITEMS: usize = 3;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MENU_PATH").ok())
        .unwrap_or_else(|| DEFAULT_MENU_PATH.to_string());
    let store = JsonFileMenuStore::new(&path);

    let items = store
        .load()
        .await?
        .with_context(|| format!("{} does not exist", path))?;
    let menu = MenuIndex::build(items).with_context(|| format!("{} is not a usable menu", path))?;

    println!("✅ Loaded {} menu items.", menu.len());
    let preview = &menu.all()[..menu.len().min(PREVIEW_ITEMS)];
    println!("{}", serde_json::to_string_pretty(preview)?);
    Ok(())
}
