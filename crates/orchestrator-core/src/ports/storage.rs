use anyhow::Result;
use async_trait::async_trait;
use router::MenuItem;

/// Durable home of the active menu.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<MenuItem>>>;

    /// Replaces the stored menu wholesale.
    async fn save(&self, items: &[MenuItem]) -> Result<()>;
}
