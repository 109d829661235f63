use async_trait::async_trait;

use crate::types::{Article, DashboardSnapshot};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Current articles plus the time they were last written.
    async fn load_snapshot(&self) -> Result<DashboardSnapshot>;

    /// Returns `false` when no article has this id.
    async fn update_saved_status(&self, id: &str, saved: bool) -> Result<bool>;

    /// Merges a batch into storage, keeping saved flags of known articles.
    /// Returns the number of stored articles afterwards.
    async fn store_articles(&self, articles: Vec<Article>) -> Result<usize>;
}
