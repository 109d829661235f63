use async_trait::async_trait;
use nd_core::{Article, ArticleStorage, DashboardSnapshot, Result};
use tokio::sync::RwLock;

use crate::merge::{merge_articles, validate_article};
use crate::timestamp_now;

/// Articles held in process memory; gone on restart.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    snapshot: RwLock<DashboardSnapshot>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_articles(Vec::new())
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            snapshot: RwLock::new(DashboardSnapshot::new(articles, timestamp_now())),
        }
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn load_snapshot(&self) -> Result<DashboardSnapshot> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn update_saved_status(&self, id: &str, saved: bool) -> Result<bool> {
        let mut snapshot = self.snapshot.write().await;
        match snapshot.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.saved = saved;
                snapshot.last_updated = Some(timestamp_now());
                Ok(true)
            }
            None => {
                tracing::warn!("⚠️ Article not found: {}", id);
                Ok(false)
            }
        }
    }

    async fn store_articles(&self, articles: Vec<Article>) -> Result<usize> {
        for article in &articles {
            validate_article(article)?;
        }
        let mut snapshot = self.snapshot.write().await;
        snapshot.articles = merge_articles(&snapshot.articles, articles);
        snapshot.last_updated = Some(timestamp_now());
        Ok(snapshot.articles.len())
    }
}
