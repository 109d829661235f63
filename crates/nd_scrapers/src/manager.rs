use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nd_core::{ArticleStorage, Clock, Error, Result};
use nd_storage::filter_recent;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::scrapers::BoxedScraper;

/// Counts from one scraper run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub fetched: usize,
    /// Articles left after the 24 hour filter.
    pub kept: usize,
    /// Articles in storage once the batch was merged.
    pub total: usize,
    pub errors: Vec<String>,
}

impl ScrapeReport {
    /// Markdown entry for the run log.
    pub fn progress_entry(&self, at: DateTime<Utc>) -> String {
        let mut entry = format!(
            "\n## [{}] Scraper Run\n- Fetched: {} articles\n- Filtered (24h): {} articles\n- Total in storage: {} articles\n",
            at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.fetched,
            self.kept,
            self.total
        );
        if self.errors.is_empty() {
            entry.push_str("- Status: ✅ All scrapers successful\n");
        } else {
            entry.push_str(&format!("- Errors: {}\n", self.errors.len()));
            for e in &self.errors {
                entry.push_str(&format!("  - {}\n", e));
            }
        }
        entry
    }
}

/// Appends `entry` to the run log at `path`, creating it if needed.
pub async fn append_progress(path: &Path, entry: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(entry.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

pub struct ScraperManager {
    storage: Arc<dyn ArticleStorage>,
    scrapers: Vec<BoxedScraper>,
    clock: Arc<dyn Clock>,
}

impl ScraperManager {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        scrapers: Vec<BoxedScraper>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            scrapers,
            clock,
        }
    }

    pub fn sources(&self) -> Vec<&str> {
        self.scrapers.iter().map(|s| s.source()).collect()
    }

    /// Runs every scraper, keeps the last 24 hours (plus saved articles) and
    /// merges the batch into storage.
    ///
    /// A failing scraper does not stop the others. When all of them fail,
    /// storage is left untouched and the run is an error.
    pub async fn run(&self) -> Result<ScrapeReport> {
        info!("🚀 Starting scraper run over {} sources", self.scrapers.len());

        let mut articles = Vec::new();
        let mut errors = Vec::new();
        for (i, scraper) in self.scrapers.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, self.scrapers.len(), scraper.source());
            match scraper.fetch_articles().await {
                Ok(mut batch) => {
                    info!("✅ {} returned {} articles", scraper.source(), batch.len());
                    articles.append(&mut batch);
                }
                Err(e) => {
                    let message = format!("{} scraper failed: {}", scraper.source(), e);
                    error!("❌ {}", message);
                    errors.push(message);
                }
            }
        }

        if !self.scrapers.is_empty() && errors.len() == self.scrapers.len() {
            return Err(Error::Scraping(errors.join("; ")));
        }

        let fetched = articles.len();
        let recent = filter_recent(articles, self.clock.now());
        let kept = recent.len();
        info!("🔍 Kept {} of {} articles (within 24h or saved)", kept, fetched);

        let total = self.storage.store_articles(recent).await?;
        if errors.is_empty() {
            info!("💾 Stored {} articles", total);
        } else {
            warn!("⚠️ Stored {} articles with {} scraper errors", total, errors.len());
        }

        Ok(ScrapeReport {
            fetched,
            kept,
            total,
            errors,
        })
    }
}
