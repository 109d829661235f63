use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nd_core::{Article, ArticleStorage, DashboardSnapshot, Error, Result};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::merge::{merge_articles, validate_article};
use crate::{timestamp_now, StorageConfig};

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Articles kept in one JSON document on disk.
///
/// Writes go to `<path>.tmp` and are renamed over the target; the previous
/// file is copied to `<path>.backup` first and used when the main file no
/// longer parses.
#[derive(Debug)]
pub struct JsonFileStorage {
    config: StorageConfig,
    backup_path: PathBuf,
    temp_path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            backup_path: with_suffix(&config.path, ".backup"),
            temp_path: with_suffix(&config.path, ".tmp"),
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    async fn exists(path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Copies the seed file into place when storage does not exist yet.
    async fn ensure_seeded(&self) {
        let Some(seed) = &self.config.seed_path else {
            return;
        };
        if Self::exists(&self.config.path).await || !Self::exists(seed).await {
            return;
        }
        info!("🔄 Initializing {} from {}", self.config.path.display(), seed.display());
        let copied = async {
            Self::ensure_parent(&self.config.path).await?;
            fs::copy(seed, &self.config.path).await?;
            Ok::<_, Error>(())
        }
        .await;
        if let Err(e) = copied {
            warn!("⚠️ Could not copy seed articles: {}", e);
        }
    }

    async fn parse_file(path: &Path) -> Result<DashboardSnapshot> {
        let data = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn read_snapshot(&self) -> Result<DashboardSnapshot> {
        self.ensure_seeded().await;

        if !Self::exists(&self.config.path).await {
            return Ok(DashboardSnapshot::new(Vec::new(), timestamp_now()));
        }

        match Self::parse_file(&self.config.path).await {
            Ok(snapshot) => Ok(snapshot),
            Err(Error::Serialization(e)) => {
                error!("❌ JSON parse error in {}: {}", self.config.path.display(), e);
                if Self::exists(&self.backup_path).await {
                    info!("🔄 Restoring from backup...");
                    fs::copy(&self.backup_path, &self.config.path).await?;
                    Self::parse_file(&self.config.path).await
                } else {
                    warn!("⚠️ No backup available, returning empty structure");
                    Ok(DashboardSnapshot::new(Vec::new(), timestamp_now()))
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn write_articles(&self, articles: Vec<Article>) -> Result<()> {
        for article in &articles {
            validate_article(article)?;
        }

        Self::ensure_parent(&self.config.path).await?;
        if Self::exists(&self.config.path).await {
            fs::copy(&self.config.path, &self.backup_path).await?;
        }

        let count = articles.len();
        let snapshot = DashboardSnapshot::new(articles, timestamp_now());
        let json = serde_json::to_string_pretty(&snapshot)?;

        let written = async {
            fs::write(&self.temp_path, json).await?;
            fs::rename(&self.temp_path, &self.config.path).await?;
            Ok::<_, Error>(())
        }
        .await;

        match written {
            Ok(()) => {
                info!("✅ Saved {} articles", count);
                Ok(())
            }
            Err(e) => {
                error!("❌ Save error: {}", e);
                let _ = fs::remove_file(&self.temp_path).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ArticleStorage for JsonFileStorage {
    async fn load_snapshot(&self) -> Result<DashboardSnapshot> {
        let _guard = self.lock.lock().await;
        self.read_snapshot().await
    }

    async fn update_saved_status(&self, id: &str, saved: bool) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.read_snapshot().await?;
        match snapshot.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => article.saved = saved,
            None => {
                warn!("⚠️ Article not found: {}", id);
                return Ok(false);
            }
        }
        self.write_articles(snapshot.articles).await?;
        Ok(true)
    }

    async fn store_articles(&self, articles: Vec<Article>) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let existing = self.read_snapshot().await?;
        let merged = merge_articles(&existing.articles, articles);
        let count = merged.len();
        self.write_articles(merged).await?;
        Ok(count)
    }
}
